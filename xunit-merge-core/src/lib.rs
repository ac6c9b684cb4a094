// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge XUnit/JUnit XML reports produced by sharded or repeated test runs.
//!
//! Each input holds a single `testsuite` root element. Test cases are identified by their `name`
//! attribute. A test that completed in any input replaces every skipped occurrence of that test,
//! and the merged suite's `tests`, `skipped`, `failures`, `errors` and `time` attributes are
//! recomputed from the result.
//!
//! The main entry point is [`XunitMerger`]. The individual stages ([`parse_document`],
//! [`merge`], [`aggregate`] and [`Serializer`]) are also available.

mod aggregate;
pub mod case;
mod document;
pub mod errors;
mod merge;
mod parse;
mod run;
mod serialize;

pub use aggregate::*;
pub use document::*;
pub use merge::*;
pub use parse::*;
pub use run::*;
pub use serialize::*;
