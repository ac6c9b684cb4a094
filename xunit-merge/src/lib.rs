// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface for merging XUnit/JUnit XML reports.
//!
//! The merging itself is implemented in [`xunit_merge_core`]. This crate adds argument parsing,
//! configuration files, logging and exit codes.

mod config;
mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, StderrStyles};
