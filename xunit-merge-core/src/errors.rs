// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while merging reports.

use camino::Utf8PathBuf;
use std::{error, io, str::Utf8Error};
use thiserror::Error;

/// A boxed error returned by a post-merge transform.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// An error that occurs while parsing an XML document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The XML was not well-formed.
    #[error("invalid XML at byte {position}")]
    Xml {
        /// The byte offset at which the error was detected.
        position: u64,

        /// The underlying error.
        #[source]
        err: quick_xml::Error,
    },

    /// A name, text or CDATA section was not valid UTF-8.
    #[error("invalid UTF-8 at byte {position}")]
    Utf8 {
        /// The byte offset at which the error was detected.
        position: u64,

        /// The underlying error.
        #[source]
        err: Utf8Error,
    },

    /// The document did not contain any element.
    #[error("document has no root element")]
    MissingRoot,

    /// Content other than whitespace, comments or processing instructions was found outside the
    /// root element.
    #[error("unexpected content outside the root element at byte {position}")]
    ContentOutsideRoot {
        /// The byte offset after the offending content.
        position: u64,
    },

    /// The input ended while an element was still open.
    #[error("element `{name}` is not closed at end of input")]
    UnclosedElement {
        /// The name of the innermost open element.
        name: String,
    },
}

/// An error that occurs while merging parsed suites.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MergeError {
    /// No suites were passed in.
    #[error("no test suites to merge")]
    NoInputs,

    /// A test case without a `name` attribute was encountered, so its identity is unknown.
    #[error("test case {case_index} in input {input_index} has no `name` attribute")]
    MissingName {
        /// The zero-based index of the input the test case came from.
        input_index: usize,

        /// The zero-based index of the test case among the suite's direct children.
        case_index: usize,
    },
}

/// An error that occurs while serializing an element tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// Writing to the output failed.
    #[error("error writing XML output")]
    Io(#[from] io::Error),

    /// The XML writer reported an error.
    #[error("error serializing XML")]
    Xml(#[from] quick_xml::Error),
}

/// An error that occurs while running a full merge: reading, merging, transforming and writing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// An input file could not be opened.
    #[error("failed to open input `{path}`")]
    OpenInput {
        /// The path to the input.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// An input could not be parsed.
    #[error("failed to parse input `{source_name}`")]
    Parse {
        /// The name of the input, typically its path.
        source_name: String,

        /// The underlying error.
        #[source]
        err: ParseError,
    },

    /// The parsed suites could not be merged.
    #[error("failed to merge test suites")]
    Merge(#[from] MergeError),

    /// The post-merge transform returned an error.
    #[error("post-merge transform failed")]
    Transform(#[source] BoxError),

    /// The merged report could not be serialized.
    #[error("failed to serialize merged report")]
    Serialize(#[from] SerializeError),

    /// The output file could not be written.
    #[error("failed to write output `{path}`")]
    WriteOutput {
        /// The path to the output.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },
}
