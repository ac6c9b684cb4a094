// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    config::ConfigParseError,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::{error::Error, io};
use thiserror::Error;
use xunit_merge_core::errors::{BoxError, MergeError, ParseError, RunError, SerializeError};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for `xunit-merge` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum XunitMergeExitCode {}

impl XunitMergeExitCode {
    /// No errors occurred and the merged report was written.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up, such as an invalid config file.
    pub const SETUP_ERROR: i32 = 96;

    /// An input report could not be read or parsed.
    pub const INPUT_ERROR: i32 = 97;

    /// The input reports could not be merged, or duplicates were denied.
    pub const MERGE_ERROR: i32 = 98;

    /// Writing the merged report produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error that causes xunit-merge to exit.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("input open error")]
    InputOpenError {
        path: Utf8PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("input parse error")]
    InputParseError {
        source_name: String,
        #[source]
        err: ParseError,
    },
    #[error("merge error")]
    MergeError {
        #[source]
        err: MergeError,
    },
    #[error("duplicate test cases denied")]
    DuplicatesDenied { count: usize },
    #[error("transform error")]
    TransformError {
        #[source]
        err: BoxError,
    },
    #[error("serialize error")]
    SerializeError {
        #[source]
        err: SerializeError,
    },
    #[error("output write error")]
    WriteOutputError {
        path: Utf8PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("run error")]
    RunError {
        #[source]
        err: RunError,
    },
}

impl From<RunError> for ExpectedError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::OpenInput { path, err } => Self::InputOpenError { path, err },
            RunError::Parse { source_name, err } => Self::InputParseError { source_name, err },
            RunError::Merge(err) => Self::MergeError { err },
            RunError::Transform(err) => Self::TransformError { err },
            RunError::Serialize(err) => Self::SerializeError { err },
            RunError::WriteOutput { path, err } => Self::WriteOutputError { path, err },
            err => Self::RunError { err },
        }
    }
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } => XunitMergeExitCode::SETUP_ERROR,
            Self::InputOpenError { .. } | Self::InputParseError { .. } => {
                XunitMergeExitCode::INPUT_ERROR
            }
            Self::MergeError { .. }
            | Self::DuplicatesDenied { .. }
            | Self::TransformError { .. }
            | Self::RunError { .. } => XunitMergeExitCode::MERGE_ERROR,
            Self::SerializeError { .. } | Self::WriteOutputError { .. } => {
                XunitMergeExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse config file `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::InputOpenError { path, err } => {
                tracing::error!("failed to open input `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::InputParseError { source_name, err } => {
                tracing::error!(
                    "failed to parse input `{}`: {err}",
                    source_name.style(styles.bold)
                );
                err.source()
            }
            Self::MergeError { err } => {
                tracing::error!("failed to merge test suites: {err}");
                err.source()
            }
            Self::DuplicatesDenied { count } => {
                let cases = if *count == 1 { "case" } else { "cases" };
                tracing::error!(
                    "found {} duplicate completed test {cases}, and --deny-duplicates was passed",
                    count.style(styles.bold)
                );
                None
            }
            Self::TransformError { err } => {
                tracing::error!("failed to transform merged suite");
                Some(&**err as &dyn Error)
            }
            Self::SerializeError { err } => {
                tracing::error!("failed to write merged report");
                err.source()
            }
            Self::WriteOutputError { path, err } => {
                tracing::error!("failed to write output `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::RunError { err } => {
                tracing::error!("{err}");
                err.source()
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
