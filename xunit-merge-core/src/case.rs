// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag names and outcome classification for test cases.

use crate::document::Element;

pub static TESTSUITE_TAG: &str = "testsuite";
pub static TESTCASE_TAG: &str = "testcase";
pub static FAILURE_TAG: &str = "failure";
pub static ERROR_TAG: &str = "error";
pub static SKIPPED_TAG: &str = "skipped";
pub static SYSTEM_OUT_TAG: &str = "system-out";

pub(crate) static NAME_ATTR: &str = "name";
pub(crate) static TIME_ATTR: &str = "time";

/// The outcome of a single test case.
///
/// A case is classified by the status markers anywhere below it, not just its direct children.
/// A `skipped` marker takes precedence over everything else, and `failure` takes precedence over
/// `error`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CaseOutcome {
    /// The test ran and passed.
    Success,

    /// The test ran and failed in an expected way.
    Failure,

    /// The test ran and failed in an unexpected way.
    Error,

    /// The test did not run.
    Skipped,
}

impl CaseOutcome {
    /// Classifies a `testcase` element.
    pub fn of(case: &Element) -> Self {
        let mut failure = false;
        let mut error = false;
        for element in case.descendants() {
            match element.name() {
                name if name == SKIPPED_TAG => return CaseOutcome::Skipped,
                name if name == FAILURE_TAG => failure = true,
                name if name == ERROR_TAG => error = true,
                _ => {}
            }
        }

        if failure {
            CaseOutcome::Failure
        } else if error {
            CaseOutcome::Error
        } else {
            CaseOutcome::Success
        }
    }

    /// Returns true if the test ran, whatever its result.
    pub fn is_completed(self) -> bool {
        !matches!(self, CaseOutcome::Skipped)
    }
}

/// Returns true if the element is a `testcase`.
pub fn is_testcase(element: &Element) -> bool {
    element.is(TESTCASE_TAG)
}

/// Returns the identity of a test case: its `name` attribute.
///
/// `classname` is not part of the identity, so two classes with a same-named test are treated as
/// the same test.
pub fn case_name(case: &Element) -> Option<&str> {
    case.attribute(NAME_ATTR)
}

/// Returns the `time` of a test case in seconds, or 0.0 if missing or not a number.
pub fn case_time(case: &Element) -> f64 {
    case.attribute(TIME_ATTR)
        .and_then(|time| time.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}
