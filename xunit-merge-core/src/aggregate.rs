// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recompute the summary attributes of a test suite.

use crate::{
    case::{CaseOutcome, case_time, is_testcase},
    document::Element,
};
use std::fmt;

/// Summary counts for a test suite, computed from its test cases.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SuiteCounts {
    /// The number of test cases that ran, whatever their result.
    pub tests: usize,

    /// The number of test cases that were skipped.
    pub skipped: usize,

    /// The number of completed test cases with a failure.
    pub failures: usize,

    /// The number of completed test cases with an error but no failure.
    pub errors: usize,

    /// The sum of all test case times, in seconds.
    pub time: f64,
}

impl SuiteCounts {
    /// Computes counts from every `testcase` element anywhere below `suite`.
    pub fn from_suite(suite: &Element) -> Self {
        let mut counts = Self::default();
        for case in suite.descendants().filter(|element| is_testcase(element)) {
            counts.add_case(case);
        }
        counts
    }

    /// Adds a single test case to these counts.
    pub fn add_case(&mut self, case: &Element) {
        self.time += case_time(case);

        match CaseOutcome::of(case) {
            CaseOutcome::Skipped => self.skipped += 1,
            outcome => {
                self.tests += 1;
                match outcome {
                    CaseOutcome::Failure => self.failures += 1,
                    CaseOutcome::Error => self.errors += 1,
                    CaseOutcome::Success | CaseOutcome::Skipped => {}
                }
            }
        }
    }

    /// Writes these counts as attributes on `suite`, replacing any existing values.
    pub fn write_to(&self, suite: &mut Element) {
        // Use the destructuring syntax to ensure that all fields are handled.
        let Self {
            tests,
            skipped,
            failures,
            errors,
            time,
        } = self;

        suite
            .set_attribute("tests", tests.to_string())
            .set_attribute("skipped", skipped.to_string())
            .set_attribute("failures", failures.to_string())
            .set_attribute("errors", errors.to_string())
            .set_attribute("time", serialize_time(*time));
    }
}

impl fmt::Display for SuiteCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests, {} skipped, {} failures, {} errors in {}s",
            self.tests,
            self.skipped,
            self.failures,
            self.errors,
            serialize_time(self.time),
        )
    }
}

/// Recomputes `tests`, `skipped`, `failures`, `errors` and `time` on a suite from its test cases.
pub fn aggregate(suite: &mut Element) -> SuiteCounts {
    let counts = SuiteCounts::from_suite(suite);
    counts.write_to(suite);
    counts
}

// Serialize time as the shortest decimal that round-trips, always with a fractional part.
fn serialize_time(time: f64) -> String {
    let mut s = time.to_string();
    if s.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        s.push_str(".0");
    }
    s
}
