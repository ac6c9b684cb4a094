// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge several test suites into one.
//!
//! The first suite is used as the accumulator. Test cases are identified by their `name`
//! attribute. A test that completed (passed, failed or errored) in any input overrides any
//! skipped occurrence of the same test, regardless of input order. Skipped tests that never
//! completed are appended at the end, in the order they were first seen.

use crate::{
    aggregate::{SuiteCounts, aggregate},
    case::{CaseOutcome, case_name, is_testcase},
    document::{Element, Node},
    errors::MergeError,
};
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// The result of [`merge`].
#[derive(Clone, Debug)]
pub struct MergedSuite {
    /// The merged suite.
    pub suite: Element,

    /// The recomputed counts for the merged suite.
    ///
    /// `None` if only one suite was passed in, since it is returned unchanged.
    pub counts: Option<SuiteCounts>,

    /// Non-fatal issues found while merging.
    pub warnings: Vec<MergeWarning>,
}

/// A non-fatal issue found while merging.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum MergeWarning {
    /// A test case completed in more than one place. All occurrences are kept.
    DuplicateCompleted {
        /// The name of the test case.
        name: String,

        /// The zero-based index of the input containing the duplicate.
        input_index: usize,
    },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::DuplicateCompleted { name, input_index } => write!(
                f,
                "duplicate completed test case `{name}` in input {input_index}"
            ),
        }
    }
}

/// Merges test suites into the first one.
///
/// A single suite is returned unchanged. Otherwise, the result holds the test cases of every
/// input with skipped occurrences reconciled, and its summary attributes are recomputed.
///
/// Test cases are moved out of the later suites, not copied. Only direct `testcase` children of
/// each suite take part in merging: other children of the first suite are left in place, and
/// other children of later suites are dropped.
pub fn merge(suites: impl IntoIterator<Item = Element>) -> Result<MergedSuite, MergeError> {
    let mut suites = suites.into_iter();
    let mut accumulator = suites.next().ok_or(MergeError::NoInputs)?;
    let mut rest = suites.peekable();

    if rest.peek().is_none() {
        return Ok(MergedSuite {
            suite: accumulator,
            counts: None,
            warnings: vec![],
        });
    }

    let mut state = MergeState::default();

    // Skipped test cases are taken out of the first suite and held in the skip table. Completed
    // test cases stay where they are.
    for (case_index, node) in accumulator.take_children().into_iter().enumerate() {
        match node {
            Node::Element(case) if is_testcase(&case) => {
                let name = required_name(&case, 0, case_index)?.to_owned();
                match CaseOutcome::of(&case) {
                    CaseOutcome::Skipped => {
                        state.skipped.entry(name).or_insert(case);
                    }
                    _ => {
                        state.completed.insert(name);
                        accumulator.push_child(case);
                    }
                }
            }
            other => {
                accumulator.push_node(other);
            }
        }
    }

    for (offset, mut suite) in rest.enumerate() {
        let input_index = offset + 1;
        tracing::debug!(
            input_index,
            "merging test cases from suite `{}`",
            suite.attribute("name").unwrap_or_default(),
        );

        for (case_index, node) in suite.take_children().into_iter().enumerate() {
            let case = match node {
                Node::Element(case) if is_testcase(&case) => case,
                Node::Element(other) => {
                    tracing::debug!(
                        input_index,
                        "ignoring `{}` element that is not a test case",
                        other.name(),
                    );
                    continue;
                }
                Node::Text(_) => continue,
            };

            let name = required_name(&case, input_index, case_index)?.to_owned();
            if CaseOutcome::of(&case).is_completed() {
                if let Some(warning) = state.add_completed(name, input_index) {
                    tracing::warn!("{warning}");
                    state.warnings.push(warning);
                }
                accumulator.push_child(case);
            } else {
                state.add_skipped(name, case);
            }
        }
    }

    let MergeState {
        completed,
        skipped,
        warnings,
    } = state;

    // Materialize the skips that were never overridden, in insertion order.
    for (name, case) in skipped {
        if !completed.contains(&name) {
            accumulator.push_child(case);
        }
    }

    let counts = aggregate(&mut accumulator);
    Ok(MergedSuite {
        suite: accumulator,
        counts: Some(counts),
        warnings,
    })
}

#[derive(Debug, Default)]
struct MergeState {
    // Both tables are insertion-ordered so that output order is deterministic.
    completed: IndexSet<String>,
    skipped: IndexMap<String, Element>,
    warnings: Vec<MergeWarning>,
}

impl MergeState {
    fn add_skipped(&mut self, name: String, case: Element) {
        // The first skipped occurrence wins, and a completed occurrence always wins.
        if !self.completed.contains(&name) && !self.skipped.contains_key(&name) {
            self.skipped.insert(name, case);
        }
    }

    fn add_completed(&mut self, name: String, input_index: usize) -> Option<MergeWarning> {
        // shift_remove keeps the remaining entries in insertion order.
        if self.skipped.shift_remove(&name).is_some() {
            debug_assert!(
                !self.skipped.contains_key(&name),
                "skip table entry for `{name}` survived removal"
            );
        }

        if self.completed.contains(&name) {
            Some(MergeWarning::DuplicateCompleted { name, input_index })
        } else {
            self.completed.insert(name);
            None
        }
    }
}

fn required_name(
    case: &Element,
    input_index: usize,
    case_index: usize,
) -> Result<&str, MergeError> {
    case_name(case).ok_or(MergeError::MissingName {
        input_index,
        case_index,
    })
}
