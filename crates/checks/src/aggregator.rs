//! Outcome aggregation and verdict
//!
//! Failures of required rules are errors, failures of optional rules are
//! warnings. The verdict depends only on whether any error was recorded.

use crate::outcome::{Outcome, Status};
use qualitygate_core::error::exit_codes;
use serde::Serialize;
use std::fmt;

/// A failed rule, as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub description: String,
    pub detail: String,
}

impl Finding {
    fn from_outcome(outcome: &Outcome<'_>) -> Self {
        Self {
            rule_id: outcome.rule.id().to_string(),
            description: outcome.rule.description().to_string(),
            detail: outcome.detail.clone(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.description)
        } else {
            write!(f, "{}: {}", self.description, self.detail)
        }
    }
}

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No errors and no warnings
    Pass,
    /// No errors, at least one warning
    PassWithWarnings,
    /// At least one error
    Fail,
}

impl Verdict {
    #[must_use]
    pub fn is_pass(self) -> bool {
        !matches!(self, Verdict::Fail)
    }

    /// Process exit code: 0 for either pass variant, 1 otherwise
    #[must_use]
    pub fn exit_code(self) -> i32 {
        if self.is_pass() {
            exit_codes::SUCCESS
        } else {
            exit_codes::FAILURE
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "PASS",
            Verdict::PassWithWarnings => "PASS WITH WARNINGS",
            Verdict::Fail => "FAIL",
        })
    }
}

/// Accumulates outcomes in evaluation order
#[derive(Debug, Default, Clone)]
pub struct ResultAggregator {
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
    passed: usize,
    skipped: usize,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &Outcome<'_>) {
        match outcome.status {
            Status::Pass => self.passed += 1,
            Status::Skipped => self.skipped += 1,
            Status::Fail if outcome.rule.is_required() => {
                self.errors.push(Finding::from_outcome(outcome));
            }
            Status::Fail => self.warnings.push(Finding::from_outcome(outcome)),
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn summarize(&self) -> Verdict {
        if !self.errors.is_empty() {
            Verdict::Fail
        } else if !self.warnings.is_empty() {
            Verdict::PassWithWarnings
        } else {
            Verdict::Pass
        }
    }

    /// Consume the aggregator, yielding `(errors, warnings, passed, skipped)`
    pub(crate) fn into_parts(self) -> (Vec<Finding>, Vec<Finding>, usize, usize) {
        (self.errors, self.warnings, self.passed, self.skipped)
    }
}
