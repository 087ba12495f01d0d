//! Result of evaluating one rule

use crate::rule::Rule;
use serde::Serialize;
use std::fmt;

/// Tri-state outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    /// A prerequisite of an optional rule is missing on the host
    Skipped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::Skipped => "skipped",
        })
    }
}

/// Outcome of one rule evaluation. Borrows the rule it came from.
#[derive(Debug, Clone)]
pub struct Outcome<'r> {
    pub status: Status,
    pub rule: &'r Rule,
    pub detail: String,
}

impl<'r> Outcome<'r> {
    pub fn pass(rule: &'r Rule, detail: impl Into<String>) -> Self {
        Self {
            status: Status::Pass,
            rule,
            detail: detail.into(),
        }
    }

    pub fn fail(rule: &'r Rule, detail: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            rule,
            detail: detail.into(),
        }
    }

    pub fn skipped(rule: &'r Rule, detail: impl Into<String>) -> Self {
        Self {
            status: Status::Skipped,
            rule,
            detail: detail.into(),
        }
    }

    /// Pass when `ok`, otherwise Fail with `detail`
    pub fn from_bool(rule: &'r Rule, ok: bool, pass_detail: impl Into<String>, fail_detail: impl Into<String>) -> Self {
        if ok {
            Self::pass(rule, pass_detail)
        } else {
            Self::fail(rule, fail_detail)
        }
    }
}
