//! Checklist runner
//!
//! Drives the executor over every rule in order and feeds the aggregator.
//! A failing rule never stops the run.

use crate::aggregator::{Finding, ResultAggregator, Verdict};
use crate::executor::CheckExecutor;
use crate::outcome::Outcome;
use crate::rule::{Phase, Rule};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Receives progress notifications during a run.
///
/// All methods default to no-ops. Observers see outcomes but cannot
/// influence aggregation.
pub trait RunObserver {
    /// Called when the first rule of a new phase is about to run
    fn phase_started(&mut self, _phase: Phase) {}

    /// Called before a rule is evaluated
    fn rule_started(&mut self, _rule: &Rule) {}

    /// Called right after an outcome is recorded
    fn outcome_recorded(&mut self, _outcome: &Outcome<'_>) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Result of one verification pass
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub verdict: Verdict,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub passed: usize,
    pub skipped: usize,
    #[serde(with = "duration_ms", rename = "duration_ms")]
    pub duration: Duration,
}

impl RunReport {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }

    /// Number of rules evaluated
    #[must_use]
    pub fn total(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.passed + self.skipped
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

/// Runs a checklist against a project root
#[derive(Debug, Clone, Default)]
pub struct Runner {
    executor: CheckExecutor,
}

impl Runner {
    pub fn new(executor: CheckExecutor) -> Self {
        Self { executor }
    }

    pub fn run(&self, rules: &[Rule], root: &Path) -> RunReport {
        self.run_with(rules, root, &mut NoopObserver)
    }

    pub fn run_with(&self, rules: &[Rule], root: &Path, observer: &mut impl RunObserver) -> RunReport {
        let start = Instant::now();
        let mut aggregator = ResultAggregator::new();
        let mut current_phase = None;

        tracing::info!(root = %root.display(), rules = rules.len(), "starting verification");

        for rule in rules {
            if current_phase != Some(rule.phase()) {
                current_phase = Some(rule.phase());
                observer.phase_started(rule.phase());
            }

            observer.rule_started(rule);
            let outcome = self.executor.evaluate(rule, root);
            aggregator.record(&outcome);
            observer.outcome_recorded(&outcome);
        }

        let verdict = aggregator.summarize();
        let (errors, warnings, passed, skipped) = aggregator.into_parts();
        let duration = start.elapsed();

        tracing::info!(
            %verdict,
            errors = errors.len(),
            warnings = warnings.len(),
            elapsed_ms = duration.as_millis() as u64,
            "verification finished"
        );

        RunReport {
            verdict,
            errors,
            warnings,
            passed,
            skipped,
            duration,
        }
    }
}
