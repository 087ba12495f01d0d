//! Phased report, summary and machine-readable output

use crate::output::{format_count, format_duration, Status};
use crate::progress;
use chrono::{DateTime, Utc};
use console::Term;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use qualitygate_checks::{Check, Finding, Outcome, Phase, Rule, RunObserver, RunReport, Status as OutcomeStatus, Verdict};
use serde::Serialize;
use std::path::Path;

/// Prints one header per phase and one line per outcome.
///
/// External commands get a spinner while they run, when stdout is a
/// terminal.
pub struct TextReporter {
    interactive: bool,
    verbose: bool,
    spinner: Option<ProgressBar>,
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReporter {
    /// Reporter that animates only when stdout is a terminal
    pub fn new() -> Self {
        Self {
            interactive: Term::stdout().is_term(),
            verbose: false,
            spinner: None,
        }
    }

    /// Force spinners on or off
    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Also print the detail of passing rules
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            progress::finish_and_clear(&pb);
        }
    }
}

impl RunObserver for TextReporter {
    fn phase_started(&mut self, phase: Phase) {
        self.clear_spinner();
        Status::header(phase.title());
    }

    fn rule_started(&mut self, rule: &Rule) {
        if self.interactive {
            if let Check::ExternalCommandSucceeds(spec) = rule.check() {
                self.spinner = Some(progress::spinner(&spec.command_line()));
            }
        }
    }

    fn outcome_recorded(&mut self, outcome: &Outcome<'_>) {
        self.clear_spinner();
        let line = outcome_line(outcome, self.verbose);
        match outcome.status {
            OutcomeStatus::Pass => Status::success(&line),
            OutcomeStatus::Skipped => Status::skipped(&line),
            OutcomeStatus::Fail if outcome.rule.is_required() => Status::error(&line),
            OutcomeStatus::Fail => Status::warning(&line),
        }
    }
}

/// Text shown for one outcome
fn outcome_line(outcome: &Outcome<'_>, verbose: bool) -> String {
    let description = outcome.rule.description();
    let show_detail = outcome.status != OutcomeStatus::Pass || verbose;
    if show_detail && !outcome.detail.is_empty() {
        format!("{description} ({})", outcome.detail)
    } else {
        description.to_string()
    }
}

/// Print every error and warning, then the verdict
pub fn print_summary(report: &RunReport) {
    Status::header("Summary");

    if !report.errors.is_empty() {
        println!(
            "\n{}",
            format!("Errors ({}):", report.errors.len()).red().bold()
        );
        print_findings(&report.errors, |line| println!("  {} {line}", "✗".red()));
    }

    if !report.warnings.is_empty() {
        println!(
            "\n{}",
            format!("Warnings ({}):", report.warnings.len()).yellow().bold()
        );
        print_findings(&report.warnings, |line| println!("  {} {line}", "⚠".yellow()));
    }

    println!();
    println!(
        "{}, {}, {}, {} in {}",
        format_count(report.passed, "passed", "passed"),
        format_count(report.errors.len(), "error", "errors"),
        format_count(report.warnings.len(), "warning", "warnings"),
        format_count(report.skipped, "skipped", "skipped"),
        format_duration(report.duration)
    );

    let verdict = report.verdict.to_string();
    match report.verdict {
        Verdict::Pass => println!("{}", verdict.green().bold()),
        Verdict::PassWithWarnings => println!("{}", verdict.yellow().bold()),
        Verdict::Fail => println!("{}", verdict.red().bold()),
    }
}

fn print_findings(findings: &[Finding], print: impl Fn(&str)) {
    for finding in findings {
        print(&finding.to_string());
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    project: String,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Render a report as pretty-printed JSON
pub fn render_json(report: &RunReport, project: &Path) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        generated_at: Utc::now(),
        project: project.display().to_string(),
        report,
    })
}

/// Print the checklist grouped by phase, without evaluating it
pub fn print_rule_list(rules: &[Rule]) {
    let width = rules.iter().map(|r| r.id().len()).max().unwrap_or(0);
    let mut current = None;

    for rule in rules {
        if current != Some(rule.phase()) {
            current = Some(rule.phase());
            Status::header(rule.phase().title());
        }
        let disposition = if rule.is_required() {
            "required".red().to_string()
        } else {
            "optional".dimmed().to_string()
        };
        println!(
            "  {:<width$}  {}  {:<16}  {}",
            rule.id(),
            disposition,
            rule.kind().to_string(),
            rule.description()
        );
    }

    println!();
    println!("{}", format_count(rules.len(), "rule", "rules"));
}

/// Render the checklist as a JSON array
pub fn render_rule_list_json(rules: &[Rule]) -> serde_json::Result<String> {
    let summaries: Vec<_> = rules.iter().map(Rule::summary).collect();
    serde_json::to_string_pretty(&summaries)
}
