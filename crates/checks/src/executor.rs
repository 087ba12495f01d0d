//! Check execution
//!
//! [`CheckExecutor::evaluate`] performs exactly one check and always returns
//! an [`Outcome`]. I/O errors, decode errors, missing tools and timeouts are
//! all folded into the outcome's status and detail, so the runner can walk
//! the whole checklist unconditionally.

use crate::outcome::Outcome;
use crate::rule::{Check, CommandSpec, Rule};
use crate::secrets::SecretScanner;
use qualitygate_core::config::{ConfigSchema, SizeConfig};
use qualitygate_core::file_scanner::{self, OversizedFile};
use qualitygate_core::process::{command_exists, run_with_timeout};
use qualitygate_core::ErrorCode;
use regex::Regex;
use std::num::NonZeroUsize;
use std::path::Path;

/// Oversized files listed in a failure detail
const MAX_LISTED_FILES: usize = 5;

const MIB: f64 = 1024.0 * 1024.0;

/// Evaluates rules against a project root
#[derive(Debug, Clone)]
pub struct CheckExecutor {
    size: SizeConfig,
    secrets: SecretScanner,
}

impl Default for CheckExecutor {
    fn default() -> Self {
        Self::new(&ConfigSchema::default())
    }
}

impl CheckExecutor {
    pub fn new(schema: &ConfigSchema) -> Self {
        Self {
            size: schema.size.clone(),
            secrets: SecretScanner::new(&schema.secrets),
        }
    }

    /// Evaluate one rule. Never panics on project state and never errors.
    pub fn evaluate<'r>(&self, rule: &'r Rule, root: &Path) -> Outcome<'r> {
        tracing::debug!(rule = rule.id(), kind = %rule.kind(), "evaluating rule");

        match rule.check() {
            Check::FileExists { path } => {
                let display = path.display();
                Outcome::from_bool(
                    rule,
                    root.join(path).exists(),
                    format!("{display} present"),
                    format!("missing: {display}"),
                )
            }
            Check::ContentContains { path, needle } => {
                with_content(rule, root, path, |content| {
                    Outcome::from_bool(
                        rule,
                        content.contains(needle.as_str()),
                        format!("'{needle}' found"),
                        format!("'{needle}' not found in {}", path.display()),
                    )
                })
            }
            Check::ContentMatchesPattern { path, pattern } => {
                with_content(rule, root, path, |content| match_pattern(rule, path, pattern, content))
            }
            Check::MatchCountAtLeast {
                path,
                needles,
                minimum,
            } => with_content(rule, root, path, |content| {
                let count: usize = needles.iter().map(|n| content.matches(n.as_str()).count()).sum();
                Outcome::from_bool(
                    rule,
                    count >= *minimum,
                    format!("{count} found (minimum {minimum})"),
                    format!("only {count} found in {}, minimum {minimum}", path.display()),
                )
            }),
            Check::FileCountAtLeast {
                dir,
                extension,
                minimum,
            } => count_files(rule, root, dir, extension, *minimum),
            Check::ExternalCommandSucceeds(spec) => run_command(rule, root, spec),
            Check::ForbiddenPathAbsent { path } => {
                let display = path.display();
                Outcome::from_bool(
                    rule,
                    !root.join(path).exists(),
                    format!("{display} absent"),
                    format!("forbidden path present: {display}"),
                )
            }
            Check::NoHardcodedSecrets => match self.secrets.scan(root) {
                None => Outcome::pass(rule, "no hardcoded credentials detected"),
                Some(found) => Outcome::fail(
                    rule,
                    format!(
                        "possible hardcoded {} in {} ({})",
                        found.pattern_name,
                        found.file.display(),
                        found.matched_text
                    ),
                ),
            },
            Check::NoOversizedFiles => self.oversized(rule, root),
        }
    }

    fn oversized<'r>(&self, rule: &'r Rule, root: &Path) -> Outcome<'r> {
        let found = match file_scanner::oversized_files(
            root,
            self.size.max_file_bytes,
            &self.size.excluded_extensions,
            &self.size.excluded_dirs,
        ) {
            Ok(found) => found,
            Err(e) => return Outcome::fail(rule, e.message),
        };

        if found.is_empty() {
            return Outcome::pass(rule, format!("no file over {}", format_mib(self.size.max_file_bytes)));
        }

        Outcome::fail(rule, describe_oversized(&found, self.size.max_file_bytes))
    }
}

/// Read `path` as UTF-8 and hand the text to `check`; read problems
/// become Fail outcomes.
fn with_content<'r>(
    rule: &'r Rule,
    root: &Path,
    path: &Path,
    check: impl FnOnce(&str) -> Outcome<'r>,
) -> Outcome<'r> {
    match file_scanner::read_text(&root.join(path)) {
        Ok(content) => check(&content),
        Err(e) if e.code == ErrorCode::FileNotFound => {
            Outcome::fail(rule, format!("file not found: {}", path.display()))
        }
        Err(e) if e.code == ErrorCode::DecodeError => {
            tracing::warn!(file = %path.display(), "file is not valid UTF-8");
            Outcome::fail(rule, e.message)
        }
        Err(e) => Outcome::fail(rule, format!("could not read {}: {}", path.display(), e.message)),
    }
}

fn match_pattern<'r>(rule: &'r Rule, path: &Path, pattern: &Regex, content: &str) -> Outcome<'r> {
    Outcome::from_bool(
        rule,
        pattern.is_match(content),
        format!("pattern '{pattern}' found"),
        format!("pattern '{pattern}' not found in {}", path.display()),
    )
}

fn count_files<'r>(
    rule: &'r Rule,
    root: &Path,
    dir: &Path,
    extension: &str,
    minimum: NonZeroUsize,
) -> Outcome<'r> {
    let full = root.join(dir);
    if !full.is_dir() {
        return Outcome::fail(rule, format!("directory not found: {}", dir.display()));
    }

    match file_scanner::count_files_with_extension(&full, extension) {
        Ok(count) => Outcome::from_bool(
            rule,
            count >= minimum.get(),
            format!("{count} .{extension} file(s), minimum {minimum}"),
            format!(
                "only {count} .{extension} file(s) in {}, minimum {minimum}",
                dir.display()
            ),
        ),
        Err(e) => Outcome::fail(rule, e.message),
    }
}

fn run_command<'r>(rule: &'r Rule, root: &Path, spec: &CommandSpec) -> Outcome<'r> {
    let prerequisite = spec.requires.as_deref().unwrap_or(&spec.program);
    if !command_exists(prerequisite) {
        return tool_not_installed(rule, prerequisite);
    }

    match run_with_timeout(&spec.program, &spec.args, root, spec.timeout) {
        Ok(result) if result.success => Outcome::pass(
            rule,
            format!("exit code 0 in {:.1}s", result.duration.as_secs_f32()),
        ),
        Ok(result) => {
            tracing::debug!(
                command = %spec.command_line(),
                output = %last_lines(&result.combined_output(), 10),
                "command failed"
            );
            Outcome::fail(rule, format!("command exit code {}", result.exit_code))
        }
        Err(e) if e.is_timeout() => Outcome::fail(rule, "timeout"),
        Err(e) if e.is_command_not_found() => tool_not_installed(rule, &spec.program),
        Err(e) => Outcome::fail(rule, e.message),
    }
}

/// Missing tools only count against required rules
fn tool_not_installed<'r>(rule: &'r Rule, tool: &str) -> Outcome<'r> {
    if rule.is_required() {
        tracing::warn!(rule = rule.id(), tool, "tool not installed");
        Outcome::fail(rule, "tool not installed")
    } else {
        tracing::debug!(rule = rule.id(), tool, "optional tool not installed, skipping");
        Outcome::skipped(rule, "tool not installed")
    }
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

fn describe_oversized(found: &[OversizedFile], max_bytes: u64) -> String {
    let listed: Vec<String> = found
        .iter()
        .take(MAX_LISTED_FILES)
        .map(|f| format!("{} ({})", f.path.display(), format_mib(f.size)))
        .collect();

    let mut detail = format!(
        "{} file(s) over {}: {}",
        found.len(),
        format_mib(max_bytes),
        listed.join(", ")
    );
    if found.len() > MAX_LISTED_FILES {
        detail.push_str(&format!(", and {} more", found.len() - MAX_LISTED_FILES));
    }
    detail
}

#[allow(clippy::cast_precision_loss)]
fn format_mib(bytes: u64) -> String {
    format!("{:.1} MiB", bytes as f64 / MIB)
}
