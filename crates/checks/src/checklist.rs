//! The standard checklist
//!
//! Rules are declared as data, grouped by phase, in evaluation order.
//! [`build`] turns the table plus the configuration into the final rule
//! list: commands are dropped when disabled, skipped ids are removed and
//! custom rules are appended.

use crate::rule::{Check, CommandSpec, Phase, Rule};
use qualitygate_core::config::{CommandsConfig, ConfigSchema};
use qualitygate_core::{Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::num::NonZeroUsize;

/// Lowest number of README badges that counts as "has badges"
const MIN_BADGES: usize = 3;

const REQUIRED_FILES: &[(&str, &str)] = &[
    ("cargo-toml", "Cargo.toml"),
    ("readme", "README.md"),
    ("license", "LICENSE"),
    ("gitignore", ".gitignore"),
];

const OPTIONAL_FILES: &[(&str, &str)] = &[
    ("changelog", "CHANGELOG.md"),
    ("citation", "CITATION.cff"),
];

const REQUIRED_MANIFEST_FIELDS: &[&str] = &[
    "name",
    "version",
    "edition",
    "license",
    "description",
    "repository",
    "readme",
    "rust-version",
    "documentation",
];

const OPTIONAL_MANIFEST_ENTRIES: &[(&str, &str)] = &[
    ("manifest-exclude", "exclude"),
    ("manifest-docs-rs", "[package.metadata.docs.rs]"),
];

/// (id, directory, minimum, required)
const CODE_LAYOUT: &[(&str, &str, usize, bool)] = &[
    ("src-files", "src", 1, true),
    ("test-files", "tests", 2, true),
    ("example-files", "examples", 1, true),
    ("bench-files", "benches", 1, false),
];

const SECURITY_FILES: &[(&str, &str)] = &[
    ("security-policy", "SECURITY.md"),
    ("code-of-conduct", "CODE_OF_CONDUCT.md"),
    ("deny-toml", "deny.toml"),
];

const WORKFLOWS: &[&str] = &["ci", "audit", "deny", "sbom"];

const TEMPLATES: &[(&str, &str)] = &[
    ("bug-report-template", ".github/ISSUE_TEMPLATE/bug_report.md"),
    ("feature-request-template", ".github/ISSUE_TEMPLATE/feature_request.md"),
    ("issue-template-config", ".github/ISSUE_TEMPLATE/config.yml"),
    ("pr-template", ".github/pull_request_template.md"),
];

/// (id, path, required)
const FORBIDDEN_PATHS: &[(&str, &str, bool)] = &[
    ("forbid-target", "target", true),
    ("forbid-env", ".env", true),
    ("forbid-env-local", ".env.local", true),
    ("forbid-ds-store", ".DS_Store", false),
    ("forbid-thumbs-db", "Thumbs.db", false),
    ("forbid-idea", ".idea", false),
    ("forbid-vscode", ".vscode", false),
];

fn file_exists(path: &str) -> Check {
    Check::FileExists { path: path.into() }
}

fn contains(path: &str, needle: &str) -> Check {
    Check::ContentContains {
        path: path.into(),
        needle: needle.into(),
    }
}

fn pattern(path: &str, pattern: &str) -> Result<Check> {
    Ok(Check::ContentMatchesPattern {
        path: path.into(),
        pattern: Regex::new(pattern)?,
    })
}

/// The built-in rules in evaluation order, before `skip` and custom rules
/// are applied.
pub fn standard(commands: &CommandsConfig) -> Result<Vec<Rule>> {
    let mut rules = table(commands)?;
    if !commands.enabled {
        rules.retain(|r| !matches!(r.check(), Check::ExternalCommandSucceeds(_)));
    }
    Ok(rules)
}

/// Every built-in rule, command rules included
fn table(commands: &CommandsConfig) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();

    for (id, path) in REQUIRED_FILES {
        rules.push(Rule::required(*id, Phase::Structure, *path, file_exists(path)));
    }
    for (id, path) in OPTIONAL_FILES {
        rules.push(Rule::optional(*id, Phase::Structure, *path, file_exists(path)));
    }

    for field in REQUIRED_MANIFEST_FIELDS {
        rules.push(Rule::required(
            format!("manifest-{field}"),
            Phase::Manifest,
            format!("Cargo.toml declares {field}"),
            contains("Cargo.toml", &format!("{field} =")),
        ));
    }
    for (id, needle) in OPTIONAL_MANIFEST_ENTRIES {
        rules.push(Rule::optional(
            *id,
            Phase::Manifest,
            format!("Cargo.toml has {needle}"),
            contains("Cargo.toml", needle),
        ));
    }

    for (id, dir, minimum, required) in CODE_LAYOUT {
        let minimum = NonZeroUsize::new(*minimum).unwrap_or(NonZeroUsize::MIN);
        rules.push(Rule::new(
            *id,
            Phase::CodeLayout,
            format!("{dir}/ has at least {minimum} .rs file(s)"),
            *required,
            Check::FileCountAtLeast {
                dir: (*dir).into(),
                extension: "rs".into(),
                minimum,
            },
        ));
    }

    for (id, path) in SECURITY_FILES {
        rules.push(Rule::optional(*id, Phase::Security, *path, file_exists(path)));
    }
    rules.push(Rule::optional(
        "forbid-unsafe",
        Phase::Security,
        "src/lib.rs forbids unsafe code",
        contains("src/lib.rs", "#![forbid(unsafe_code)]"),
    ));

    for name in WORKFLOWS {
        let path = format!(".github/workflows/{name}.yml");
        rules.push(Rule::optional(
            format!("workflow-{name}"),
            Phase::Workflows,
            path.clone(),
            file_exists(&path),
        ));
    }

    for (id, path) in TEMPLATES {
        rules.push(Rule::optional(*id, Phase::Templates, *path, file_exists(path)));
    }

    rules.push(Rule::optional(
        "readme-badges",
        Phase::Documentation,
        format!("README.md shows at least {MIN_BADGES} badges"),
        Check::MatchCountAtLeast {
            path: "README.md".into(),
            needles: vec!["img.shields.io".into(), "docs.rs/badge".into()],
            minimum: MIN_BADGES,
        },
    ));
    rules.push(Rule::optional(
        "readme-installation",
        Phase::Documentation,
        "README.md has an installation section",
        pattern("README.md", "## (Installation|Instalação)")?,
    ));
    rules.push(Rule::optional(
        "readme-quickstart",
        Phase::Documentation,
        "README.md has a quickstart or usage example",
        pattern("README.md", "(## Quickstart|```rust)")?,
    ));
    rules.push(Rule::optional(
        "release-notes",
        Phase::Documentation,
        "RELEASE_NOTES.md",
        file_exists("RELEASE_NOTES.md"),
    ));

    for (id, path, required) in FORBIDDEN_PATHS {
        rules.push(Rule::new(
            *id,
            Phase::AntiPatterns,
            format!("{path} is not committed"),
            *required,
            Check::ForbiddenPathAbsent { path: (*path).into() },
        ));
    }
    rules.push(Rule::optional(
        "oversized-files",
        Phase::AntiPatterns,
        "no oversized files",
        Check::NoOversizedFiles,
    ));
    rules.push(Rule::required(
        "hardcoded-secrets",
        Phase::AntiPatterns,
        "no hardcoded secrets",
        Check::NoHardcodedSecrets,
    ));

    rules.extend(validation(commands));

    Ok(rules)
}

fn validation(commands: &CommandsConfig) -> Vec<Rule> {
    let program = commands.program.as_str();
    let subcommand = |name: &str| format!("{program}-{name}");

    vec![
        Rule::optional(
            "udeps",
            Phase::Validation,
            "no unused dependencies",
            Check::ExternalCommandSucceeds(
                CommandSpec::new(
                    program,
                    &["udeps", "--all-targets", "--all-features"],
                    commands.audit_timeout(),
                )
                .requires(subcommand("udeps")),
            ),
        ),
        Rule::required(
            "fmt",
            Phase::Validation,
            "code is formatted",
            Check::ExternalCommandSucceeds(CommandSpec::new(
                program,
                &["fmt", "--all", "--", "--check"],
                commands.timeout(),
            )),
        ),
        Rule::optional(
            "clippy",
            Phase::Validation,
            "clippy reports no warnings",
            Check::ExternalCommandSucceeds(
                CommandSpec::new(
                    program,
                    &["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"],
                    commands.timeout(),
                )
                .requires(subcommand("clippy")),
            ),
        ),
        Rule::required(
            "test",
            Phase::Validation,
            "tests pass",
            Check::ExternalCommandSucceeds(CommandSpec::new(
                program,
                &["test", "--all-features"],
                commands.timeout(),
            )),
        ),
    ]
}

/// The effective checklist for `schema`: the standard table without the
/// skipped ids, followed by custom rules in file order.
///
/// A custom rule may not reuse a built-in id, whether or not that rule is
/// active under the current configuration.
pub fn build(schema: &ConfigSchema) -> Result<Vec<Rule>> {
    let builtin = table(&schema.commands)?;
    let mut known: HashSet<&str> = builtin.iter().map(Rule::id).collect();

    let mut custom_rules = Vec::with_capacity(schema.rules.custom.len());
    for custom in &schema.rules.custom {
        if known.contains(custom.id.as_str()) {
            return Err(Error::config_validation(format!(
                "custom rule id '{}' is already used by a built-in rule",
                custom.id
            )));
        }
        custom_rules.push(Rule::from_custom(custom, &schema.commands)?);
    }
    known.extend(schema.rules.custom.iter().map(|c| c.id.as_str()));

    let skip: HashSet<&str> = schema.rules.skip.iter().map(String::as_str).collect();
    for id in unknown_ids(&skip, &known) {
        tracing::warn!(rule = id, "skip list names an unknown rule");
    }

    let commands_enabled = schema.commands.enabled;
    let rules = builtin
        .into_iter()
        .chain(custom_rules)
        .filter(|rule| {
            if !commands_enabled && matches!(rule.check(), Check::ExternalCommandSucceeds(_)) {
                tracing::debug!(rule = rule.id(), "commands disabled, dropping command rule");
                return false;
            }
            !skip.contains(rule.id())
        })
        .collect();

    Ok(rules)
}

/// Skip ids that name no rule at all, sorted
fn unknown_ids<'a>(skip: &HashSet<&'a str>, known: &HashSet<&str>) -> Vec<&'a str> {
    let mut unknown: Vec<&str> = skip.iter().copied().filter(|id| !known.contains(id)).collect();
    unknown.sort_unstable();
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use qualitygate_core::config::{CustomCheck, CustomRule};
    use qualitygate_core::ErrorCode;

    #[test]
    fn test_ids_are_unique() {
        let rules = standard(&CommandsConfig::default()).unwrap();
        let unique: HashSet<&str> = rules.iter().map(Rule::id).collect();
        assert_eq!(unique.len(), rules.len());
    }

    #[test]
    fn test_phases_are_contiguous() {
        let rules = standard(&CommandsConfig::default()).unwrap();
        let mut seen = Vec::new();
        for rule in &rules {
            if seen.last() != Some(&rule.phase()) {
                assert!(!seen.contains(&rule.phase()), "phase {} split", rule.phase());
                seen.push(rule.phase());
            }
        }
        assert_eq!(seen.first(), Some(&Phase::Structure));
        assert_eq!(seen.last(), Some(&Phase::Validation));
    }

    #[test]
    fn test_validation_order_and_timeouts() {
        let rules = standard(&CommandsConfig::default()).unwrap();
        let commands: Vec<&Rule> = rules.iter().filter(|r| r.phase() == Phase::Validation).collect();
        let order: Vec<&str> = commands.iter().map(|r| r.id()).collect();
        assert_eq!(order, vec!["udeps", "fmt", "clippy", "test"]);

        match commands[0].check() {
            Check::ExternalCommandSucceeds(spec) => {
                assert_eq!(spec.timeout.as_secs(), 60);
                assert_eq!(spec.requires.as_deref(), Some("cargo-udeps"));
            }
            other => panic!("unexpected check {other:?}"),
        }
        match commands[1].check() {
            Check::ExternalCommandSucceeds(spec) => {
                assert_eq!(spec.command_line(), "cargo fmt --all -- --check");
                assert_eq!(spec.timeout.as_secs(), 300);
                assert!(spec.requires.is_none());
            }
            other => panic!("unexpected check {other:?}"),
        }
        assert!(commands[1].is_required());
        assert!(!commands[2].is_required());
        assert!(commands[3].is_required());
    }

    #[test]
    fn test_commands_disabled_removes_validation() {
        let commands = CommandsConfig {
            enabled: false,
            ..CommandsConfig::default()
        };
        let rules = standard(&commands).unwrap();
        assert!(rules.iter().all(|r| r.phase() != Phase::Validation));
    }

    #[test]
    fn test_dispositions() {
        let rules = standard(&CommandsConfig::default()).unwrap();
        let find = |id: &str| rules.iter().find(|r| r.id() == id).unwrap();

        assert!(find("cargo-toml").is_required());
        assert!(!find("changelog").is_required());
        assert!(find("manifest-version").is_required());
        assert!(find("test-files").is_required());
        assert!(!find("bench-files").is_required());
        assert!(find("forbid-env").is_required());
        assert!(!find("forbid-vscode").is_required());
        assert!(find("hardcoded-secrets").is_required());
        assert!(!find("oversized-files").is_required());
    }

    #[test]
    fn test_build_applies_skip_and_custom() {
        let mut schema = ConfigSchema::default();
        schema.rules.skip = vec!["forbid-target".into(), "no-such-rule".into()];
        schema.rules.custom.push(CustomRule {
            id: "msrv-badge".into(),
            phase: "documentation".into(),
            description: "README mentions MSRV".into(),
            required: false,
            check: CustomCheck::ContentContains {
                path: "README.md".into(),
                needle: "MSRV".into(),
            },
        });

        let rules = build(&schema).unwrap();
        assert!(rules.iter().all(|r| r.id() != "forbid-target"));
        assert_eq!(rules.last().map(Rule::id), Some("msrv-badge"));
    }

    #[test]
    fn test_build_skip_can_remove_custom_rule() {
        let mut schema = ConfigSchema::default();
        schema.rules.custom.push(CustomRule {
            id: "extra".into(),
            phase: "custom".into(),
            description: "extra".into(),
            required: true,
            check: CustomCheck::FileExists { path: "x".into() },
        });
        schema.rules.skip = vec!["extra".into()];
        assert!(build(&schema).unwrap().iter().all(|r| r.id() != "extra"));
    }

    #[test]
    fn test_build_rejects_custom_id_shadowing_builtin() {
        let mut schema = ConfigSchema::default();
        schema.rules.custom.push(CustomRule {
            id: "readme".into(),
            phase: "documentation".into(),
            description: "README mentions MSRV".into(),
            required: false,
            check: CustomCheck::ContentContains {
                path: "README.md".into(),
                needle: "MSRV".into(),
            },
        });
        schema.rules.skip = vec!["readme".into()];

        let err = build(&schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("'readme'"));
    }

    #[test]
    fn test_custom_id_may_not_reuse_inactive_command_rule() {
        let mut schema = ConfigSchema::default();
        schema.commands.enabled = false;
        schema.rules.custom.push(CustomRule {
            id: "fmt".into(),
            phase: "custom".into(),
            description: "formatted".into(),
            required: true,
            check: CustomCheck::FileExists { path: "rustfmt.toml".into() },
        });
        assert!(build(&schema).is_err());
    }

    #[test]
    fn test_skipping_disabled_command_rule_is_known() {
        let mut schema = ConfigSchema::default();
        schema.commands.enabled = false;
        let builtin = table(&schema.commands).unwrap();
        let known: HashSet<&str> = builtin.iter().map(Rule::id).collect();
        let skip: HashSet<&str> = ["fmt", "clippy", "no-such-rule"].into_iter().collect();

        assert_eq!(unknown_ids(&skip, &known), vec!["no-such-rule"]);
        schema.rules.skip = vec!["fmt".into()];
        assert!(build(&schema).unwrap().iter().all(|r| r.phase() != Phase::Validation));
    }

    #[test]
    fn test_build_drops_custom_command_rule_when_disabled() {
        let mut schema = ConfigSchema::default();
        schema.commands.enabled = false;
        schema.rules.custom.push(CustomRule {
            id: "lint-docs".into(),
            phase: "custom".into(),
            description: "docs lint".into(),
            required: true,
            check: CustomCheck::ExternalCommandSucceeds {
                program: "make".into(),
                args: vec!["lint".into()],
                timeout_secs: None,
                requires: None,
            },
        });
        assert!(build(&schema).unwrap().iter().all(|r| r.id() != "lint-docs"));
    }

    #[test]
    fn test_build_rejects_bad_custom_regex() {
        let mut schema = ConfigSchema::default();
        schema.rules.custom.push(CustomRule {
            id: "bad".into(),
            phase: "custom".into(),
            description: "bad".into(),
            required: false,
            check: CustomCheck::ContentMatchesPattern {
                path: "README.md".into(),
                pattern: "([".into(),
            },
        });
        assert!(build(&schema).is_err());
    }
}
