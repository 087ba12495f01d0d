//! Configuration schema definitions
//!
//! Every section defaults through serde, so an empty file (or no file at
//! all) yields the standard checklist settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSchema {
    /// `[commands]`: build-tool invocations
    #[serde(default)]
    pub commands: CommandsConfig,

    /// `[size]`: oversized-file scan
    #[serde(default)]
    pub size: SizeConfig,

    /// `[secrets]`: hardcoded-credential scan
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// `[rules]`: skipped and custom rules
    #[serde(default)]
    pub rules: RulesConfig,
}

impl ConfigSchema {
    /// Reject values that would make a rule meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.commands.timeout_secs == 0 {
            return Err(Error::config_validation("commands.timeout_secs must be greater than 0"));
        }
        if self.commands.audit_timeout_secs == 0 {
            return Err(Error::config_validation(
                "commands.audit_timeout_secs must be greater than 0",
            ));
        }
        if self.commands.program.trim().is_empty() {
            return Err(Error::config_validation("commands.program must not be empty"));
        }
        if self.size.max_file_bytes == 0 {
            return Err(Error::config_validation("size.max_file_bytes must be greater than 0"));
        }

        let mut seen = HashSet::new();
        for rule in &self.rules.custom {
            if rule.id.trim().is_empty() {
                return Err(Error::config_validation("custom rule ids must not be empty"));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(Error::config_validation(format!(
                    "duplicate custom rule id '{}'",
                    rule.id
                )));
            }
            match &rule.check {
                CustomCheck::FileCountAtLeast { minimum: 0, .. } => {
                    return Err(Error::config_validation(format!(
                        "custom rule '{}': minimum must be greater than 0",
                        rule.id
                    )));
                }
                CustomCheck::ContentMatchesPattern { pattern, .. } => {
                    if let Err(e) = regex::Regex::new(pattern) {
                        return Err(Error::config_validation(format!(
                            "custom rule '{}': invalid pattern: {e}",
                            rule.id
                        )));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// External build-tool invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Whether format/lint/test/audit commands are part of the checklist
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Build tool executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Timeout for format, lint and test commands
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for the dependency-usage audit
    #[serde(default = "default_audit_timeout_secs")]
    pub audit_timeout_secs: u64,
}

impl CommandsConfig {
    /// Budget for format, lint and test commands
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Budget for the dependency-usage audit
    #[must_use]
    pub fn audit_timeout(&self) -> Duration {
        Duration::from_secs(self.audit_timeout_secs)
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_program(),
            timeout_secs: default_timeout_secs(),
            audit_timeout_secs: default_audit_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_program() -> String {
    "cargo".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_audit_timeout_secs() -> u64 {
    60
}

/// Oversized-file scan settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeConfig {
    /// Files strictly larger than this are reported
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Extensions never reported (documentation, images)
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Directory names skipped entirely (build output, version control)
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            excluded_extensions: default_excluded_extensions(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

fn default_excluded_extensions() -> Vec<String> {
    vec!["md", "pdf", "png", "jpg", "jpeg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excluded_dirs() -> Vec<String> {
    vec!["target".to_string(), ".git".to_string()]
}

/// Secrets scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Directory scanned, relative to the project root
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Extension of scanned files
    #[serde(default = "default_extension")]
    pub extension: String,

    /// A file containing any of these (case-insensitive) is never reported
    #[serde(default = "default_suppress_markers")]
    pub suppress_markers: Vec<String>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            extension: default_extension(),
            suppress_markers: default_suppress_markers(),
        }
    }
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_extension() -> String {
    "rs".to_string()
}

fn default_suppress_markers() -> Vec<String> {
    vec!["test".to_string(), "example".to_string()]
}

/// Checklist adjustments
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    /// Rule ids removed from the checklist
    #[serde(default)]
    pub skip: Vec<String>,

    /// Rules appended to the checklist
    #[serde(default)]
    pub custom: Vec<CustomRule>,
}

/// A user-declared rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRule {
    /// Unique id, usable in `skip`
    pub id: String,

    /// Phase name, e.g. "documentation"; defaults to "custom"
    #[serde(default = "default_phase")]
    pub phase: String,

    /// Text shown in the report
    pub description: String,

    /// A failing required rule is an error, otherwise a warning
    #[serde(default)]
    pub required: bool,

    /// What the rule verifies
    pub check: CustomCheck,
}

fn default_phase() -> String {
    "custom".to_string()
}

/// Serialized form of a rule's check; mirrors the rule kinds one to one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomCheck {
    /// `path` exists
    FileExists {
        /// Path relative to the project root
        path: String,
    },
    /// `path` contains `needle` verbatim
    ContentContains {
        /// Path relative to the project root
        path: String,
        /// Exact text to look for
        needle: String,
    },
    /// `pattern` matches somewhere in `path`
    ContentMatchesPattern {
        /// Path relative to the project root
        path: String,
        /// Regular expression
        pattern: String,
    },
    /// Occurrences of all `needles` in `path` add up to at least `minimum`
    MatchCountAtLeast {
        /// Path relative to the project root
        path: String,
        /// Texts whose occurrences are summed
        needles: Vec<String>,
        /// Lowest passing total
        minimum: usize,
    },
    /// `dir` holds at least `minimum` files with `extension`, recursively
    FileCountAtLeast {
        /// Directory relative to the project root
        dir: String,
        /// Extension without the dot
        #[serde(default = "default_extension")]
        extension: String,
        /// Lowest passing count, at least 1
        minimum: usize,
    },
    /// `program args..` exits with status 0 within the timeout
    ExternalCommandSucceeds {
        /// Executable name or path
        program: String,
        /// Arguments passed as-is
        #[serde(default)]
        args: Vec<String>,
        /// Override of `commands.timeout_secs`
        #[serde(default)]
        timeout_secs: Option<u64>,
        /// Executable that must be installed; the rule is skipped otherwise
        #[serde(default)]
        requires: Option<String>,
    },
    /// `path` does not exist
    ForbiddenPathAbsent {
        /// Path relative to the project root
        path: String,
    },
    /// The secret scan finds nothing
    NoHardcodedSecrets,
    /// No file exceeds `size.max_file_bytes`
    NoOversizedFiles,
}
