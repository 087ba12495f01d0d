//! Rule model
//!
//! A rule pairs a [`Check`] with a description, a phase and a disposition.
//! The check is a tagged enum, so a kind can only ever carry the payload
//! that kind needs.

use qualitygate_core::config::{CommandsConfig, CustomCheck, CustomRule};
use qualitygate_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Inspection phase a rule belongs to; used for report grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Structure,
    Manifest,
    CodeLayout,
    Security,
    Workflows,
    Templates,
    Documentation,
    AntiPatterns,
    Validation,
    Custom,
}

impl Phase {
    /// Human-readable heading
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Phase::Structure => "Basic structure",
            Phase::Manifest => "Manifest fields",
            Phase::CodeLayout => "Code layout",
            Phase::Security => "Security and quality",
            Phase::Workflows => "CI workflows",
            Phase::Templates => "GitHub templates",
            Phase::Documentation => "Documentation",
            Phase::AntiPatterns => "Anti-patterns",
            Phase::Validation => "Code validation",
            Phase::Custom => "Custom rules",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Phase::Structure => "structure",
            Phase::Manifest => "manifest",
            Phase::CodeLayout => "code_layout",
            Phase::Security => "security",
            Phase::Workflows => "workflows",
            Phase::Templates => "templates",
            Phase::Documentation => "documentation",
            Phase::AntiPatterns => "anti_patterns",
            Phase::Validation => "validation",
            Phase::Custom => "custom",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let phase = match normalized.as_str() {
            "structure" => Phase::Structure,
            "manifest" => Phase::Manifest,
            "code_layout" => Phase::CodeLayout,
            "security" => Phase::Security,
            "workflows" => Phase::Workflows,
            "templates" => Phase::Templates,
            "documentation" => Phase::Documentation,
            "anti_patterns" => Phase::AntiPatterns,
            "validation" => Phase::Validation,
            "custom" => Phase::Custom,
            other => return Err(Error::config_validation(format!("unknown phase '{other}'"))),
        };
        Ok(phase)
    }
}

/// Discriminant of [`Check`], for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    FileExists,
    ContentContains,
    ContentMatchesPattern,
    MatchCountAtLeast,
    FileCountAtLeast,
    ExternalCommandSucceeds,
    ForbiddenPathAbsent,
    NoHardcodedSecrets,
    NoOversizedFiles,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::FileExists => "file-exists",
            RuleKind::ContentContains => "content-contains",
            RuleKind::ContentMatchesPattern => "content-matches",
            RuleKind::MatchCountAtLeast => "match-count",
            RuleKind::FileCountAtLeast => "file-count",
            RuleKind::ExternalCommandSucceeds => "command",
            RuleKind::ForbiddenPathAbsent => "forbidden-path",
            RuleKind::NoHardcodedSecrets => "secrets",
            RuleKind::NoOversizedFiles => "oversized-files",
        };
        f.write_str(s)
    }
}

/// An external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Executable that must be on PATH for the command to be meaningful,
    /// e.g. `cargo-clippy` for `cargo clippy`
    pub requires: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str], timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
            timeout,
            requires: None,
        }
    }

    #[must_use]
    pub fn requires(mut self, executable: impl Into<String>) -> Self {
        self.requires = Some(executable.into());
        self
    }

    /// `program arg1 arg2 ...`
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What a rule checks, with the parameters that check needs.
/// Paths are relative to the project root.
#[derive(Debug, Clone)]
pub enum Check {
    FileExists { path: PathBuf },
    ContentContains { path: PathBuf, needle: String },
    ContentMatchesPattern { path: PathBuf, pattern: Regex },
    MatchCountAtLeast { path: PathBuf, needles: Vec<String>, minimum: usize },
    FileCountAtLeast { dir: PathBuf, extension: String, minimum: NonZeroUsize },
    ExternalCommandSucceeds(CommandSpec),
    ForbiddenPathAbsent { path: PathBuf },
    NoHardcodedSecrets,
    NoOversizedFiles,
}

impl Check {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Check::FileExists { .. } => RuleKind::FileExists,
            Check::ContentContains { .. } => RuleKind::ContentContains,
            Check::ContentMatchesPattern { .. } => RuleKind::ContentMatchesPattern,
            Check::MatchCountAtLeast { .. } => RuleKind::MatchCountAtLeast,
            Check::FileCountAtLeast { .. } => RuleKind::FileCountAtLeast,
            Check::ExternalCommandSucceeds(_) => RuleKind::ExternalCommandSucceeds,
            Check::ForbiddenPathAbsent { .. } => RuleKind::ForbiddenPathAbsent,
            Check::NoHardcodedSecrets => RuleKind::NoHardcodedSecrets,
            Check::NoOversizedFiles => RuleKind::NoOversizedFiles,
        }
    }

    /// Path, directory or command the check operates on
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Check::FileExists { path }
            | Check::ContentContains { path, .. }
            | Check::ContentMatchesPattern { path, .. }
            | Check::MatchCountAtLeast { path, .. }
            | Check::ForbiddenPathAbsent { path } => path.display().to_string(),
            Check::FileCountAtLeast { dir, .. } => dir.display().to_string(),
            Check::ExternalCommandSucceeds(spec) => spec.command_line(),
            Check::NoHardcodedSecrets | Check::NoOversizedFiles => ".".to_string(),
        }
    }
}

/// One declarative checklist item
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    phase: Phase,
    description: String,
    required: bool,
    check: Check,
}

impl Rule {
    /// A rule whose failure is an error
    pub fn required(
        id: impl Into<String>,
        phase: Phase,
        description: impl Into<String>,
        check: Check,
    ) -> Self {
        Self::new(id, phase, description, true, check)
    }

    /// A rule whose failure is a warning
    pub fn optional(
        id: impl Into<String>,
        phase: Phase,
        description: impl Into<String>,
        check: Check,
    ) -> Self {
        Self::new(id, phase, description, false, check)
    }

    /// Secret findings are never downgraded: a secrets rule is required
    /// whatever disposition was asked for.
    pub fn new(
        id: impl Into<String>,
        phase: Phase,
        description: impl Into<String>,
        required: bool,
        check: Check,
    ) -> Self {
        let required = required || matches!(check, Check::NoHardcodedSecrets);
        Self {
            id: id.into(),
            phase,
            description: description.into(),
            required,
            check,
        }
    }

    /// Convert a rule declared in the configuration file
    pub fn from_custom(custom: &CustomRule, commands: &CommandsConfig) -> Result<Self> {
        let phase: Phase = custom.phase.parse()?;
        let check = match &custom.check {
            CustomCheck::FileExists { path } => Check::FileExists { path: path.into() },
            CustomCheck::ContentContains { path, needle } => Check::ContentContains {
                path: path.into(),
                needle: needle.clone(),
            },
            CustomCheck::ContentMatchesPattern { path, pattern } => {
                let pattern = Regex::new(pattern).map_err(|e| {
                    Error::from(e).with_context(format!("custom rule '{}'", custom.id))
                })?;
                Check::ContentMatchesPattern {
                    path: path.into(),
                    pattern,
                }
            }
            CustomCheck::MatchCountAtLeast {
                path,
                needles,
                minimum,
            } => Check::MatchCountAtLeast {
                path: path.into(),
                needles: needles.clone(),
                minimum: *minimum,
            },
            CustomCheck::FileCountAtLeast {
                dir,
                extension,
                minimum,
            } => Check::FileCountAtLeast {
                dir: dir.into(),
                extension: extension.clone(),
                minimum: NonZeroUsize::new(*minimum).ok_or_else(|| {
                    Error::config_validation(format!(
                        "custom rule '{}': minimum must be greater than 0",
                        custom.id
                    ))
                })?,
            },
            CustomCheck::ExternalCommandSucceeds {
                program,
                args,
                timeout_secs,
                requires,
            } => Check::ExternalCommandSucceeds(CommandSpec {
                program: program.clone(),
                args: args.clone(),
                timeout: timeout_secs.map_or_else(|| commands.timeout(), Duration::from_secs),
                requires: requires.clone(),
            }),
            CustomCheck::ForbiddenPathAbsent { path } => {
                Check::ForbiddenPathAbsent { path: path.into() }
            }
            CustomCheck::NoHardcodedSecrets => Check::NoHardcodedSecrets,
            CustomCheck::NoOversizedFiles => Check::NoOversizedFiles,
        };

        Ok(Self::new(
            custom.id.clone(),
            phase,
            custom.description.clone(),
            custom.required,
            check,
        ))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn check(&self) -> &Check {
        &self.check
    }

    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.check.kind()
    }

    /// Serializable view for listings
    #[must_use]
    pub fn summary(&self) -> RuleSummary {
        RuleSummary {
            id: self.id.clone(),
            phase: self.phase,
            kind: self.kind(),
            required: self.required,
            target: self.check.target(),
            description: self.description.clone(),
        }
    }
}

/// Flattened, serializable description of a rule
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub phase: Phase,
    pub kind: RuleKind,
    pub required: bool,
    pub target: String,
    pub description: String,
}
