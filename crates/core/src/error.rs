//! Structured error handling with codes, context and recovery suggestions
//!
//! Errors never escape a rule evaluation: the check executor turns them into
//! outcomes. They do surface for configuration problems, which abort a run
//! before any rule is evaluated.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // IO errors (2xxx)
    /// Any other I/O failure
    IoError = 2000,
    /// A file that had to exist does not
    FileNotFound = 2001,
    /// The file exists but cannot be read
    PermissionDenied = 2002,
    /// A directory that had to exist does not
    DirectoryNotFound = 2004,
    /// File content is not valid UTF-8
    DecodeError = 2005,

    // Configuration errors (3xxx)
    /// The configuration could not be located or read
    ConfigError = 3000,
    /// The configuration file is not valid TOML for the schema
    ConfigParseError = 3002,
    /// The configuration parsed but holds an unusable value
    ConfigValidationError = 3003,

    // Process errors (5xxx)
    /// An external command could not be started or awaited
    ProcessError = 5000,
    /// The executable is not on `PATH`
    CommandNotFound = 5001,
    /// An external command exceeded its time budget
    ProcessTimeout = 5003,

    // Validation errors (6xxx)
    /// A pattern failed to compile
    InvalidFormat = 6002,
}

impl ErrorCode {
    /// Get the numeric code
    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            6 => "Validation",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// True when the error was caused by a process exceeding its time budget
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::ProcessTimeout
    }

    /// True when the executable could not be located on the host
    #[must_use]
    pub fn is_command_not_found(&self) -> bool {
        self.code == ErrorCode::CommandNotFound
    }

    // Convenience constructors

    /// A required file is missing
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    /// A required directory is missing
    pub fn directory_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::DirectoryNotFound,
            format!("Directory not found: {}", path.as_ref().display()),
        )
    }

    /// `path` is not valid UTF-8
    pub fn decode(path: impl AsRef<std::path::Path>, err: std::string::FromUtf8Error) -> Self {
        Self::new(
            ErrorCode::DecodeError,
            format!("Could not decode {} as UTF-8: {}", path.as_ref().display(), err),
        )
        .with_source(err)
    }

    /// The configuration could not be located or read
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// The configuration holds an unusable value
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
            .with_suggestion("Fix the value in qualitygate.toml or remove it to use the default")
    }

    /// An external command could not be run
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    /// `cmd` is not installed
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(ErrorCode::CommandNotFound, format!("Command not found: {cmd}"))
            .with_suggestion(format!("Install {cmd} and ensure it's in your PATH"))
    }

    /// `cmd` ran longer than `secs` seconds
    pub fn timeout(cmd: &str, secs: u64) -> Self {
        Self::new(
            ErrorCode::ProcessTimeout,
            format!("Command {cmd} timed out after {secs}s"),
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Every required rule passed
    pub const SUCCESS: i32 = 0;
    /// At least one required rule failed
    pub const FAILURE: i32 = 1;
    /// The run could not start: bad directory or configuration
    pub const CONFIG_ERROR: i32 = 3;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::new(ErrorCode::InvalidFormat, format!("Regex error: {err}")).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach `context` to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
