//! Core utilities for the qualitygate project verifier
//!
//! This crate provides the building blocks the checklist engine sits on:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **File scanning**: deterministic recursive discovery with filtering
//! - **Process execution**: command execution with an enforced timeout
//! - **Configuration**: TOML-based configuration with validation
//!
//! # Example
//!
//! ```rust,no_run
//! use qualitygate_core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(None, Path::new(".")).expect("invalid configuration");
//! println!("build tool: {}", config.schema.commands.program);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod file_scanner;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::file_scanner::FileScanner;
    pub use crate::process::{command_exists, run_with_timeout, CommandResult};
}
