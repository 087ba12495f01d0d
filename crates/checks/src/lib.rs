//! Rule engine for the qualitygate project verifier
//!
//! - [`rule`]: the declarative rule model
//! - [`executor`]: evaluates one rule into a tri-state [`Outcome`]
//! - [`secrets`]: hardcoded-credential scanning
//! - [`aggregator`]: errors, warnings and the final [`Verdict`]
//! - [`runner`]: drives a whole checklist, in order
//! - [`checklist`]: the standard rule table
//!
//! # Example
//!
//! ```rust,no_run
//! use qualitygate_checks::{checklist, Runner};
//! use qualitygate_core::config::ConfigSchema;
//! use std::path::Path;
//!
//! let schema = ConfigSchema::default();
//! let rules = checklist::build(&schema).expect("valid checklist");
//! let report = Runner::default().run(&rules, Path::new("."));
//! std::process::exit(report.exit_code());
//! ```

pub mod aggregator;
pub mod checklist;
pub mod executor;
pub mod outcome;
pub mod rule;
pub mod runner;
pub mod secrets;

pub use aggregator::{Finding, ResultAggregator, Verdict};
pub use executor::CheckExecutor;
pub use outcome::{Outcome, Status};
pub use rule::{Check, CommandSpec, Phase, Rule, RuleKind, RuleSummary};
pub use runner::{NoopObserver, RunObserver, RunReport, Runner};
pub use secrets::{SecretMatch, SecretScanner};
