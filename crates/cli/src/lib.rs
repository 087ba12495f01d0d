//! Terminal presentation for qualitygate
//!
//! Provides the presentation layer over a run:
//! - Status lines and headers
//! - Spinners for long-running commands
//! - The phased report, final summary and JSON rendering

#![warn(missing_docs)]

pub mod output;
pub mod progress;
pub mod report;

pub use output::{format_count, format_duration, Status};
pub use report::{print_rule_list, print_summary, render_json, render_rule_list_json, TextReporter};
