//! qualitygate - rule-based project quality verifier
//!
//! Checks a crate directory against a checklist of expected files, manifest
//! fields, layout conventions and build-tool results, then reports every
//! error and warning in one pass.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use qualitygate_checks::{checklist, CheckExecutor, Rule, Runner};
use qualitygate_cli::output::Status;
use qualitygate_cli::report::{print_rule_list, print_summary, render_json, render_rule_list_json, TextReporter};
use qualitygate_core::config::{Config, ConfigSchema};
use qualitygate_core::error::exit_codes;
use qualitygate_telemetry::{LogFormat, TelemetryConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "qualitygate")]
#[command(about = "Rule-based project quality verifier")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Format of diagnostic log lines on stderr
    #[arg(long, value_enum, global = true, default_value_t = LogFormatArg::Compact)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a project directory against the checklist
    Run(RunArgs),

    /// Print the effective checklist without evaluating it
    List(ListArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Project directory
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Configuration file (default: discovered in DIR)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Rule id to leave out (repeatable)
    #[arg(long = "skip", value_name = "ID")]
    skip: Vec<String>,

    /// Leave out format/lint/test/audit commands
    #[arg(long)]
    no_commands: bool,

    /// Timeout in seconds for format, lint and test commands
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

#[derive(Args)]
struct ListArgs {
    /// Project directory whose configuration is applied
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Configuration file (default: discovered in DIR)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::for_verbosity(cli.verbose).with_format(cli.log_format.into());
    qualitygate_telemetry::init_with_config(telemetry).context("Failed to initialize logging")?;
    tracing::debug!(session_id = qualitygate_telemetry::session_id(), "starting qualitygate");

    let code = match cli.command {
        Commands::Run(args) => run(&args, cli.verbose),
        Commands::List(args) => list(&args),
    };

    std::process::exit(code);
}

fn run(args: &RunArgs, verbose: bool) -> i32 {
    let root = args.dir.as_path();
    let schema = match load_schema(root, args.config.as_deref(), |schema| {
        if args.no_commands {
            schema.commands.enabled = false;
        }
        if let Some(secs) = args.timeout {
            schema.commands.timeout_secs = secs;
        }
        schema.rules.skip.extend(args.skip.iter().cloned());
    }) {
        Ok(schema) => schema,
        Err(code) => return code,
    };

    let Some(rules) = build_rules(&schema) else {
        return exit_codes::CONFIG_ERROR;
    };

    let runner = Runner::new(CheckExecutor::new(&schema));

    match args.format {
        OutputFormat::Text => {
            println!(
                "{} {}",
                "Verifying".bold(),
                root.display().to_string().cyan()
            );
            let mut reporter = TextReporter::new().verbose(verbose);
            let report = runner.run_with(&rules, root, &mut reporter);
            print_summary(&report);
            report.exit_code()
        }
        OutputFormat::Json => {
            let report = runner.run(&rules, root);
            match render_json(&report, root) {
                Ok(json) => {
                    println!("{json}");
                    report.exit_code()
                }
                Err(e) => {
                    Status::fatal(&format!("Failed to render report: {e}"));
                    exit_codes::FAILURE
                }
            }
        }
    }
}

fn list(args: &ListArgs) -> i32 {
    let schema = match load_schema(&args.dir, args.config.as_deref(), |_| {}) {
        Ok(schema) => schema,
        Err(code) => return code,
    };

    let Some(rules) = build_rules(&schema) else {
        return exit_codes::CONFIG_ERROR;
    };

    match args.format {
        OutputFormat::Text => {
            print_rule_list(&rules);
            exit_codes::SUCCESS
        }
        OutputFormat::Json => match render_rule_list_json(&rules) {
            Ok(json) => {
                println!("{json}");
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::fatal(&format!("Failed to render checklist: {e}"));
                exit_codes::FAILURE
            }
        },
    }
}

/// Load and validate configuration, applying command-line overrides.
/// Any problem is reported and mapped to the configuration exit code.
fn load_schema(
    root: &Path,
    explicit: Option<&Path>,
    overrides: impl FnOnce(&mut ConfigSchema),
) -> std::result::Result<ConfigSchema, i32> {
    if !root.is_dir() {
        Status::fatal(&format!("Project directory not found: {}", root.display()));
        return Err(exit_codes::CONFIG_ERROR);
    }

    let config = Config::load(explicit, root).map_err(|e| {
        Status::fatal(&e.to_string());
        exit_codes::CONFIG_ERROR
    })?;
    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "using configuration file");
    }

    let mut schema = config.schema;
    overrides(&mut schema);
    schema.validate().map_err(|e| {
        Status::fatal(&e.to_string());
        exit_codes::CONFIG_ERROR
    })?;

    Ok(schema)
}

fn build_rules(schema: &ConfigSchema) -> Option<Vec<Rule>> {
    checklist::build(schema)
        .map_err(|e| Status::fatal(&e.to_string()))
        .ok()
}
