//! # strata CLI Entry Point
//!
//! Parses arguments, initializes logging, loads the configuration and
//! dispatches to the subcommand handlers in `strata_cli`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use strata_cli::config::StrataConfig;
use strata_cli::format::{run_format, FormatArgs};
use strata_cli::validate::{run_validate, ValidateArgs};
use strata_cli::EXIT_ERROR;

/// Strata — format and validate structured data.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: $STRATA_CONFIG, then ./strata.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reformat strings, JSON, XML, date/times or source code.
    Format(FormatArgs),

    /// Validate strings, JSON, XML, date/times or value kinds.
    Validate(ValidateArgs),
}

fn init_tracing(verbose: u8, format: LogFormat) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "strata CLI starting");

    let result = StrataConfig::load(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Format(args) => run_format(args, &config),
        Commands::Validate(args) => run_validate(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
