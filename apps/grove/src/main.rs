//! Grove CLI - observe repositories against their declared ecology
//!
//! This CLI reads collaborator data from files and prints:
//! - Validated declarations or their rejections
//! - Per-repository observations and ritual invitations
//! - Portfolio tensions and ecosystem triggers
//! - Reconstructed timelines
//! - Structural signals reduced from raw source listings

use clap::{Parser, Subcommand};
use grove::cli::{cmd_observe, cmd_parse, cmd_portfolio, cmd_signals, cmd_timeline, resolve_now};
use grove::config::{GroveConfig, OutputFormat};
use grove::error::CliResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Grove CLI application
#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Grove - observational repository ecology", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "GROVE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Observation time (RFC 3339); defaults to now
    #[arg(long, global = true)]
    now: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Print JSON instead of text (same as --output json)
    #[arg(long, global = true, conflicts_with = "output")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Validate a .grove.yaml declaration
    Parse { file: PathBuf },

    /// Observe one repository
    Observe { file: PathBuf },

    /// Observe a portfolio: tensions, invitations, triggers
    Portfolio { file: PathBuf },

    /// Reconstruct a repository's timeline
    Timeline { file: PathBuf },

    /// Reduce a raw source listing to structural signals
    Signals { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = GroveConfig::load(cli.config.as_deref())?
        .with_output(cli.output)
        .with_json(cli.json);
    let now = resolve_now(cli.now.as_deref())?;

    match cli.command {
        Commands::Parse { file } => cmd_parse(&file, &config),
        Commands::Observe { file } => cmd_observe(&file, &config, now),
        Commands::Portfolio { file } => cmd_portfolio(&file, &config),
        Commands::Timeline { file } => cmd_timeline(&file, &config, now),
        Commands::Signals { file } => cmd_signals(&file, &config),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn output_flag_parses_value_enum() {
        let cli = Cli::try_parse_from(["grove", "--output", "json", "parse", "a.yaml"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(!cli.json);

        assert!(Cli::try_parse_from(["grove", "--output", "xml", "parse", "a.yaml"]).is_err());
        assert!(
            Cli::try_parse_from(["grove", "--output", "text", "--json", "parse", "a.yaml"])
                .is_err()
        );
    }
}
