use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use idxm::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct RangeArgs {
    /// First date to calculate (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to calculate (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Price CSV to read instead of the configured one
    #[arg(long)]
    prices: Option<PathBuf>,
}

impl RangeArgs {
    fn into_run_args(self, output: Option<PathBuf>) -> idxm::RunArgs {
        idxm::RunArgs {
            start: self.start,
            end: self.end,
            prices: self.prices,
            output,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate index levels and export them
    Calculate {
        #[command(flatten)]
        range: RangeArgs,

        /// Export file (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display the composition chosen for each month
    Compositions {
        #[command(flatten)]
        range: RangeArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => match config_path {
            Some(path) => idxm::cli::setup::setup_at_path(path),
            None => idxm::cli::setup::setup(),
        },
        Some(Commands::Calculate { range, output }) => idxm::run_command(
            idxm::AppCommand::Calculate(range.into_run_args(output)),
            config_path,
        ),
        Some(Commands::Compositions { range }) => idxm::run_command(
            idxm::AppCommand::Compositions(range.into_run_args(None)),
            config_path,
        ),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
