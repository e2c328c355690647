pub mod cli;
pub mod core;
pub mod store;

pub use cli::RunArgs;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Calculate(RunArgs),
    Compositions(RunArgs),
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Index calculator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Calculate(args) => cli::calculate::run(&config, &args),
        AppCommand::Compositions(args) => cli::compositions::run(&config, &args),
    }
}
