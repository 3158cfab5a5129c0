use anyhow::Result;
use clap::Parser;
use log::info;

use sacm::cli::{Commands, SacmCli};
use sacm::config::SacmConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command line arguments
    let cli = SacmCli::parse();

    // Setup logging
    setup_logging(&cli.log_level);

    // Load environment variables from .env if present
    if dotenv::dotenv().is_ok() {
        info!("Loaded environment variables from .env");
    }

    let config = SacmConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Validate { stage, payload } => {
            sacm::cli::commands::validate::execute(stage.as_deref(), payload)?;
        }
        Commands::Audit { root, output } => {
            sacm::cli::commands::audit::execute(&config, root.as_deref(), output.as_deref())?;
        }
        Commands::Query { text, k } => {
            sacm::cli::commands::query::execute(&config, text, *k).await?;
        }
    }

    Ok(())
}

fn setup_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();
}
