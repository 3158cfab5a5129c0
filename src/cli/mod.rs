use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod ui;

#[derive(Parser)]
#[command(
    name = "sacm",
    about = "Artifact routing and validation core for a multi-agent design pipeline",
    version,
    author,
    long_about = None
)]
pub struct SacmCli {
    /// Sets the log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a stage payload against its artifact schema
    Validate {
        /// Stage whose schema to validate against
        /// (architecture, implementation, security-audit, documentation)
        #[arg(short, long)]
        stage: Option<String>,

        /// Path to the JSON payload to validate
        #[arg(short, long)]
        payload: PathBuf,
    },

    /// Run the security audit over a source tree
    Audit {
        /// Root directory to scan
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Write the compliance report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Query the semantic index for contextual chunks
    Query {
        /// Query text
        #[arg(short, long)]
        text: String,

        /// Number of chunks to retrieve
        #[arg(short)]
        k: Option<usize>,
    },
}
