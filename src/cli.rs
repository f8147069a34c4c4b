use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Command-line client for the TaskMaster project management API.
/// Credentials are stored under ~/.taskmaster (or --dir).
#[derive(Parser)]
#[command(name = "tm", version, about = "TaskMaster project management client")]
pub struct Cli {
    /// Base URL of the API server. Falls back to $TASKMASTER_API_URL,
    /// then to http://localhost:8080.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config directory holding stored credentials.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
