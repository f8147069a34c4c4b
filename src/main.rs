//! # tm - TaskMaster CLI
//!
//! A command-line client for the TaskMaster project management API: sign in,
//! manage projects and tasks, and view filtered task lists, per-project
//! statistics and a month calendar straight from the terminal.
//!
//! ## Quick start
//!
//! ```bash
//! # Point the client at your server (or set TASKMASTER_API_URL)
//! tm --api-url https://tasks.example.com login ana@example.com secret
//!
//! # Create a task
//! tm task add "Wire the login screen" --project 3 --start 2024-03-01 --end 2024-03-10
//!
//! # Filtered listing
//! tm task list --project 3 --priority high --from 2024-03-01 --to 2024-03-31
//!
//! # Statistics and calendar
//! tm stats 3
//! tm calendar --month 2024-03 --project 3
//! ```
//!
//! Credentials are stored in `~/.taskmaster/credentials.json`; pass `--dir`
//! to keep them elsewhere.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

pub mod api;
pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod fields;
pub mod filter;
pub mod project;
pub mod session;
pub mod stats;
pub mod task;
pub mod user;

use api::ApiClient;
use cli::Cli;
use cmd::*;
use session::{CredentialStore, FileCredentialStore};

const DEFAULT_API_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Completions need neither config nor network.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return Ok(());
    }

    let config_dir = cli.dir.clone().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".taskmaster")
    });
    let store = FileCredentialStore::new(config_dir.join("credentials.json"));

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| std::env::var("TASKMASTER_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let token = store.load().and_then(|c| c.token);
    let mut api = ApiClient::new(&api_url, token);
    log::debug!(
        "using API at {api_url} ({} token)",
        if api.token().is_some() { "stored" } else { "no" }
    );

    match cli.command {
        Commands::Login { email, password } => cmd_login(&mut api, &store, email, password).await,
        Commands::Logout { forget } => cmd_logout(&store, forget),
        Commands::Register { username, email, password } => {
            cmd_register(&api, &store, username, email, password).await
        }
        Commands::Me { name, image_url, salary } => {
            cmd_me(&api, &store, name, image_url, salary).await
        }
        Commands::Project { action } => cmd_project(&api, action).await,
        Commands::Task { action } => cmd_task(&api, action).await,
        Commands::Stats { project_id } => cmd_stats(&api, project_id).await,
        Commands::UserStats { user_id, project } => {
            cmd_user_stats(&api, user_id, project).await
        }
        Commands::Calendar { month, project, date } => {
            cmd_calendar(&api, month, project, date).await
        }
        Commands::Notifications => cmd_notifications(&api).await,
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
