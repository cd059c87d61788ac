//! Command-line interface for the trickia quiz engine.

pub mod commands;
pub mod context;
pub mod display;
pub mod output;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::domain::errors::DomainError;

#[derive(Parser, Debug)]
#[command(name = "trickia", version, about = "Adaptive trivia quiz engine")]
pub struct Cli {
    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Player id
    #[arg(long, short, global = true, default_value_t = 1, env = "TRICKIA_USER")]
    pub user: i64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the .trickia directory, config, database and question bank
    Init(commands::init::InitArgs),
    /// List the theme catalog
    Themes,
    /// Play an interactive quiz session
    Play(commands::play::PlayArgs),
    /// Inspect the per-theme skill model
    Model(commands::model::ModelArgs),
    /// Show accuracy, streaks and achievements
    Profile,
}

/// Print an error in the requested mode and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let code = match err.downcast_ref::<DomainError>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    };

    if json_mode {
        let body = json!({
            "success": false,
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{}", display::action_failure(&format!("{err:#}")));
    }
    std::process::exit(code)
}
