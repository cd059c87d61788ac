//! Trickia CLI entry point.

use clap::Parser;

use trickia::cli::commands::{init, model, play, profile, themes};
use trickia::cli::{handle_error, Cli, Commands};
use trickia::infrastructure::config::ConfigLoader;
use trickia::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Fall back to defaults so `init` works before a config exists.
    let log_config = ConfigLoader::load()
        .map(|config| LogConfig::from(&config.logging))
        .unwrap_or_default();
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => init::execute(args, cli.json).await,
        Commands::Themes => themes::execute(cli.json),
        Commands::Play(args) => play::execute(args, cli.user, cli.json).await,
        Commands::Model(args) => model::execute(args, cli.user, cli.json).await,
        Commands::Profile => profile::execute(cli.user, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
