//! Implementation of the `trickia init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, verify_connection};
use crate::cli::display::action_success;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

const SAMPLE_QUESTION_BANK: &str = include_str!("../../../demos/questions.json");

const CONFIG_HEADER: &str = "\
# Trickia configuration
# Override settings by editing this file, adding .trickia/local.yaml, or
# setting environment variables with the TRICKIA_ prefix, e.g.
#   export TRICKIA_LOGGING__LEVEL=debug
#   export TRICKIA_FETCH__MAX_ATTEMPTS=10
";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite existing config and question bank
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub files_written: Vec<String>,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![if self.success {
            action_success(&self.message)
        } else {
            self.message.clone()
        }];
        if !self.files_written.is_empty() {
            lines.push("\nWrote:".to_string());
            for file in &self.files_written {
                lines.push(format!("  - {file}"));
            }
        }
        if self.database_initialized {
            lines.push(format!("\nDatabase initialized at {CONFIG_DIR}/trickia.db"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };
    let config_dir = target_path.join(CONFIG_DIR);
    let config_file = config_dir.join("config.yaml");

    if config_file.exists() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to rewrite config and question bank."
                .to_string(),
            initialized_path: target_path,
            files_written: vec![],
            database_initialized: false,
        };
        output(&out, json_mode);
        return Ok(());
    }

    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config = Config::default();
    let mut files_written = Vec::new();

    let yaml = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    fs::write(&config_file, format!("{CONFIG_HEADER}\n{yaml}"))
        .await
        .context("Failed to write config file")?;
    files_written.push(format!("{CONFIG_DIR}/config.yaml"));

    let bank_file = target_path.join(&config.question_bank.path);
    if args.force || !bank_file.exists() {
        fs::write(&bank_file, SAMPLE_QUESTION_BANK)
            .await
            .context("Failed to write question bank")?;
        files_written.push(config.question_bank.path.clone());
    }

    let db_path = target_path.join(&config.database.path);
    let pool = initialize_database(&format!("sqlite:{}", db_path.display()), None)
        .await
        .context("Failed to initialize database")?;
    verify_connection(&pool).await?;
    pool.close().await;

    let out = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized.".to_string()
        } else {
            "Project initialized.".to_string()
        },
        initialized_path: target_path,
        files_written,
        database_initialized: true,
    };
    output(&out, json_mode);
    Ok(())
}
