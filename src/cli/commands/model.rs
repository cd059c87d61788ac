//! `trickia model`: inspect the per-theme Beta scores.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::display::{colorize_mean, list_table, render_list};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ScoreHistory, ScoreView};

#[derive(Args, Debug)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub command: ModelCommands,
}

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// Current mean, alpha and beta of every stored theme
    State,
    /// Score trend of the three weakest and three strongest themes
    History,
}

#[derive(Debug, Serialize)]
pub struct ModelStateOutput {
    pub user_id: i64,
    pub themes: Vec<ScoreView>,
}

impl CommandOutput for ModelStateOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["theme", "mean", "alpha", "beta", "updated"]);
        for view in &self.themes {
            table.add_row(vec![
                view.theme.clone(),
                colorize_mean(view.mean).to_string(),
                format!("{:.3}", view.alpha),
                format!("{:.3}", view.beta),
                view.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }
        render_list("theme", &table, self.themes.len())
    }
}

#[derive(Debug, Serialize)]
pub struct ModelHistoryOutput {
    pub user_id: i64,
    #[serde(flatten)]
    pub history: ScoreHistory,
}

impl CommandOutput for ModelHistoryOutput {
    fn to_human(&self) -> String {
        if self.history.series.is_empty() {
            return "No score history yet. Finish a session with 'trickia play' first.".to_string();
        }

        let mut lines = vec![
            format!("Strongest: {}", self.history.top.join(", ")),
            format!("Weakest:   {}", self.history.bottom.join(", ")),
            String::new(),
        ];

        let mut table = list_table(&["theme", "sessions", "first", "latest"]);
        for series in &self.history.series {
            let first = series.points.first().map(|p| p.mean);
            let latest = series.points.last().map(|p| p.mean);
            table.add_row(vec![
                series.theme.clone(),
                series.points.len().to_string(),
                first.map_or_else(|| "-".to_string(), |m| format!("{m:.4}")),
                latest.map_or_else(|| "-".to_string(), |m| colorize_mean(m).to_string()),
            ]);
        }
        lines.push(table.to_string());
        lines.join("\n")
    }
}

pub async fn execute(args: ModelArgs, user_id: i64, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let service = ctx.reporting_service()?;

    match args.command {
        ModelCommands::State => {
            let out = ModelStateOutput {
                user_id,
                themes: service.score_snapshot(user_id).await?,
            };
            output(&out, json_mode);
        }
        ModelCommands::History => {
            let out = ModelHistoryOutput {
                user_id,
                history: service.score_history(user_id).await?,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
