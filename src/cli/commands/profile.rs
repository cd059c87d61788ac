//! `trickia profile`: lifetime accuracy, streaks and achievements.

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::display::list_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Profile;

#[derive(Debug, Serialize)]
pub struct ThemeAccuracyOutput {
    pub theme: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct AchievementOutput {
    pub label: String,
    pub count: u32,
    pub unlocked_at: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileOutput {
    pub user_id: i64,
    pub total_questions: u32,
    pub best_streak: u32,
    pub questions_seen: u64,
    pub themes: Vec<ThemeAccuracyOutput>,
    pub achievements: Vec<AchievementOutput>,
}

impl ProfileOutput {
    pub fn new(profile: Profile, questions_seen: u64) -> Self {
        Self {
            user_id: profile.user_id,
            total_questions: profile.total_questions,
            best_streak: profile.best_streak,
            questions_seen,
            themes: profile
                .themes
                .iter()
                .map(|t| ThemeAccuracyOutput {
                    theme: t.theme.clone(),
                    total_questions: t.total_questions,
                    correct_answers: t.correct_answers,
                    percent: t.percent(),
                })
                .collect(),
            achievements: profile
                .achievements
                .into_iter()
                .map(|a| AchievementOutput {
                    label: a.label,
                    count: a.count,
                    unlocked_at: a.unlocked_at.to_rfc3339(),
                })
                .collect(),
        }
    }
}

impl CommandOutput for ProfileOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Player {}", style(self.user_id).bold()),
            format!("Questions answered: {}", self.total_questions),
            format!("Distinct questions seen: {}", self.questions_seen),
            format!("Best streak: {}", self.best_streak),
        ];

        if self.themes.is_empty() {
            lines.push("\nNo answers recorded yet.".to_string());
        } else {
            let mut table = list_table(&["theme", "answered", "correct", "accuracy"]);
            for t in &self.themes {
                table.add_row(vec![
                    t.theme.clone(),
                    t.total_questions.to_string(),
                    t.correct_answers.to_string(),
                    format!("{:.1}%", t.percent),
                ]);
            }
            lines.push(String::new());
            lines.push(table.to_string());
        }

        if !self.achievements.is_empty() {
            lines.push("\nAchievements:".to_string());
            for a in &self.achievements {
                let times = if a.count > 1 { format!(" x{}", a.count) } else { String::new() };
                lines.push(format!("  {} {}{times}", style("\u{2605}").yellow(), a.label));
            }
        }

        lines.join("\n")
    }
}

pub async fn execute(user_id: i64, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let service = ctx.reporting_service()?;

    let profile = service.profile(user_id).await?;
    let seen = service.questions_seen(user_id).await?;
    output(&ProfileOutput::new(profile, seen), json_mode);
    Ok(())
}
