//! `trickia play`: run an interactive quiz session.

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::cli::context::AppContext;
use crate::cli::display::{action_failure, action_success};
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::DomainError;
use crate::domain::models::{PendingQuestion, Tally};
use crate::services::{QuizService, QuizSession, SessionEndOutcome};

const QUIT: &str = "Quit session";

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Themes to play (comma-separated); all themes when omitted
    #[arg(long, short, value_delimiter = ',')]
    pub themes: Vec<String>,

    /// Number of questions in the session
    #[arg(long, short = 'n', default_value_t = 10)]
    pub questions: u32,

    /// Question bank file, overriding the configured one
    #[arg(long)]
    pub bank: Option<PathBuf>,

    /// Seed for reproducible theme selection
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PlayOutput {
    pub session_id: String,
    pub answered: u32,
    pub score: u32,
    pub best_streak: u32,
    pub score_updated: bool,
    pub step: Option<i64>,
    pub badges: Vec<String>,
    pub themes: BTreeMap<String, Tally>,
    pub sources: BTreeMap<String, Tally>,
}

impl PlayOutput {
    fn new(session: &QuizSession, outcome: SessionEndOutcome) -> Self {
        Self {
            session_id: session.id().to_string(),
            answered: outcome.stats.total_answered(),
            score: outcome.stats.score,
            best_streak: outcome.stats.best_streak,
            score_updated: outcome.score_updated,
            step: outcome.step,
            badges: outcome.badges,
            themes: outcome.stats.themes,
            sources: outcome.stats.sources,
        }
    }
}

impl CommandOutput for PlayOutput {
    fn to_human(&self) -> String {
        if self.answered == 0 {
            return "Session ended without answers; scores unchanged.".to_string();
        }

        let mut lines = vec![
            format!(
                "\nFinal score: {}/{} (best streak {})",
                style(self.score).bold(),
                self.answered,
                self.best_streak
            ),
            String::new(),
        ];
        for (theme, tally) in &self.themes {
            lines.push(format!("  {theme:<20} {}/{}", tally.correct, tally.total));
        }
        for badge in &self.badges {
            lines.push(format!("\n{} {badge}", style("\u{2605}").yellow().bold()));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: PlayArgs, user_id: i64, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let bank = ctx.question_bank(args.bank.as_deref())?;
    let mut service = ctx.quiz_service(Arc::new(bank));
    if let Some(seed) = args.seed {
        service = service.with_seed(seed);
    }

    let mut session = service.start_session(user_id, args.themes.as_slice())?;
    if !json_mode {
        println!(
            "Playing {} question(s) from: {}\n",
            args.questions,
            session.allowed_themes().join(", ")
        );
    }

    let outcome = run_session(&service, &mut session, args.questions, json_mode, ask).await?;
    output(&PlayOutput::new(&session, outcome), json_mode);
    Ok(())
}

/// Play up to `questions` rounds, then end the session.
///
/// The session is ended even when a round fails, so answers already given
/// are folded into the scores before the error is returned.
async fn run_session<F>(
    service: &QuizService,
    session: &mut QuizSession,
    questions: u32,
    json_mode: bool,
    mut answer: F,
) -> Result<SessionEndOutcome>
where
    F: FnMut(&PendingQuestion) -> Result<Option<String>>,
{
    let played = play_rounds(service, session, questions, json_mode, &mut answer).await;
    let ended = service.end_session(session).await;

    match (played, ended) {
        (Ok(()), ended) => Ok(ended?),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(end_err)) => {
            warn!(session_id = %session.id(), error = %end_err, "Session could not be ended after a failed round");
            Err(e)
        }
    }
}

async fn play_rounds<F>(
    service: &QuizService,
    session: &mut QuizSession,
    questions: u32,
    json_mode: bool,
    answer: &mut F,
) -> Result<()>
where
    F: FnMut(&PendingQuestion) -> Result<Option<String>>,
{
    for _ in 0..questions {
        let question = match service.next_question(session).await {
            Ok(q) => q,
            Err(DomainError::NoQuestionAvailable { attempts }) => {
                if !json_mode {
                    println!("No fresh question found after {attempts} attempts; ending early.");
                }
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let Some(given) = answer(&question)? else {
            break;
        };
        let outcome = service.submit_answer(session, &given)?;

        if !json_mode {
            if outcome.is_correct {
                println!("{}\n", action_success(&format!("Correct! Streak: {}", outcome.current_streak)));
            } else {
                println!("{}\n", action_failure(&format!("Wrong, the answer was {}", outcome.correct_answer)));
            }
        }
    }
    Ok(())
}

/// Prompt for an answer; `None` when the player quits.
fn ask(question: &PendingQuestion) -> Result<Option<String>> {
    let prompt = format!(
        "Q{} [{} / {}] {}",
        question.number, question.theme, question.difficulty, question.text
    );
    let mut items: Vec<&str> = question.answers.iter().map(String::as_str).collect();
    items.push(QUIT);

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(match choice {
        Some(i) if i < question.answers.len() => Some(question.answers[i].clone()),
        _ => None,
    })
}
