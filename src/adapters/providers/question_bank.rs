//! File-backed question provider.
//!
//! A question bank is a JSON document listing questions per theme:
//!
//! ```json
//! {
//!   "questions": [
//!     {
//!       "theme": "Science",
//!       "question": "What is the chemical symbol for gold?",
//!       "correct_answer": "Au",
//!       "incorrect_answers": ["Ag", "Gd", "Go"],
//!       "difficulty": "easy"
//!     }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Difficulty, FetchedQuestion, QuestionHints, ThemeCatalog};
use crate::domain::ports::QuestionProvider;

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("Failed to read question bank {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("Invalid question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Question bank entry {index} uses unknown theme '{theme}'")]
    UnknownTheme { index: usize, theme: String },
}

/// One entry of the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankQuestion {
    pub theme: String,
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    Difficulty::Medium.as_str().to_string()
}

#[derive(Debug, Deserialize)]
struct BankFile {
    questions: Vec<BankQuestion>,
}

/// Question provider serving questions from an in-memory bank.
pub struct QuestionBank {
    questions: Vec<BankQuestion>,
    rng: Mutex<StdRng>,
}

impl QuestionBank {
    pub fn new(questions: Vec<BankQuestion>) -> Result<Self, QuestionBankError> {
        Self::with_rng(questions, StdRng::from_entropy())
    }

    /// Deterministic bank for reproducible runs.
    pub fn seeded(questions: Vec<BankQuestion>, seed: u64) -> Result<Self, QuestionBankError> {
        Self::with_rng(questions, StdRng::seed_from_u64(seed))
    }

    fn with_rng(questions: Vec<BankQuestion>, rng: StdRng) -> Result<Self, QuestionBankError> {
        if let Some((index, q)) = questions
            .iter()
            .enumerate()
            .find(|(_, q)| !ThemeCatalog::is_valid(&q.theme))
        {
            return Err(QuestionBankError::UnknownTheme {
                index,
                theme: q.theme.clone(),
            });
        }

        Ok(Self {
            questions,
            rng: Mutex::new(rng),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, QuestionBankError> {
        let file: BankFile = serde_json::from_str(json)?;
        Self::new(file.questions)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuestionBankError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| QuestionBankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bank = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), questions = bank.len(), "Question bank loaded");
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions available for a theme.
    pub fn count_for_theme(&self, theme: &str) -> usize {
        self.questions.iter().filter(|q| q.theme == theme).count()
    }
}

#[async_trait]
impl QuestionProvider for QuestionBank {
    fn name(&self) -> &str {
        "question_bank"
    }

    async fn fetch(&self, hints: &QuestionHints, difficulty: Difficulty) -> DomainResult<FetchedQuestion> {
        let for_theme: Vec<&BankQuestion> = self.questions.iter().filter(|q| q.theme == hints.theme).collect();
        let at_difficulty: Vec<&BankQuestion> = for_theme
            .iter()
            .copied()
            .filter(|q| Difficulty::from_str(&q.difficulty) == Some(difficulty))
            .collect();

        // Prefer the requested difficulty, otherwise serve any question of the theme.
        let candidates = if at_difficulty.is_empty() { for_theme } else { at_difficulty };

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let picked = candidates
            .choose(&mut *rng)
            .ok_or_else(|| DomainError::ProviderError(format!("no questions for theme '{}'", hints.theme)))?;

        let mut answers = picked.incorrect_answers.clone();
        answers.push(picked.correct_answer.clone());
        answers.shuffle(&mut *rng);

        Ok(FetchedQuestion {
            text: picked.question.clone(),
            correct_answer: picked.correct_answer.clone(),
            answers,
            difficulty: picked.difficulty.clone(),
            source: self.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(theme: &str, question: &str, difficulty: &str) -> BankQuestion {
        BankQuestion {
            theme: theme.to_string(),
            question: question.to_string(),
            correct_answer: "yes".to_string(),
            incorrect_answers: vec!["no".to_string(), "maybe".to_string()],
            difficulty: difficulty.to_string(),
        }
    }

    fn hints(theme: &str) -> QuestionHints {
        QuestionHints::from(ThemeCatalog::get(theme).unwrap())
    }

    #[tokio::test]
    async fn test_prefers_requested_difficulty() {
        let bank = QuestionBank::seeded(
            vec![entry("Science", "easy one", "easy"), entry("Science", "hard one", "hard")],
            7,
        )
        .unwrap();

        for _ in 0..10 {
            let q = bank.fetch(&hints("Science"), Difficulty::Hard).await.unwrap();
            assert_eq!(q.text, "hard one");
            assert!(q.is_usable());
            assert_eq!(q.answers.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_any_difficulty() {
        let bank = QuestionBank::seeded(vec![entry("Music", "only one", "easy")], 1).unwrap();
        let q = bank.fetch(&hints("Music"), Difficulty::Hard).await.unwrap();
        assert_eq!(q.text, "only one");
        assert_eq!(q.source, "question_bank");
    }

    #[tokio::test]
    async fn test_unknown_theme_has_no_questions() {
        let bank = QuestionBank::seeded(vec![entry("Music", "q", "easy")], 1).unwrap();
        let result = bank.fetch(&hints("Sports"), Difficulty::Easy).await;
        assert!(matches!(result, Err(DomainError::ProviderError(_))));
    }

    #[test]
    fn test_rejects_theme_outside_catalog() {
        let result = QuestionBank::new(vec![entry("Cooking", "q", "easy")]);
        assert!(matches!(result, Err(QuestionBankError::UnknownTheme { index: 0, .. })));
    }

    #[test]
    fn test_parse_json_defaults_difficulty() {
        let bank = QuestionBank::from_json(
            r#"{"questions": [{"theme": "History", "question": "Q?", "correct_answer": "A"}]}"#,
        )
        .unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.count_for_theme("History"), 1);
        assert_eq!(bank.questions[0].difficulty, "medium");
    }

    #[test]
    fn test_load_missing_file() {
        let result = QuestionBank::load("/nonexistent/questions.json");
        assert!(matches!(result, Err(QuestionBankError::Io { .. })));
    }
}
