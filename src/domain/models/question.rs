//! Question domain types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::theme::ThemeDefinition;

/// Requested or reported question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side hints derived from a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionHints {
    pub theme: String,
    pub opentdb_categories: Vec<u32>,
    pub triviaapi_tags: Vec<String>,
}

impl From<&ThemeDefinition> for QuestionHints {
    fn from(def: &ThemeDefinition) -> Self {
        Self {
            theme: def.name.to_string(),
            opentdb_categories: def.opentdb_categories.to_vec(),
            triviaapi_tags: def.triviaapi_tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Raw question returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedQuestion {
    pub text: String,
    pub correct_answer: String,
    pub answers: Vec<String>,
    /// Difficulty as reported by the provider, which may differ from the hint.
    pub difficulty: String,
    pub source: String,
}

impl FetchedQuestion {
    /// A question is usable when it has text, a correct answer, and that
    /// answer appears among the choices.
    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
            && !self.correct_answer.trim().is_empty()
            && self.answers.iter().any(|a| a == &self.correct_answer)
    }
}

/// Question currently awaiting an answer in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingQuestion {
    /// 1-based position within the session.
    pub number: u32,
    pub text: String,
    pub answers: Vec<String>,
    #[serde(skip_serializing)]
    pub correct_answer: String,
    pub difficulty: String,
    pub theme: String,
    pub source: String,
    #[serde(skip_serializing)]
    pub hash: String,
}

/// Fingerprint of a question used for deduplication.
///
/// Case and whitespace differences do not change the hash.
pub fn question_hash(text: &str) -> String {
    let normalized = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ignores_case_and_spacing() {
        let a = question_hash("What is  the capital of France?");
        let b = question_hash("  what is the CAPITAL of\tfrance? ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_differs_for_different_text() {
        assert_ne!(question_hash("2 + 2?"), question_hash("2 + 3?"));
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("unknown"), None);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn test_usable_question() {
        let mut q = FetchedQuestion {
            text: "Largest planet?".to_string(),
            correct_answer: "Jupiter".to_string(),
            answers: vec!["Mars".to_string(), "Jupiter".to_string()],
            difficulty: "easy".to_string(),
            source: "bank".to_string(),
        };
        assert!(q.is_usable());

        q.answers = vec!["Mars".to_string()];
        assert!(!q.is_usable());

        q.answers = vec!["Jupiter".to_string()];
        q.text = "   ".to_string();
        assert!(!q.is_usable());
    }
}
