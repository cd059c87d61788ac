//! Long-lived progress: accuracy counters and achievement badges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::score::round_to;
use super::session::Tally;

/// Minimum answers in a session before a theme can earn a badge.
pub const EXPERT_MIN_QUESTIONS: u32 = 2;
/// Minimum session accuracy for the expert badge.
pub const EXPERT_MIN_ACCURACY: f64 = 0.85;

/// Badge label for mastering a theme within one session.
pub fn expert_label(theme: &str) -> String {
    format!("Expert in {theme}!")
}

/// Whether a theme's session results earn the expert badge.
pub fn earns_expert_badge(tally: &Tally) -> bool {
    tally.total >= EXPERT_MIN_QUESTIONS && tally.accuracy() >= EXPERT_MIN_ACCURACY
}

/// Lifetime accuracy counters for one (user, theme) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeAccuracy {
    pub user_id: i64,
    pub theme: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub best_streak: u32,
    pub last_played: DateTime<Utc>,
}

impl ThemeAccuracy {
    /// Percentage of correct answers rounded to one decimal.
    pub fn percent(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            round_to(
                100.0 * f64::from(self.correct_answers) / f64::from(self.total_questions),
                1,
            )
        }
    }
}

/// A badge a user has unlocked, possibly several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub user_id: i64,
    pub label: String,
    pub count: u32,
    pub unlocked_at: DateTime<Utc>,
}

/// Aggregated profile of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Profile {
    pub user_id: i64,
    pub total_questions: u32,
    pub best_streak: u32,
    pub themes: Vec<ThemeAccuracy>,
    pub achievements: Vec<Achievement>,
}

impl Profile {
    pub fn new(user_id: i64, themes: Vec<ThemeAccuracy>, achievements: Vec<Achievement>) -> Self {
        let total_questions = themes.iter().map(|t| t.total_questions).sum();
        let best_streak = themes.iter().map(|t| t.best_streak).max().unwrap_or(0);
        Self {
            user_id,
            total_questions,
            best_streak,
            themes,
            achievements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_rule() {
        assert!(earns_expert_badge(&Tally { total: 2, correct: 2 }));
        assert!(!earns_expert_badge(&Tally { total: 1, correct: 1 }));
        assert!(!earns_expert_badge(&Tally { total: 10, correct: 8 }));
        assert!(earns_expert_badge(&Tally { total: 20, correct: 17 }));
    }

    #[test]
    fn test_expert_label() {
        assert_eq!(expert_label("Movies & TV"), "Expert in Movies & TV!");
    }

    #[test]
    fn test_percent_rounding() {
        let acc = ThemeAccuracy {
            user_id: 1,
            theme: "Science".to_string(),
            total_questions: 3,
            correct_answers: 2,
            best_streak: 2,
            last_played: Utc::now(),
        };
        assert!((acc.percent() - 66.7).abs() < 1e-9);
    }

    #[test]
    fn test_profile_totals() {
        let now = Utc::now();
        let themes = vec![
            ThemeAccuracy {
                user_id: 1,
                theme: "Science".to_string(),
                total_questions: 5,
                correct_answers: 4,
                best_streak: 3,
                last_played: now,
            },
            ThemeAccuracy {
                user_id: 1,
                theme: "Music".to_string(),
                total_questions: 2,
                correct_answers: 0,
                best_streak: 1,
                last_played: now,
            },
        ];
        let profile = Profile::new(1, themes, vec![]);
        assert_eq!(profile.total_questions, 7);
        assert_eq!(profile.best_streak, 3);
    }
}
