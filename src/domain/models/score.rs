//! Per-user, per-theme Beta scores.
//!
//! A `ThemeScore` is a Beta(alpha, beta) proficiency estimate. Fresh scores
//! start from the uniform prior Beta(1, 1). At session end the previous
//! evidence is discounted and the session's correct/wrong counts are added:
//!
//! ```text
//! alpha' = discount * alpha + correct
//! beta'  = discount * beta  + wrong
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Prior alpha for a theme with no history.
pub const PRIOR_ALPHA: f64 = 1.0;
/// Prior beta for a theme with no history.
pub const PRIOR_BETA: f64 = 1.0;
/// Recency discount applied at every session-end fold.
pub const DEFAULT_DISCOUNT: f64 = 0.85;
/// Score assumed for themes without a stored state.
pub const NEUTRAL_MEAN: f64 = 0.5;

/// Mean of a Beta(alpha, beta) distribution, 0.5 when degenerate.
pub fn beta_mean(alpha: f64, beta: f64) -> f64 {
    let denom = alpha + beta;
    if denom > 0.0 {
        alpha / denom
    } else {
        NEUTRAL_MEAN
    }
}

/// Check that a discount lies in (0, 1].
pub fn validate_discount(discount: f64) -> DomainResult<()> {
    if discount > 0.0 && discount <= 1.0 {
        Ok(())
    } else {
        Err(DomainError::ValidationFailed(format!(
            "discount must be in (0, 1], got {discount}"
        )))
    }
}

/// Beta state for one (user, theme) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeScore {
    pub user_id: i64,
    pub theme: String,
    pub alpha: f64,
    pub beta: f64,
    pub updated_at: DateTime<Utc>,
}

impl ThemeScore {
    /// Uniform prior for a theme never played before.
    pub fn prior(user_id: i64, theme: impl Into<String>) -> Self {
        Self {
            user_id,
            theme: theme.into(),
            alpha: PRIOR_ALPHA,
            beta: PRIOR_BETA,
            updated_at: Utc::now(),
        }
    }

    pub fn mean(&self) -> f64 {
        beta_mean(self.alpha, self.beta)
    }

    /// Fold one session's evidence into this state.
    ///
    /// With `correct == wrong == 0` this is pure decay.
    pub fn update(&mut self, correct: u32, wrong: u32, discount: f64) -> DomainResult<()> {
        validate_discount(discount)?;
        self.alpha = discount * self.alpha + f64::from(correct);
        self.beta = discount * self.beta + f64::from(wrong);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Non-mutating variant of [`ThemeScore::update`].
    pub fn updated(&self, correct: u32, wrong: u32, discount: f64) -> DomainResult<Self> {
        let mut next = self.clone();
        next.update(correct, wrong, discount)?;
        Ok(next)
    }
}

/// Immutable history row written once per theme per session-end step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeScoreSnapshot {
    pub user_id: i64,
    pub theme: String,
    pub step: i64,
    pub mean: f64,
    pub alpha: f64,
    pub beta: f64,
    pub created_at: DateTime<Utc>,
}

impl ThemeScoreSnapshot {
    pub fn capture(score: &ThemeScore, step: i64) -> Self {
        Self {
            user_id: score.user_id,
            theme: score.theme.clone(),
            step,
            mean: score.mean(),
            alpha: score.alpha,
            beta: score.beta,
            created_at: Utc::now(),
        }
    }
}

/// Current score of a theme as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub theme: String,
    pub mean: f64,
    pub alpha: f64,
    pub beta: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<&ThemeScore> for ScoreView {
    fn from(score: &ThemeScore) -> Self {
        Self {
            theme: score.theme.clone(),
            mean: round_to(score.mean(), 4),
            alpha: round_to(score.alpha, 3),
            beta: round_to(score.beta, 3),
            updated_at: score.updated_at,
        }
    }
}

/// One point of a theme's score trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub step: i64,
    pub mean: f64,
}

/// Snapshot series for a theme, ordered by step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeHistory {
    pub theme: String,
    pub points: Vec<HistoryPoint>,
}

/// Trend data for the strongest and weakest themes of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreHistory {
    /// Highest-scoring themes, best first.
    pub top: Vec<String>,
    /// Lowest-scoring themes, worst first.
    pub bottom: Vec<String>,
    pub series: Vec<ThemeHistory>,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_prior_mean_is_neutral() {
        let score = ThemeScore::prior(1, "Science");
        assert!(approx(score.mean(), 0.5));
    }

    #[test]
    fn test_degenerate_mean() {
        assert!(approx(beta_mean(0.0, 0.0), 0.5));
        assert!(approx(beta_mean(3.0, 1.0), 0.75));
        assert!(approx(beta_mean(0.0, 2.0), 0.0));
    }

    #[test]
    fn test_pure_decay() {
        let mut score = ThemeScore::prior(1, "History");
        score.alpha = 2.0;
        score.beta = 3.0;
        score.update(0, 0, 0.85).unwrap();
        assert!(approx(score.alpha, 1.7));
        assert!(approx(score.beta, 2.55));
    }

    #[test]
    fn test_update_from_prior() {
        let score = ThemeScore::prior(1, "Science");
        let next = score.updated(3, 0, DEFAULT_DISCOUNT).unwrap();
        assert!(approx(next.alpha, 3.85));
        assert!(approx(next.beta, 0.85));
        // Original untouched
        assert!(approx(score.alpha, 1.0));
    }

    #[test]
    fn test_no_discount_keeps_history() {
        let score = ThemeScore::prior(1, "Music");
        let next = score.updated(1, 2, 1.0).unwrap();
        assert!(approx(next.alpha, 2.0));
        assert!(approx(next.beta, 3.0));
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let mut score = ThemeScore::prior(1, "Music");
        assert!(matches!(score.update(1, 0, 0.0), Err(DomainError::ValidationFailed(_))));
        assert!(matches!(score.update(1, 0, 1.5), Err(DomainError::ValidationFailed(_))));
        assert!(approx(score.alpha, 1.0));
    }

    #[test]
    fn test_snapshot_captures_state() {
        let score = ThemeScore::prior(7, "Sports").updated(2, 1, 0.85).unwrap();
        let snap = ThemeScoreSnapshot::capture(&score, 4);
        assert_eq!(snap.step, 4);
        assert_eq!(snap.user_id, 7);
        assert!(approx(snap.mean, score.mean()));
    }

    #[test]
    fn test_score_view_rounding() {
        let mut score = ThemeScore::prior(1, "Science");
        score.alpha = 3.85;
        score.beta = 0.85;
        let view = ScoreView::from(&score);
        assert!(approx(view.mean, 0.8191));
        assert!(approx(view.alpha, 3.85));
    }
}
