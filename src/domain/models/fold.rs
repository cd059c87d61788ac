//! Session-end fold: everything a finished session writes, as one unit.
//!
//! A [`SessionFold`] carries only the session's evidence. The repository
//! reads the current Beta state and the next step inside the same write
//! transaction that stores the result, so concurrent session ends for one
//! user serialize instead of overwriting each other.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::score::{ThemeScore, ThemeScoreSnapshot};
use super::session::Tally;

/// Session evidence for one played theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeEvidence {
    pub theme: String,
    /// Session counts to apply to the Beta state and add to the lifetime
    /// accuracy counters.
    pub tally: Tally,
    /// Badge label earned in this session, if any.
    pub badge: Option<String>,
}

/// All writes produced by ending one session, before they are applied.
///
/// Adapters must persist a fold atomically: either every theme's score,
/// snapshot, accuracy and badge lands, or none of them do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFold {
    pub user_id: i64,
    pub discount: f64,
    pub best_streak: u32,
    pub played_at: DateTime<Utc>,
    /// Themes whose Beta(1, 1) prior must exist once the fold commits.
    pub priors: Vec<String>,
    pub themes: Vec<ThemeEvidence>,
}

impl SessionFold {
    pub fn with_priors<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priors = themes.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn badges(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().filter_map(|t| t.badge.as_deref())
    }
}

/// State written for one theme by a committed fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeFold {
    /// Beta state after discounting and adding the session evidence.
    pub score: ThemeScore,
    pub snapshot: ThemeScoreSnapshot,
    pub tally: Tally,
    pub badge: Option<String>,
}

/// What a committed fold wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldOutcome {
    pub user_id: i64,
    /// Step shared by every snapshot of this fold.
    pub step: i64,
    pub themes: Vec<ThemeFold>,
}

impl FoldOutcome {
    pub fn badges(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().filter_map(|t| t.badge.as_deref())
    }
}
