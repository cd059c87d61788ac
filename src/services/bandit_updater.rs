//! Session-end update of per-theme Beta scores.
//!
//! A finished session is folded into persistent state as one unit: every
//! played theme gets a discounted Beta update, a snapshot at the shared step,
//! additive accuracy counters and, when earned, an expert badge. The session
//! evidence is planned here; the repository reads the current state, applies
//! it and writes the result inside one transaction.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::errors::DomainResult;
use crate::domain::models::score::validate_discount;
use crate::domain::models::{
    earns_expert_badge, expert_label, FoldOutcome, SessionFold, SessionStats, ThemeEvidence,
};
use crate::domain::ports::ThemeScoreRepository;

pub struct BanditUpdater<R: ThemeScoreRepository + ?Sized> {
    scores: Arc<R>,
}

impl<R: ThemeScoreRepository + ?Sized> BanditUpdater<R> {
    pub fn new(scores: Arc<R>) -> Self {
        Self { scores }
    }

    /// Collect the evidence of a finished session without touching storage.
    ///
    /// Themes with no answers are left out and keep their stored state.
    pub fn plan(user_id: i64, stats: &SessionStats, discount: f64) -> DomainResult<SessionFold> {
        validate_discount(discount)?;

        let themes = stats
            .played_themes()
            .map(|(theme, tally)| ThemeEvidence {
                theme: theme.clone(),
                tally: *tally,
                badge: earns_expert_badge(tally).then(|| expert_label(theme)),
            })
            .collect();

        Ok(SessionFold {
            user_id,
            discount,
            best_streak: stats.best_streak,
            played_at: Utc::now(),
            priors: Vec::new(),
            themes,
        })
    }

    /// Commit a planned fold. Returns `None` when no theme was played.
    pub async fn commit(&self, fold: &SessionFold) -> DomainResult<Option<FoldOutcome>> {
        if fold.is_empty() {
            debug!(user_id = fold.user_id, "Nothing to fold");
            return Ok(None);
        }

        let outcome = self.scores.commit_fold(fold).await?;
        info!(
            user_id = fold.user_id,
            step = outcome.step,
            themes = outcome.themes.len(),
            badges = outcome.badges().count(),
            "Session folded into theme scores"
        );
        Ok(Some(outcome))
    }

    /// Plan and commit a finished session atomically.
    pub async fn apply(
        &self,
        user_id: i64,
        stats: &SessionStats,
        discount: f64,
    ) -> DomainResult<Option<FoldOutcome>> {
        let fold = Self::plan(user_id, stats, discount)?;
        self.commit(&fold).await
    }
}
