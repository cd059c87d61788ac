//! Theme score repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{FoldOutcome, SessionFold, ThemeScore, ThemeScoreSnapshot};

/// Repository interface for Beta score persistence.
///
/// Scores are keyed by (user, theme) and are never deleted. Snapshots are
/// append-only and only written as part of a [`SessionFold`].
#[async_trait]
pub trait ThemeScoreRepository: Send + Sync {
    /// Return the stored state, creating the Beta(1, 1) prior if absent.
    ///
    /// Must be idempotent under concurrent calls for the same key.
    async fn ensure(&self, user_id: i64, theme: &str) -> DomainResult<ThemeScore>;

    /// Get the state for one theme without creating it.
    async fn get(&self, user_id: i64, theme: &str) -> DomainResult<Option<ThemeScore>>;

    /// All stored states for a user.
    async fn list_for_user(&self, user_id: i64) -> DomainResult<Vec<ThemeScore>>;

    /// Highest snapshot step recorded for a user, 0 when none.
    async fn latest_step(&self, user_id: i64) -> DomainResult<i64>;

    /// Snapshots of the given themes ordered by step.
    async fn snapshots_for_themes(
        &self,
        user_id: i64,
        themes: &[String],
    ) -> DomainResult<Vec<ThemeScoreSnapshot>>;

    /// Apply a finished session in one write transaction.
    ///
    /// Creates `fold.priors`, assigns the step as the user's latest step + 1,
    /// reads each played theme's current state, applies the discounted update
    /// and stores scores, snapshots, accuracy and badges. Reads and writes
    /// share the transaction; on error nothing is persisted.
    async fn commit_fold(&self, fold: &SessionFold) -> DomainResult<FoldOutcome>;
}
