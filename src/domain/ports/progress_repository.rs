//! Progress repository port (accuracy counters and badges).

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Achievement, ThemeAccuracy};

/// Read access to long-lived progress data.
///
/// Writes happen only through `ThemeScoreRepository::commit_fold` so they
/// share the session-end transaction.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn list_accuracy(&self, user_id: i64) -> DomainResult<Vec<ThemeAccuracy>>;

    async fn list_achievements(&self, user_id: i64) -> DomainResult<Vec<Achievement>>;

    async fn get_achievement(&self, user_id: i64, label: &str) -> DomainResult<Option<Achievement>>;
}
