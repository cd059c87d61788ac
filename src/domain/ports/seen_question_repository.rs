//! Seen-question repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Persistent memory of questions already shown to a user.
#[async_trait]
pub trait SeenQuestionRepository: Send + Sync {
    async fn has_seen(&self, user_id: i64, question_hash: &str) -> DomainResult<bool>;

    /// Record a presented question. Seeing it again refreshes `last_seen`.
    async fn mark_seen(
        &self,
        user_id: i64,
        question_hash: &str,
        source: &str,
        theme: &str,
    ) -> DomainResult<()>;

    async fn count_for_user(&self, user_id: i64) -> DomainResult<u64>;
}
