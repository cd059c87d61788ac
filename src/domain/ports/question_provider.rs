//! Question provider port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Difficulty, FetchedQuestion, QuestionHints};

/// External source of trivia questions.
///
/// Implementations may fail, return incomplete questions or repeat questions;
/// callers validate results and apply their own retry policy.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Short name recorded as the question source.
    fn name(&self) -> &str;

    /// Fetch one question for the theme hints, preferring `difficulty`.
    async fn fetch(
        &self,
        hints: &QuestionHints,
        difficulty: Difficulty,
    ) -> DomainResult<FetchedQuestion>;
}
