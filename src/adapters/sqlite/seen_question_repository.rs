//! SQLite implementation of the SeenQuestionRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::ports::SeenQuestionRepository;

#[derive(Clone)]
pub struct SqliteSeenQuestionRepository {
    pool: SqlitePool,
}

impl SqliteSeenQuestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeenQuestionRepository for SqliteSeenQuestionRepository {
    async fn has_seen(&self, user_id: i64, question_hash: &str) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM seen_questions WHERE user_id = ? AND question_hash = ?"
        )
        .bind(user_id)
        .bind(question_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn mark_seen(
        &self,
        user_id: i64,
        question_hash: &str,
        source: &str,
        theme: &str,
    ) -> DomainResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO seen_questions (user_id, question_hash, source, theme, first_seen, last_seen)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, question_hash) DO UPDATE SET last_seen = excluded.last_seen"#
        )
        .bind(user_id)
        .bind(question_hash)
        .bind(source)
        .bind(theme)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_for_user(&self, user_id: i64) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM seen_questions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.unsigned_abs())
    }
}
