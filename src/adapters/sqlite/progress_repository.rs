//! SQLite implementation of the ProgressRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{parse_count, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Achievement, ThemeAccuracy};
use crate::domain::ports::ProgressRepository;

#[derive(Clone)]
pub struct SqliteProgressRepository {
    pool: SqlitePool,
}

impl SqliteProgressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for SqliteProgressRepository {
    async fn list_accuracy(&self, user_id: i64) -> DomainResult<Vec<ThemeAccuracy>> {
        let rows: Vec<AccuracyRow> = sqlx::query_as(
            "SELECT user_id, theme, total_questions, correct_answers, best_streak, last_played
             FROM theme_accuracy WHERE user_id = ? ORDER BY theme"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_achievements(&self, user_id: i64) -> DomainResult<Vec<Achievement>> {
        let rows: Vec<AchievementRow> = sqlx::query_as(
            "SELECT user_id, label, count, unlocked_at FROM achievements WHERE user_id = ? ORDER BY unlocked_at, label"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_achievement(&self, user_id: i64, label: &str) -> DomainResult<Option<Achievement>> {
        let row: Option<AchievementRow> = sqlx::query_as(
            "SELECT user_id, label, count, unlocked_at FROM achievements WHERE user_id = ? AND label = ?"
        )
        .bind(user_id)
        .bind(label)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct AccuracyRow {
    user_id: i64,
    theme: String,
    total_questions: i64,
    correct_answers: i64,
    best_streak: i64,
    last_played: String,
}

impl TryFrom<AccuracyRow> for ThemeAccuracy {
    type Error = DomainError;

    fn try_from(row: AccuracyRow) -> Result<Self, Self::Error> {
        Ok(ThemeAccuracy {
            user_id: row.user_id,
            theme: row.theme,
            total_questions: parse_count(row.total_questions, "total_questions")?,
            correct_answers: parse_count(row.correct_answers, "correct_answers")?,
            best_streak: parse_count(row.best_streak, "best_streak")?,
            last_played: parse_datetime(&row.last_played)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AchievementRow {
    user_id: i64,
    label: String,
    count: i64,
    unlocked_at: String,
}

impl TryFrom<AchievementRow> for Achievement {
    type Error = DomainError;

    fn try_from(row: AchievementRow) -> Result<Self, Self::Error> {
        Ok(Achievement {
            user_id: row.user_id,
            label: row.label,
            count: parse_count(row.count, "count")?,
            unlocked_at: parse_datetime(&row.unlocked_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup() -> (SqlitePool, SqliteProgressRepository) {
        let pool = create_migrated_test_pool().await.unwrap();
        (pool.clone(), SqliteProgressRepository::new(pool))
    }

    #[tokio::test]
    async fn test_empty_progress() {
        let (_pool, repo) = setup().await;
        assert!(repo.list_accuracy(1).await.unwrap().is_empty());
        assert!(repo.list_achievements(1).await.unwrap().is_empty());
        assert!(repo.get_achievement(1, "Expert in Music!").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_rows() {
        let (pool, repo) = setup().await;
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO theme_accuracy VALUES (1, 'Music', 4, 3, 2, ?)")
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO achievements VALUES (1, 'Expert in Music!', 2, ?)")
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();

        let accuracy = repo.list_accuracy(1).await.unwrap();
        assert_eq!(accuracy.len(), 1);
        assert_eq!(accuracy[0].correct_answers, 3);
        assert!((accuracy[0].percent() - 75.0).abs() < 1e-9);

        let badge = repo.get_achievement(1, "Expert in Music!").await.unwrap().unwrap();
        assert_eq!(badge.count, 2);
        assert!(repo.list_achievements(2).await.unwrap().is_empty());
    }
}
