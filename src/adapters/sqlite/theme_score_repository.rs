//! SQLite implementation of the ThemeScoreRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

use super::parse_datetime;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::score::{PRIOR_ALPHA, PRIOR_BETA};
use crate::domain::models::{
    FoldOutcome, SessionFold, ThemeFold, ThemeScore, ThemeScoreSnapshot,
};
use crate::domain::ports::ThemeScoreRepository;

#[derive(Clone)]
pub struct SqliteThemeScoreRepository {
    pool: SqlitePool,
}

impl SqliteThemeScoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_prior(conn: &mut SqliteConnection, user_id: i64, theme: &str) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO theme_scores (user_id, theme, alpha, beta, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(user_id, theme) DO NOTHING"#
        )
        .bind(user_id)
        .bind(theme)
        .bind(PRIOR_ALPHA)
        .bind(PRIOR_BETA)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn fetch_score(conn: &mut SqliteConnection, user_id: i64, theme: &str) -> DomainResult<Option<ThemeScore>> {
        let row: Option<ThemeScoreRow> = sqlx::query_as(
            "SELECT user_id, theme, alpha, beta, updated_at FROM theme_scores WHERE user_id = ? AND theme = ?"
        )
        .bind(user_id)
        .bind(theme)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn max_step(conn: &mut SqliteConnection, user_id: i64) -> DomainResult<i64> {
        let (step,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(step), 0) FROM theme_score_snapshots WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(step)
    }

    /// Body of [`ThemeScoreRepository::commit_fold`]; runs inside the write
    /// transaction opened by the caller.
    async fn apply_fold(conn: &mut SqliteConnection, fold: &SessionFold) -> DomainResult<FoldOutcome> {
        for theme in fold.priors.iter().chain(fold.themes.iter().map(|t| &t.theme)) {
            Self::insert_prior(conn, fold.user_id, theme).await?;
        }

        let step = Self::max_step(conn, fold.user_id).await? + 1;
        let mut themes = Vec::with_capacity(fold.themes.len());
        for evidence in &fold.themes {
            let current = Self::fetch_score(conn, fold.user_id, &evidence.theme)
                .await?
                .ok_or_else(|| {
                    DomainError::DatabaseError(format!(
                        "theme score for user {} / {} missing inside fold",
                        fold.user_id, evidence.theme
                    ))
                })?;
            let score = current.updated(evidence.tally.correct, evidence.tally.wrong(), fold.discount)?;
            let written = ThemeFold {
                snapshot: ThemeScoreSnapshot::capture(&score, step),
                score,
                tally: evidence.tally,
                badge: evidence.badge.clone(),
            };
            Self::write_theme(conn, fold, &written).await?;
            themes.push(written);
        }

        Ok(FoldOutcome {
            user_id: fold.user_id,
            step,
            themes,
        })
    }

    async fn write_theme(conn: &mut SqliteConnection, fold: &SessionFold, theme: &ThemeFold) -> DomainResult<()> {
        let played_at = fold.played_at.to_rfc3339();

        sqlx::query(
            r#"UPDATE theme_scores SET alpha = ?, beta = ?, updated_at = ?
               WHERE user_id = ? AND theme = ?"#
        )
        .bind(theme.score.alpha)
        .bind(theme.score.beta)
        .bind(theme.score.updated_at.to_rfc3339())
        .bind(fold.user_id)
        .bind(&theme.score.theme)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"INSERT INTO theme_score_snapshots (user_id, theme, step, mean, alpha, beta, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(fold.user_id)
        .bind(&theme.snapshot.theme)
        .bind(theme.snapshot.step)
        .bind(theme.snapshot.mean)
        .bind(theme.snapshot.alpha)
        .bind(theme.snapshot.beta)
        .bind(theme.snapshot.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"INSERT INTO theme_accuracy (user_id, theme, total_questions, correct_answers, best_streak, last_played)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, theme) DO UPDATE SET
                   total_questions = total_questions + excluded.total_questions,
                   correct_answers = correct_answers + excluded.correct_answers,
                   best_streak = MAX(best_streak, excluded.best_streak),
                   last_played = excluded.last_played"#
        )
        .bind(fold.user_id)
        .bind(&theme.score.theme)
        .bind(i64::from(theme.tally.total))
        .bind(i64::from(theme.tally.correct))
        .bind(i64::from(fold.best_streak))
        .bind(&played_at)
        .execute(&mut *conn)
        .await?;

        if let Some(label) = &theme.badge {
            sqlx::query(
                r#"INSERT INTO achievements (user_id, label, count, unlocked_at)
                   VALUES (?, ?, 1, ?)
                   ON CONFLICT(user_id, label) DO UPDATE SET count = count + 1"#
            )
            .bind(fold.user_id)
            .bind(label)
            .bind(&played_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl ThemeScoreRepository for SqliteThemeScoreRepository {
    async fn ensure(&self, user_id: i64, theme: &str) -> DomainResult<ThemeScore> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_prior(&mut conn, user_id, theme).await?;

        Self::fetch_score(&mut conn, user_id, theme).await?.ok_or_else(|| {
            DomainError::DatabaseError(format!("theme score for user {user_id} / {theme} vanished after insert"))
        })
    }

    async fn get(&self, user_id: i64, theme: &str) -> DomainResult<Option<ThemeScore>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_score(&mut conn, user_id, theme).await
    }

    async fn list_for_user(&self, user_id: i64) -> DomainResult<Vec<ThemeScore>> {
        let rows: Vec<ThemeScoreRow> = sqlx::query_as(
            "SELECT user_id, theme, alpha, beta, updated_at FROM theme_scores WHERE user_id = ? ORDER BY theme"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn latest_step(&self, user_id: i64) -> DomainResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::max_step(&mut conn, user_id).await
    }

    async fn snapshots_for_themes(
        &self,
        user_id: i64,
        themes: &[String],
    ) -> DomainResult<Vec<ThemeScoreSnapshot>> {
        if themes.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; themes.len()].join(", ");
        let query = format!(
            "SELECT user_id, theme, step, mean, alpha, beta, created_at FROM theme_score_snapshots
             WHERE user_id = ? AND theme IN ({placeholders}) ORDER BY step, id"
        );

        let mut q = sqlx::query_as::<_, SnapshotRow>(&query).bind(user_id);
        for theme in themes {
            q = q.bind(theme);
        }

        let rows: Vec<SnapshotRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn commit_fold(&self, fold: &SessionFold) -> DomainResult<FoldOutcome> {
        let mut conn = self.pool.acquire().await?;

        // IMMEDIATE takes the write lock before the step and Beta state are
        // read, so a concurrent fold for the same user waits its turn.
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = match Self::apply_fold(&mut conn, fold).await {
            Ok(outcome) => sqlx::query("COMMIT")
                .execute(&mut *conn)
                .await
                .map(|_| outcome)
                .map_err(DomainError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    user_id = fold.user_id,
                    step = outcome.step,
                    themes = outcome.themes.len(),
                    "Session fold committed"
                );
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    warn!(user_id = fold.user_id, error = %rollback, "Rollback after failed fold did not run");
                }
                Err(e)
            }
        }
    }
}

#[derive(sqlx::FromRow)]
struct ThemeScoreRow {
    user_id: i64,
    theme: String,
    alpha: f64,
    beta: f64,
    updated_at: String,
}

impl TryFrom<ThemeScoreRow> for ThemeScore {
    type Error = DomainError;

    fn try_from(row: ThemeScoreRow) -> Result<Self, Self::Error> {
        Ok(ThemeScore {
            user_id: row.user_id,
            theme: row.theme,
            alpha: row.alpha,
            beta: row.beta,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    user_id: i64,
    theme: String,
    step: i64,
    mean: f64,
    alpha: f64,
    beta: f64,
    created_at: String,
}

impl TryFrom<SnapshotRow> for ThemeScoreSnapshot {
    type Error = DomainError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        Ok(ThemeScoreSnapshot {
            user_id: row.user_id,
            theme: row.theme,
            step: row.step,
            mean: row.mean,
            alpha: row.alpha,
            beta: row.beta,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
