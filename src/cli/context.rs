//! Wiring shared by commands: config, database and the quiz service.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::providers::QuestionBank;
use crate::adapters::sqlite::{
    initialize_database, PoolConfig,
    SqliteProgressRepository, SqliteSeenQuestionRepository, SqliteThemeScoreRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::QuestionProvider;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{FetchRetryPolicy, QuizService};

pub struct AppContext {
    pub config: Config,
    pub pool: SqlitePool,
}

impl AppContext {
    /// Load configuration and open the migrated database.
    pub async fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::open(config).await
    }

    pub async fn open(config: Config) -> Result<Self> {
        let pool = initialize_database(
            &config.database.url(),
            Some(PoolConfig::from(&config.database)),
        )
        .await
        .context("Failed to initialize database. Run 'trickia init' first.")?;
        Ok(Self { config, pool })
    }

    /// Question bank from `path`, or from the configured location.
    pub fn question_bank(&self, path: Option<&Path>) -> Result<QuestionBank> {
        let path = path.unwrap_or_else(|| Path::new(&self.config.question_bank.path));
        QuestionBank::load(path).with_context(|| {
            format!(
                "Failed to load question bank {}. Run 'trickia init' to create one.",
                path.display()
            )
        })
    }

    pub fn quiz_service(&self, provider: Arc<dyn QuestionProvider>) -> QuizService {
        QuizService::new(
            Arc::new(SqliteThemeScoreRepository::new(self.pool.clone())),
            Arc::new(SqliteProgressRepository::new(self.pool.clone())),
            Arc::new(SqliteSeenQuestionRepository::new(self.pool.clone())),
            provider,
        )
        .with_retry_policy(FetchRetryPolicy::new(self.config.fetch.max_attempts))
    }

    /// Service for read-only commands that never fetch questions.
    pub fn reporting_service(&self) -> Result<QuizService> {
        let empty = QuestionBank::new(Vec::new())?;
        Ok(self.quiz_service(Arc::new(empty)))
    }
}
