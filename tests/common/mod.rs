//! Common test utilities for integration tests

use std::sync::Arc;
use tempfile::TempDir;

use trickia::adapters::providers::{MockQuestionProvider, MockResponse};
use trickia::adapters::sqlite::{
    create_migrated_test_pool, SqliteProgressRepository, SqliteSeenQuestionRepository,
    SqliteThemeScoreRepository,
};
use trickia::services::QuizService;

/// Create a temporary directory for test isolation
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Initialize a tracing subscriber that writes through the test harness.
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Quiz service over an in-memory database and a scripted provider.
#[allow(dead_code)]
pub async fn setup_quiz_service(
    responses: Vec<MockResponse>,
    seed: u64,
) -> (QuizService, Arc<MockQuestionProvider>) {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    let provider = Arc::new(MockQuestionProvider::new(responses));
    let service = QuizService::new(
        Arc::new(SqliteThemeScoreRepository::new(pool.clone())),
        Arc::new(SqliteProgressRepository::new(pool.clone())),
        Arc::new(SqliteSeenQuestionRepository::new(pool)),
        provider.clone(),
    )
    .with_seed(seed);
    (service, provider)
}

/// `n` distinct well-formed questions.
#[allow(dead_code)]
pub fn questions(n: usize) -> Vec<MockResponse> {
    (1..=n)
        .map(|i| MockResponse::question(format!("Question number {i}?")))
        .collect()
}
