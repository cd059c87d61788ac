mod common;

use std::sync::Arc;

use trickia::adapters::sqlite::{initialize_database, PoolConfig, SqliteThemeScoreRepository};
use trickia::domain::models::{SessionStats, Tally, DEFAULT_DISCOUNT};
use trickia::domain::ports::ThemeScoreRepository;
use trickia::services::BanditUpdater;

#[tokio::test]
async fn test_scores_persist_across_pools() {
    let dir = common::temp_dir();
    let url = format!("sqlite:{}", dir.path().join("nested/quiz.db").display());

    {
        let pool = initialize_database(&url, None).await.unwrap();
        let repo = SqliteThemeScoreRepository::new(pool.clone());
        repo.ensure(1, "Science").await.unwrap();
        pool.close().await;
    }

    let pool = initialize_database(&url, None).await.unwrap();
    let repo = Arc::new(SqliteThemeScoreRepository::new(pool));
    let score = repo.get(1, "Science").await.unwrap().unwrap();
    assert!((score.mean() - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let dir = common::temp_dir();
    let url = format!("sqlite:{}", dir.path().join("quiz.db").display());

    let first = initialize_database(&url, None).await.unwrap();
    first.close().await;
    let second = initialize_database(&url, None).await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM theme_scores")
        .fetch_one(&second)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_concurrent_folds_serialize_per_user() {
    let dir = common::temp_dir();
    let url = format!("sqlite:{}", dir.path().join("quiz.db").display());
    let pool = initialize_database(
        &url,
        Some(PoolConfig {
            max_connections: 4,
            ..PoolConfig::default()
        }),
    )
    .await
    .unwrap();
    let repo = Arc::new(SqliteThemeScoreRepository::new(pool));

    let mut stats = SessionStats::default();
    stats.themes.insert("Science".to_string(), Tally { total: 3, correct: 3 });

    let mut handles = Vec::new();
    for _ in 0..4 {
        let updater = BanditUpdater::new(repo.clone());
        let stats = stats.clone();
        handles.push(tokio::spawn(async move {
            updater.apply(1, &stats, DEFAULT_DISCOUNT).await.unwrap().unwrap().step
        }));
    }

    let mut steps = Vec::new();
    for handle in handles {
        steps.push(handle.await.unwrap());
    }
    steps.sort_unstable();
    assert_eq!(steps, vec![1, 2, 3, 4]);

    // Four sequential 3/3 updates from the 1/1 prior.
    let mut expected = (1.0_f64, 1.0_f64);
    for _ in 0..4 {
        expected = (DEFAULT_DISCOUNT * expected.0 + 3.0, DEFAULT_DISCOUNT * expected.1);
    }
    let science = repo.get(1, "Science").await.unwrap().unwrap();
    assert!((science.alpha - expected.0).abs() < 1e-9);
    assert!((science.beta - expected.1).abs() < 1e-9);
}
