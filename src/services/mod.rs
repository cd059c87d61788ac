//! Quiz services: theme selection, question fetching and score updates.

pub mod bandit_updater;
pub mod bucket_partitioner;
pub mod fetch_retry;
pub mod quiz_service;
pub mod selection_policy;

pub use bandit_updater::BanditUpdater;
pub use bucket_partitioner::{Bucket, BucketPartitioner, ThemeBuckets};
pub use fetch_retry::{Attempt, FetchRetryPolicy, RetryReason};
pub use quiz_service::{QuizService, QuizSession, SessionEndOutcome};
pub use selection_policy::{QuestionParameters, SelectionPolicy};
