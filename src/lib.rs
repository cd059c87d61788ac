//! Trickia - adaptive trivia quiz engine
//!
//! Trickia keeps a Beta(alpha, beta) skill estimate per (player, theme) and
//! uses it to choose what to ask next: mostly questions from the player's
//! strongest themes, with regular detours into average and weak ones.
//! Estimates are updated once per finished session with exponential decay,
//! so recent sessions weigh more than old ones.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): selection policy, fetch retry, session
//!   flow and the session-end score update
//! - **Adapters** (`adapters`): SQLite repositories and question providers
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trickia::adapters::providers::QuestionBank;
//! use trickia::adapters::sqlite::*;
//! use trickia::services::QuizService;
//!
//! let pool = initialize_database("sqlite:.trickia/trickia.db", None).await?;
//! let service = QuizService::new(
//!     Arc::new(SqliteThemeScoreRepository::new(pool.clone())),
//!     Arc::new(SqliteProgressRepository::new(pool.clone())),
//!     Arc::new(SqliteSeenQuestionRepository::new(pool)),
//!     Arc::new(QuestionBank::load(".trickia/questions.json")?),
//! );
//! let mut session = service.start_session(1, &["Science", "Music"])?;
//! let question = service.next_question(&mut session).await?;
//! service.submit_answer(&mut session, &question.answers[0])?;
//! let outcome = service.end_session(&mut session).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, Difficulty, PendingQuestion, Profile, ScoreHistory, ScoreView, SessionStats,
    ThemeCatalog, ThemeScore,
};
pub use domain::ports::{
    ProgressRepository, QuestionProvider, SeenQuestionRepository, ThemeScoreRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{QuizService, QuizSession, SessionEndOutcome};
