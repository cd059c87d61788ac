//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - ThemeScoreRepository: Beta scores, snapshots and the atomic session fold
//! - ProgressRepository: accuracy counters and badges
//! - SeenQuestionRepository: persistent question deduplication
//! - QuestionProvider: external question source

pub mod progress_repository;
pub mod question_provider;
pub mod seen_question_repository;
pub mod theme_score_repository;

pub use progress_repository::ProgressRepository;
pub use question_provider::QuestionProvider;
pub use seen_question_repository::SeenQuestionRepository;
pub use theme_score_repository::ThemeScoreRepository;
