pub mod config;
pub mod fold;
pub mod progress;
pub mod question;
pub mod score;
pub mod session;
pub mod theme;

pub use config::{Config, DatabaseConfig, FetchConfig, LoggingConfig, QuestionBankConfig};
pub use fold::{FoldOutcome, SessionFold, ThemeEvidence, ThemeFold};
pub use progress::{
    earns_expert_badge, expert_label, Achievement, Profile, ThemeAccuracy, EXPERT_MIN_ACCURACY,
    EXPERT_MIN_QUESTIONS,
};
pub use question::{question_hash, Difficulty, FetchedQuestion, PendingQuestion, QuestionHints};
pub use score::{
    beta_mean, HistoryPoint, ScoreHistory, ScoreView, ThemeHistory, ThemeScore,
    ThemeScoreSnapshot, DEFAULT_DISCOUNT, NEUTRAL_MEAN,
};
pub use session::{AnswerOutcome, SessionAggregator, SessionState, SessionStats, Tally};
pub use theme::{ThemeCatalog, ThemeDefinition};
