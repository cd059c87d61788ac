//! Play-session state.
//!
//! A `SessionAggregator` owns everything that lives for one play session:
//! per-theme counters, streaks, the per-session dedup memory and the question
//! awaiting an answer. It moves through `NotStarted -> Active -> Ended` and can
//! be restarted from `Ended`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::question::PendingQuestion;
use crate::domain::errors::{DomainError, DomainResult};

/// Lifecycle state of a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    Active,
    Ended,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answered / correct counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub total: u32,
    pub correct: u32,
}

impl Tally {
    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    pub fn wrong(&self) -> u32 {
        self.total.saturating_sub(self.correct)
    }

    /// Fraction of correct answers, 0.0 when nothing was answered.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}

/// Aggregated results of one play session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub themes: BTreeMap<String, Tally>,
    /// Results per question provider.
    pub sources: BTreeMap<String, Tally>,
    pub score: u32,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl SessionStats {
    pub fn total_answered(&self) -> u32 {
        self.themes.values().map(|t| t.total).sum()
    }

    /// Themes that received at least one answer.
    pub fn played_themes(&self) -> impl Iterator<Item = (&String, &Tally)> {
        self.themes.iter().filter(|(_, t)| t.total > 0)
    }
}

/// Result of answering the pending question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub theme: String,
    pub score: u32,
    pub current_streak: u32,
}

/// Per-session accumulator and lifecycle state machine.
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    state: SessionState,
    allowed_themes: Vec<String>,
    stats: SessionStats,
    seen_hashes: HashSet<String>,
    pending: Option<PendingQuestion>,
    questions_presented: u32,
    started_at: Option<DateTime<Utc>>,
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self {
            state: SessionState::NotStarted,
            allowed_themes: Vec::new(),
            stats: SessionStats::default(),
            seen_hashes: HashSet::new(),
            pending: None,
            questions_presented: 0,
            started_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn allowed_themes(&self) -> &[String] {
        &self.allowed_themes
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn pending(&self) -> Option<&PendingQuestion> {
        self.pending.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn questions_presented(&self) -> u32 {
        self.questions_presented
    }

    /// Whether this session already presented a question with this hash.
    pub fn has_seen(&self, hash: &str) -> bool {
        self.seen_hashes.contains(hash)
    }

    /// Begin (or restart) a session with the given themes.
    pub fn start(&mut self, allowed_themes: Vec<String>) -> DomainResult<()> {
        if self.state == SessionState::Active {
            return Err(DomainError::invalid_state("start", self.state));
        }

        self.state = SessionState::Active;
        self.allowed_themes = allowed_themes;
        self.stats = SessionStats::default();
        self.seen_hashes.clear();
        self.pending = None;
        self.questions_presented = 0;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Make `question` the one awaiting an answer.
    ///
    /// An unanswered previous question is replaced.
    pub fn present(&mut self, mut question: PendingQuestion) -> DomainResult<&PendingQuestion> {
        self.ensure_active("present a question")?;

        self.questions_presented += 1;
        question.number = self.questions_presented;
        self.seen_hashes.insert(question.hash.clone());
        Ok(self.pending.insert(question))
    }

    /// Count an answer for `theme` against the pending question.
    pub fn record_answer(&mut self, theme: &str, is_correct: bool) -> DomainResult<()> {
        self.ensure_active("record an answer")?;

        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| DomainError::invalid_state("record an answer", "no question is pending"))?;
        if pending.theme != theme {
            return Err(DomainError::ValidationFailed(format!(
                "answer is for theme '{theme}' but pending question is '{}'",
                pending.theme
            )));
        }
        let source = pending.source.clone();
        self.pending = None;

        self.stats.themes.entry(theme.to_string()).or_default().record(is_correct);
        self.stats.sources.entry(source).or_default().record(is_correct);

        if is_correct {
            self.stats.score += 1;
            self.stats.current_streak += 1;
            self.stats.best_streak = self.stats.best_streak.max(self.stats.current_streak);
        } else {
            self.stats.current_streak = 0;
        }
        Ok(())
    }

    /// Check `given` against the pending question and record the result.
    pub fn answer(&mut self, given: &str) -> DomainResult<AnswerOutcome> {
        self.ensure_active("answer")?;
        let (theme, correct_answer) = match &self.pending {
            Some(p) => (p.theme.clone(), p.correct_answer.clone()),
            None => return Err(DomainError::invalid_state("answer", "no question is pending")),
        };

        let is_correct = given == correct_answer;
        self.record_answer(&theme, is_correct)?;

        Ok(AnswerOutcome {
            is_correct,
            correct_answer,
            theme,
            score: self.stats.score,
            current_streak: self.stats.current_streak,
        })
    }

    /// Close the session and hand back its totals.
    pub fn end(&mut self) -> DomainResult<SessionStats> {
        self.ensure_active("end the session")?;
        self.state = SessionState::Ended;
        self.pending = None;
        Ok(std::mem::take(&mut self.stats))
    }

    fn ensure_active(&self, operation: &str) -> DomainResult<()> {
        if self.state == SessionState::Active {
            Ok(())
        } else {
            Err(DomainError::invalid_state(operation, self.state))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::question::question_hash;

    fn pending(theme: &str, text: &str) -> PendingQuestion {
        PendingQuestion {
            number: 0,
            text: text.to_string(),
            answers: vec!["A".to_string(), "B".to_string()],
            correct_answer: "A".to_string(),
            difficulty: "easy".to_string(),
            theme: theme.to_string(),
            source: "bank".to_string(),
            hash: question_hash(text),
        }
    }

    fn active() -> SessionAggregator {
        let mut agg = SessionAggregator::new();
        agg.start(vec!["Science".to_string(), "History".to_string()]).unwrap();
        agg
    }

    #[test]
    fn test_record_before_start_fails() {
        let mut agg = SessionAggregator::new();
        let err = agg.record_answer("Science", true).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[test]
    fn test_record_without_pending_fails() {
        let mut agg = active();
        let err = agg.record_answer("Science", true).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[test]
    fn test_streaks_and_score() {
        let mut agg = active();
        for (i, correct) in [true, true, false, true].into_iter().enumerate() {
            agg.present(pending("Science", &format!("q{i}"))).unwrap();
            agg.record_answer("Science", correct).unwrap();
        }

        let stats = agg.stats();
        assert_eq!(stats.score, 3);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.themes["Science"], Tally { total: 4, correct: 3 });
        assert_eq!(stats.sources["bank"].total, 4);
    }

    #[test]
    fn test_answer_checks_correct_choice() {
        let mut agg = active();
        agg.present(pending("History", "Who?")).unwrap();
        let outcome = agg.answer("B").unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "A");
        assert!(agg.pending().is_none());

        // No pending question any more
        assert!(matches!(agg.answer("A"), Err(DomainError::InvalidState { .. })));
    }

    #[test]
    fn test_theme_mismatch_rejected() {
        let mut agg = active();
        agg.present(pending("History", "When?")).unwrap();
        assert!(matches!(
            agg.record_answer("Science", true),
            Err(DomainError::ValidationFailed(_))
        ));
        assert!(agg.pending().is_some());
    }

    #[test]
    fn test_present_numbers_questions_and_remembers_hash() {
        let mut agg = active();
        let number = agg.present(pending("Science", "First")).unwrap().number;
        assert_eq!(number, 1);
        let number = agg.present(pending("Science", "Second")).unwrap().number;
        assert_eq!(number, 2);
        assert!(agg.has_seen(&question_hash("first")));
    }

    #[test]
    fn test_end_twice_fails() {
        let mut agg = active();
        agg.present(pending("Science", "q")).unwrap();
        agg.record_answer("Science", true).unwrap();

        let stats = agg.end().unwrap();
        assert_eq!(stats.total_answered(), 1);
        assert_eq!(agg.state(), SessionState::Ended);
        assert!(matches!(agg.end(), Err(DomainError::InvalidState { .. })));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut agg = active();
        agg.present(pending("Science", "q")).unwrap();
        agg.record_answer("Science", true).unwrap();
        agg.end().unwrap();

        agg.start(vec!["Music".to_string()]).unwrap();
        assert_eq!(agg.state(), SessionState::Active);
        assert_eq!(agg.stats().total_answered(), 0);
        assert!(!agg.has_seen(&question_hash("q")));
        assert_eq!(agg.allowed_themes(), ["Music".to_string()]);
    }

    #[test]
    fn test_start_while_active_fails() {
        let mut agg = active();
        assert!(matches!(agg.start(vec![]), Err(DomainError::InvalidState { .. })));
    }

    #[test]
    fn test_tally_accuracy() {
        let tally = Tally { total: 4, correct: 3 };
        assert!((tally.accuracy() - 0.75).abs() < f64::EPSILON);
        assert_eq!(tally.wrong(), 1);
        assert!(Tally::default().accuracy().abs() < f64::EPSILON);
    }
}
