//! Quiz service: the entry point callers use to run play sessions.
//!
//! Ties together theme selection, question fetching with deduplication, the
//! per-session aggregator and the session-end Beta update.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::bandit_updater::BanditUpdater;
use super::bucket_partitioner::{BucketPartitioner, ThemeBuckets};
use super::fetch_retry::{Attempt, FetchRetryPolicy, RetryReason};
use super::selection_policy::{QuestionParameters, SelectionPolicy};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::score::round_to;
use crate::domain::models::{
    question_hash, AnswerOutcome, Difficulty, HistoryPoint, PendingQuestion, Profile, QuestionHints,
    ScoreHistory, ScoreView, SessionAggregator, SessionState, SessionStats, ThemeCatalog,
    ThemeDefinition, ThemeHistory, DEFAULT_DISCOUNT,
};
use crate::domain::ports::{
    ProgressRepository, QuestionProvider, SeenQuestionRepository, ThemeScoreRepository,
};

type ScoreUpdater = BanditUpdater<dyn ThemeScoreRepository>;

/// Number of themes shown at each end of the score history.
pub const HISTORY_EDGE: usize = 3;

/// One player's play session.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    user_id: i64,
    aggregator: SessionAggregator,
}

impl QuizSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.aggregator.state()
    }

    pub fn allowed_themes(&self) -> &[String] {
        self.aggregator.allowed_themes()
    }

    pub fn stats(&self) -> &SessionStats {
        self.aggregator.stats()
    }

    pub fn pending(&self) -> Option<&PendingQuestion> {
        self.aggregator.pending()
    }
}

/// Result of ending a session.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionEndOutcome {
    /// False when nothing was answered and no score was written.
    pub score_updated: bool,
    pub step: Option<i64>,
    pub badges: Vec<String>,
    pub stats: SessionStats,
}

pub struct QuizService {
    scores: Arc<dyn ThemeScoreRepository>,
    progress: Arc<dyn ProgressRepository>,
    seen: Arc<dyn SeenQuestionRepository>,
    provider: Arc<dyn QuestionProvider>,
    updater: ScoreUpdater,
    retry: FetchRetryPolicy,
    rng: Mutex<StdRng>,
}

impl QuizService {
    pub fn new(
        scores: Arc<dyn ThemeScoreRepository>,
        progress: Arc<dyn ProgressRepository>,
        seen: Arc<dyn SeenQuestionRepository>,
        provider: Arc<dyn QuestionProvider>,
    ) -> Self {
        Self {
            updater: BanditUpdater::new(scores.clone()),
            scores,
            progress,
            seen,
            provider,
            retry: FetchRetryPolicy::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_retry_policy(mut self, retry: FetchRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Make every random draw reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn themes(&self) -> &'static [ThemeDefinition] {
        ThemeCatalog::definitions()
    }

    /// Start a session restricted to `requested` themes.
    ///
    /// Unknown names are dropped; an empty result means every theme.
    pub fn start_session<S: AsRef<str>>(&self, user_id: i64, requested: &[S]) -> DomainResult<QuizSession> {
        let mut session = QuizSession {
            id: Uuid::new_v4(),
            user_id,
            aggregator: SessionAggregator::new(),
        };
        self.restart_session(&mut session, requested)?;
        Ok(session)
    }

    /// Start a new round on an ended session, keeping its id.
    pub fn restart_session<S: AsRef<str>>(
        &self,
        session: &mut QuizSession,
        requested: &[S],
    ) -> DomainResult<()> {
        let allowed = ThemeCatalog::filter_allowed(requested);
        session.aggregator.start(allowed)?;
        info!(
            session_id = %session.id,
            user_id = session.user_id,
            themes = ?session.aggregator.allowed_themes(),
            "Session started"
        );
        Ok(())
    }

    /// Draw theme and difficulty for the next question.
    ///
    /// `requested` is filtered against the catalog like at session start;
    /// when nothing valid remains every catalog theme is eligible.
    pub async fn select_next_question_parameters<S: AsRef<str>>(
        &self,
        user_id: i64,
        requested: &[S],
    ) -> DomainResult<QuestionParameters> {
        let allowed = ThemeCatalog::filter_allowed(requested);
        let buckets = self.buckets_for(user_id, &allowed).await?;
        SelectionPolicy::select(&buckets, &allowed, &mut *self.rng())
    }

    /// Fetch, deduplicate and present the next question.
    ///
    /// Bucket and difficulty are drawn once; each attempt draws a fresh
    /// theme from the resolved bucket.
    pub async fn next_question(&self, session: &mut QuizSession) -> DomainResult<PendingQuestion> {
        let state = session.aggregator.state();
        if state != SessionState::Active {
            return Err(DomainError::invalid_state("fetch a question", state));
        }

        let user_id = session.user_id;
        let allowed = session.aggregator.allowed_themes().to_vec();
        let buckets = self.buckets_for(user_id, &allowed).await?;
        let (bucket, difficulty) = {
            let mut rng = self.rng();
            let bucket = SelectionPolicy::choose_bucket(&mut *rng);
            (bucket, SelectionPolicy::choose_difficulty(bucket, &mut *rng))
        };
        let candidates = SelectionPolicy::resolve_themes(bucket, &buckets, &allowed);
        debug!(user_id, %bucket, %difficulty, candidates = ?candidates, "Selecting question");

        let aggregator = &session.aggregator;
        let question = self
            .retry
            .run(move |_| {
                let theme = SelectionPolicy::pick_theme(candidates, &mut *self.rng());
                self.attempt_question(aggregator, user_id, theme, difficulty)
            })
            .await?;

        self.seen
            .mark_seen(user_id, &question.hash, &question.source, &question.theme)
            .await?;
        let presented = session.aggregator.present(question)?.clone();
        info!(
            session_id = %session.id,
            number = presented.number,
            theme = %presented.theme,
            difficulty = %presented.difficulty,
            source = %presented.source,
            "Question presented"
        );
        Ok(presented)
    }

    /// Record whether the pending question was answered correctly.
    pub fn record_answer(&self, session: &mut QuizSession, is_correct: bool) -> DomainResult<()> {
        let theme = session
            .aggregator
            .pending()
            .map(|p| p.theme.clone())
            .ok_or_else(|| DomainError::invalid_state("record an answer", "no question is pending"))?;
        session.aggregator.record_answer(&theme, is_correct)?;
        debug!(session_id = %session.id, theme = %theme, is_correct, "Answer recorded");
        Ok(())
    }

    /// Check `given` against the pending question and record it.
    pub fn submit_answer(&self, session: &mut QuizSession, given: &str) -> DomainResult<AnswerOutcome> {
        let outcome = session.aggregator.answer(given)?;
        debug!(
            session_id = %session.id,
            theme = %outcome.theme,
            is_correct = outcome.is_correct,
            streak = outcome.current_streak,
            "Answer submitted"
        );
        Ok(outcome)
    }

    /// End the session and fold its results into the stored scores.
    ///
    /// The session only moves to `Ended` once the fold has committed; if
    /// persisting fails it stays active with its stats so the call can be
    /// retried.
    pub async fn end_session(&self, session: &mut QuizSession) -> DomainResult<SessionEndOutcome> {
        let state = session.aggregator.state();
        if state != SessionState::Active {
            return Err(DomainError::invalid_state("end the session", state));
        }
        let user_id = session.user_id;

        let fold = ScoreUpdater::plan(user_id, session.aggregator.stats(), DEFAULT_DISCOUNT)?
            .with_priors(ThemeCatalog::definitions().iter().map(|t| t.name));
        let committed = match self.updater.commit(&fold).await {
            Ok(committed) => committed,
            Err(e) => {
                warn!(session_id = %session.id, user_id, error = %e, "Session fold failed, session kept active");
                return Err(e);
            }
        };
        let stats = session.aggregator.end()?;

        let Some(committed) = committed else {
            info!(session_id = %session.id, user_id, "Session ended without answers");
            return Ok(SessionEndOutcome {
                score_updated: false,
                step: None,
                badges: Vec::new(),
                stats,
            });
        };

        let badges: Vec<String> = committed.badges().map(ToString::to_string).collect();
        info!(
            session_id = %session.id,
            user_id,
            step = committed.step,
            answered = stats.total_answered(),
            score = stats.score,
            "Session ended"
        );

        Ok(SessionEndOutcome {
            score_updated: true,
            step: Some(committed.step),
            badges,
            stats,
        })
    }

    /// Current score of every stored theme.
    pub async fn score_snapshot(&self, user_id: i64) -> DomainResult<Vec<ScoreView>> {
        let states = self.scores.list_for_user(user_id).await?;
        Ok(states.iter().map(ScoreView::from).collect())
    }

    /// Snapshot series for the weakest and strongest themes.
    pub async fn score_history(&self, user_id: i64) -> DomainResult<ScoreHistory> {
        let mut states = self.scores.list_for_user(user_id).await?;
        if states.is_empty() {
            return Ok(ScoreHistory::default());
        }
        states.sort_by(|a, b| a.mean().total_cmp(&b.mean()));

        let bottom: Vec<String> = states.iter().take(HISTORY_EDGE).map(|s| s.theme.clone()).collect();
        let top: Vec<String> = states.iter().rev().take(HISTORY_EDGE).map(|s| s.theme.clone()).collect();

        let mut selected = bottom.clone();
        for theme in &top {
            if !selected.contains(theme) {
                selected.push(theme.clone());
            }
        }

        let snapshots = self.scores.snapshots_for_themes(user_id, &selected).await?;
        let series = selected
            .into_iter()
            .map(|theme| {
                let points = snapshots
                    .iter()
                    .filter(|s| s.theme == theme)
                    .map(|s| HistoryPoint {
                        step: s.step,
                        mean: round_to(s.mean, 4),
                    })
                    .collect();
                ThemeHistory { theme, points }
            })
            .collect();

        Ok(ScoreHistory { top, bottom, series })
    }

    pub async fn profile(&self, user_id: i64) -> DomainResult<Profile> {
        let themes = self.progress.list_accuracy(user_id).await?;
        let achievements = self.progress.list_achievements(user_id).await?;
        Ok(Profile::new(user_id, themes, achievements))
    }

    /// Number of distinct questions ever presented to the user.
    pub async fn questions_seen(&self, user_id: i64) -> DomainResult<u64> {
        self.seen.count_for_user(user_id).await
    }

    async fn attempt_question(
        &self,
        aggregator: &SessionAggregator,
        user_id: i64,
        theme: DomainResult<String>,
        difficulty: Difficulty,
    ) -> DomainResult<Attempt<PendingQuestion>> {
        let theme = theme?;
        let hints = ThemeCatalog::get(&theme)
            .map(QuestionHints::from)
            .ok_or_else(|| DomainError::UnknownTheme(theme.clone()))?;

        let fetched = match self.provider.fetch(&hints, difficulty).await {
            Ok(q) => q,
            Err(e) => return Ok(Attempt::Retry(RetryReason::ProviderFailed(e.to_string()))),
        };
        if !fetched.is_usable() {
            return Ok(Attempt::Retry(RetryReason::Unusable));
        }

        let hash = question_hash(&fetched.text);
        if aggregator.has_seen(&hash) {
            return Ok(Attempt::Retry(RetryReason::DuplicateInSession));
        }
        if self.seen.has_seen(user_id, &hash).await? {
            return Ok(Attempt::Retry(RetryReason::PreviouslySeen));
        }

        Ok(Attempt::Accept(PendingQuestion {
            number: 0,
            text: fetched.text,
            answers: fetched.answers,
            correct_answer: fetched.correct_answer,
            difficulty: fetched.difficulty,
            theme,
            source: fetched.source,
            hash,
        }))
    }

    async fn buckets_for(&self, user_id: i64, allowed: &[String]) -> DomainResult<ThemeBuckets> {
        let means: HashMap<String, f64> = self
            .scores
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|s| {
                let mean = s.mean();
                (s.theme, mean)
            })
            .collect();
        Ok(BucketPartitioner::partition(allowed, &means))
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::{MockQuestionProvider, MockResponse};
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteProgressRepository, SqliteSeenQuestionRepository,
        SqliteThemeScoreRepository,
    };

    async fn setup_service(responses: Vec<MockResponse>) -> (QuizService, Arc<MockQuestionProvider>) {
        let (service, provider, _pool) = setup_service_with_pool(responses).await;
        (service, provider)
    }

    async fn setup_service_with_pool(
        responses: Vec<MockResponse>,
    ) -> (QuizService, Arc<MockQuestionProvider>, sqlx::SqlitePool) {
        let pool = create_migrated_test_pool().await.unwrap();
        let provider = Arc::new(MockQuestionProvider::new(responses));
        let service = QuizService::new(
            Arc::new(SqliteThemeScoreRepository::new(pool.clone())),
            Arc::new(SqliteProgressRepository::new(pool.clone())),
            Arc::new(SqliteSeenQuestionRepository::new(pool.clone())),
            provider.clone(),
        )
        .with_seed(11);
        (service, provider, pool)
    }

    async fn answer_all(service: &QuizService, session: &mut QuizSession, count: usize) {
        for _ in 0..count {
            service.next_question(session).await.unwrap();
            service.submit_answer(session, "A").unwrap();
        }
    }

    #[tokio::test]
    async fn test_start_filters_themes() {
        let (service, _) = setup_service(vec![]).await;
        let session = service.start_session(1, &["Music", "Cooking"]).unwrap();
        assert_eq!(session.allowed_themes(), &["Music".to_string()]);
        assert_eq!(session.state(), SessionState::Active);

        let all = service.start_session::<&str>(1, &[]).unwrap();
        assert_eq!(all.allowed_themes().len(), ThemeCatalog::definitions().len());
    }

    #[tokio::test]
    async fn test_question_requires_active_session() {
        let (service, _) = setup_service(vec![MockResponse::question("Q1")]).await;
        let mut session = service.start_session(1, &["Music"]).unwrap();
        service.end_session(&mut session).await.unwrap();

        let result = service.next_question(&mut session).await;
        assert!(matches!(result, Err(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_retries_past_failures_and_duplicates() {
        let (service, provider) = setup_service(vec![
            MockResponse::question("Q1"),
            MockResponse::failure("timeout"),
            MockResponse::Empty,
            MockResponse::question("q1"),
            MockResponse::question("Q2"),
        ])
        .await;
        let mut session = service.start_session(1, &["Science"]).unwrap();

        let first = service.next_question(&mut session).await.unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(first.theme, "Science");
        service.record_answer(&mut session, true).unwrap();

        let second = service.next_question(&mut session).await.unwrap();
        assert_eq!(second.text, "Q2");
        assert_eq!(second.number, 2);
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_no_question() {
        let (service, provider) = setup_service(vec![]).await;
        let mut session = service.start_session(1, &["Sports"]).unwrap();

        let result = service.next_question(&mut session).await;
        assert!(matches!(result, Err(DomainError::NoQuestionAvailable { attempts: 6 })));
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test]
    async fn test_seen_questions_skipped_across_sessions() {
        let (service, _) = setup_service(vec![
            MockResponse::question("Capital of Peru?"),
            MockResponse::question("Capital of Peru?"),
            MockResponse::question("Capital of Chile?"),
        ])
        .await;

        let mut first = service.start_session(1, &["Geography"]).unwrap();
        service.next_question(&mut first).await.unwrap();
        service.end_session(&mut first).await.unwrap();

        let mut second = service.start_session(1, &["Geography"]).unwrap();
        let q = service.next_question(&mut second).await.unwrap();
        assert_eq!(q.text, "Capital of Chile?");
        assert_eq!(service.questions_seen(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_end_without_answers_keeps_scores() {
        let (service, _) = setup_service(vec![]).await;
        let mut session = service.start_session(1, &["Music"]).unwrap();

        let outcome = service.end_session(&mut session).await.unwrap();
        assert!(!outcome.score_updated);
        assert!(service.score_snapshot(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_session_updates_scores_and_badges() {
        let (service, _) = setup_service(vec![
            MockResponse::question("Q1"),
            MockResponse::question("Q2"),
            MockResponse::question("Q3"),
        ])
        .await;
        let mut session = service.start_session(7, &["Science"]).unwrap();

        for _ in 0..3 {
            service.next_question(&mut session).await.unwrap();
            let outcome = service.submit_answer(&mut session, "A").unwrap();
            assert!(outcome.is_correct);
        }

        let outcome = service.end_session(&mut session).await.unwrap();
        assert!(outcome.score_updated);
        assert_eq!(outcome.step, Some(1));
        assert_eq!(outcome.badges, vec!["Expert in Science!".to_string()]);
        assert_eq!(outcome.stats.best_streak, 3);

        let snapshot = service.score_snapshot(7).await.unwrap();
        assert_eq!(snapshot.len(), ThemeCatalog::definitions().len());
        let science = snapshot.iter().find(|v| v.theme == "Science").unwrap();
        assert!((science.mean - 0.8191).abs() < 1e-9);
        assert!((science.alpha - 3.85).abs() < 1e-9);

        let profile = service.profile(7).await.unwrap();
        assert_eq!(profile.total_questions, 3);
        assert_eq!(profile.best_streak, 3);
        assert_eq!(profile.achievements.len(), 1);
    }

    #[tokio::test]
    async fn test_score_history_edges() {
        let (service, _) = setup_service(vec![
            MockResponse::question("Q1"),
            MockResponse::question("Q2"),
        ])
        .await;

        let mut session = service.start_session(3, &["Music"]).unwrap();
        service.next_question(&mut session).await.unwrap();
        service.record_answer(&mut session, true).unwrap();
        service.end_session(&mut session).await.unwrap();

        service.restart_session(&mut session, &["History"]).unwrap();
        service.next_question(&mut session).await.unwrap();
        service.record_answer(&mut session, false).unwrap();
        service.end_session(&mut session).await.unwrap();

        let history = service.score_history(3).await.unwrap();
        assert_eq!(history.top[0], "Music");
        assert_eq!(history.bottom[0], "History");
        assert_eq!(history.top.len(), HISTORY_EDGE);
        assert_eq!(history.bottom.len(), HISTORY_EDGE);

        let music = history.series.iter().find(|s| s.theme == "Music").unwrap();
        assert_eq!(music.points.len(), 1);
        assert_eq!(music.points[0].step, 1);
        let history_series = history.series.iter().find(|s| s.theme == "History").unwrap();
        assert_eq!(history_series.points[0].step, 2);
    }

    #[tokio::test]
    async fn test_select_parameters_falls_back_to_catalog() {
        let (service, _) = setup_service(vec![]).await;

        for requested in [Vec::new(), vec!["Cooking".to_string()]] {
            for _ in 0..50 {
                let params = service.select_next_question_parameters(1, requested.as_slice()).await.unwrap();
                assert!(ThemeCatalog::is_valid(&params.theme), "{} is not a catalog theme", params.theme);
            }
        }

        let params = service
            .select_next_question_parameters(1, &["Music", "Cooking"])
            .await
            .unwrap();
        assert_eq!(params.theme, "Music");
    }

    #[tokio::test]
    async fn test_failed_end_keeps_session_active() {
        let (service, _, pool) = setup_service_with_pool(common_questions(2)).await;
        let mut session = service.start_session(1, &["Science"]).unwrap();
        answer_all(&service, &mut session, 2).await;

        sqlx::query("ALTER TABLE theme_score_snapshots RENAME TO snapshots_offline")
            .execute(&pool)
            .await
            .unwrap();
        let result = service.end_session(&mut session).await;
        assert!(matches!(result, Err(DomainError::DatabaseError(_))));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.stats().total_answered(), 2);
        assert!(service.score_snapshot(1).await.unwrap().is_empty());

        sqlx::query("ALTER TABLE snapshots_offline RENAME TO theme_score_snapshots")
            .execute(&pool)
            .await
            .unwrap();
        let outcome = service.end_session(&mut session).await.unwrap();
        assert!(outcome.score_updated);
        assert_eq!(outcome.step, Some(1));
        assert_eq!(outcome.stats.total_answered(), 2);
        assert_eq!(session.state(), SessionState::Ended);
        assert_eq!(service.score_snapshot(1).await.unwrap().len(), ThemeCatalog::definitions().len());
    }

    #[tokio::test]
    async fn test_concurrent_ends_keep_both_sessions() {
        let (service, _) = setup_service(common_questions(6)).await;
        let mut first = service.start_session(1, &["Science"]).unwrap();
        let mut second = service.start_session(1, &["Science"]).unwrap();
        answer_all(&service, &mut first, 3).await;
        answer_all(&service, &mut second, 3).await;

        let (a, b) = tokio::join!(service.end_session(&mut first), service.end_session(&mut second));
        let mut steps = vec![a.unwrap().step.unwrap(), b.unwrap().step.unwrap()];
        steps.sort_unstable();
        assert_eq!(steps, vec![1, 2]);

        let science = service
            .score_snapshot(1)
            .await
            .unwrap()
            .into_iter()
            .find(|v| v.theme == "Science")
            .unwrap();
        assert!((science.alpha - 6.2725).abs() < 1e-3);
        assert!((science.beta - 0.7225).abs() < 1e-3);
    }

    fn common_questions(n: usize) -> Vec<MockResponse> {
        (1..=n).map(|i| MockResponse::question(format!("Question {i}?"))).collect()
    }
}
