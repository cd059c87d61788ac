//! Mock question provider for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Difficulty, FetchedQuestion, QuestionHints};
use crate::domain::ports::QuestionProvider;

/// One scripted provider response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this question, with answers as given.
    Question(FetchedQuestion),
    /// Return a question whose text is blank.
    Empty,
    /// Fail with a provider error.
    Failure(String),
}

impl MockResponse {
    /// A well-formed question whose correct answer is "A".
    pub fn question(text: impl Into<String>) -> Self {
        Self::Question(FetchedQuestion {
            text: text.into(),
            correct_answer: "A".to_string(),
            answers: vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
            difficulty: "medium".to_string(),
            source: "mock".to_string(),
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(error.into())
    }
}

/// Provider that replays scripted responses in order.
///
/// Once the script runs out every call fails.
pub struct MockQuestionProvider {
    script: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<(String, Difficulty)>>,
    calls: AtomicU32,
}

impl MockQuestionProvider {
    pub fn new(responses: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of `fetch` calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Theme and difficulty of every request, in order.
    pub async fn requests(&self) -> Vec<(String, Difficulty)> {
        self.requests.lock().await.clone()
    }

    pub async fn push(&self, response: MockResponse) {
        self.script.lock().await.push_back(response);
    }
}

#[async_trait]
impl QuestionProvider for MockQuestionProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, hints: &QuestionHints, difficulty: Difficulty) -> DomainResult<FetchedQuestion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push((hints.theme.clone(), difficulty));

        match self.script.lock().await.pop_front() {
            Some(MockResponse::Question(q)) => Ok(q),
            Some(MockResponse::Empty) => Ok(FetchedQuestion {
                text: String::new(),
                correct_answer: String::new(),
                answers: Vec::new(),
                difficulty: difficulty.as_str().to_string(),
                source: "mock".to_string(),
            }),
            Some(MockResponse::Failure(message)) => Err(DomainError::ProviderError(message)),
            None => Err(DomainError::ProviderError("mock script exhausted".to_string())),
        }
    }
}
