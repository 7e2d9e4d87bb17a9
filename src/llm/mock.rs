//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Citation, CompletionRequest, LlmProvider, ProviderError, SearchOutput};

/// Replays queued responses in order. An empty queue answers with an API error,
/// so a provider built with [`MockProvider::failing`] rejects every call.
#[derive(Default)]
pub struct MockProvider {
    searches: Mutex<VecDeque<Result<SearchOutput, ProviderError>>>,
    completions: Mutex<VecDeque<Result<String, ProviderError>>>,
    delay: Option<Duration>,
    search_requests: Mutex<Vec<CompletionRequest>>,
    completion_requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_search(self, response: Result<SearchOutput, ProviderError>) -> Self {
        self.searches.lock().unwrap().push_back(response);
        self
    }

    /// Queues a successful web search answer with the given text and no citations.
    pub fn with_search_text(self, text: impl Into<String>) -> Self {
        self.with_search(Ok(SearchOutput {
            text: text.into(),
            citations: Vec::<Citation>::new(),
        }))
    }

    pub fn with_completion(self, response: Result<String, ProviderError>) -> Self {
        self.completions.lock().unwrap().push_back(response);
        self
    }

    pub fn with_completion_text(self, text: impl Into<String>) -> Self {
        self.with_completion(Ok(text.into()))
    }

    /// Sleeps before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_requests.lock().unwrap().len()
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_requests.lock().unwrap().len()
    }

    pub fn search_requests(&self) -> Vec<CompletionRequest> {
        self.search_requests.lock().unwrap().clone()
    }

    pub fn completion_requests(&self) -> Vec<CompletionRequest> {
        self.completion_requests.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn unscripted() -> ProviderError {
    ProviderError::Api {
        status: 503,
        body: "mock provider has no scripted response".to_string(),
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.completion_requests.lock().unwrap().push(request.clone());
        self.pause().await;
        let next = self.completions.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn complete_with_web_search(
        &self,
        request: &CompletionRequest,
    ) -> Result<SearchOutput, ProviderError> {
        self.search_requests.lock().unwrap().push(request.clone());
        self.pause().await;
        let next = self.searches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }
}
