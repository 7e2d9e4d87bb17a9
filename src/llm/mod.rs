//! Language model provider seam.
//!
//! Everything above this module talks to the provider through
//! [`LlmProvider`]; the OpenAI client and the scripted mock both live here.

pub mod mock;
pub mod openai;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// A single prompt sent to the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A source page the model cited while answering with web search.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    pub url: String,
    pub title: Option<String>,
}

/// Text produced by a web-search-augmented completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutput {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Plain completion with no tools bound.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Completion with the provider's web search tool available to the model.
    async fn complete_with_web_search(
        &self,
        request: &CompletionRequest,
    ) -> Result<SearchOutput, ProviderError>;
}

/// Runs a provider call under a deadline; an elapsed deadline is a provider error.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ProviderError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_passes_through_fast_calls() {
        let value = with_timeout(Duration::from_millis(200), async { Ok::<_, ProviderError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn with_timeout_reports_elapsed_deadline() {
        let err = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, ProviderError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[test]
    fn request_builder_sets_fields() {
        let request = CompletionRequest::new("hello")
            .with_system("be brief")
            .with_temperature(Some(0.2))
            .with_max_tokens(Some(64));
        assert_eq!(request.user, "hello");
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(64));
    }
}
