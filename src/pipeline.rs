//! Content pipeline: web-search-grounded news with a single downgrade to
//! invented items when the search path cannot deliver.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::llm::{CompletionRequest, LlmProvider, ProviderError, with_timeout};
use crate::news::{GenerationResult, NewsItem, ParseError, UrlPolicy, parse_news_items};
use crate::prompt;

/// Why the web search path was abandoned.
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Malformed(#[from] ParseError),

    #[error("only {valid} of {wanted} items had a title and cited source url")]
    Insufficient { wanted: usize, valid: usize },
}

#[derive(Clone)]
pub struct NewsPipeline {
    provider: Arc<dyn LlmProvider>,
    web_search_timeout: Duration,
    completion_timeout: Duration,
    max_item_count: usize,
}

impl NewsPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &Config) -> Self {
        Self {
            provider,
            web_search_timeout: config.web_search_timeout,
            completion_timeout: config.completion_timeout,
            max_item_count: config.max_item_count,
        }
    }

    /// Produces up to `item_count` items for `topic`.
    ///
    /// With `prefer_web_search`, the grounded path runs first; any provider
    /// error, timeout, malformed output or short item list downgrades once to
    /// plain generation. The result is tagged with the path that produced it.
    pub async fn fetch_content(
        &self,
        topic: &str,
        item_count: usize,
        prefer_web_search: bool,
    ) -> Result<GenerationResult> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::InvalidRequest("topic must not be empty".to_string()));
        }
        if item_count == 0 || item_count > self.max_item_count {
            return Err(AppError::InvalidRequest(format!(
                "itemCount must be between 1 and {}",
                self.max_item_count
            )));
        }

        let today = Local::now().date_naive();

        let searched = if prefer_web_search {
            match self.search_items(topic, item_count, today).await {
                Ok(items) => Some(items),
                Err(reason) => {
                    warn!(topic, item_count, %reason, "Web search path failed");
                    None
                }
            }
        } else {
            None
        };

        let used_web_search = searched.is_some();
        info!(topic, item_count, prefer_web_search, used_web_search, "Content path selected");

        let items = match searched {
            Some(items) => items,
            None => self.invent_items(topic, item_count, today).await?,
        };

        Ok(GenerationResult { items, used_web_search })
    }

    async fn search_items(
        &self,
        topic: &str,
        item_count: usize,
        today: NaiveDate,
    ) -> std::result::Result<Vec<NewsItem>, SearchFailure> {
        let request = CompletionRequest::new(prompt::web_search_news(topic, item_count, today));
        let output = with_timeout(
            self.web_search_timeout,
            self.provider.complete_with_web_search(&request),
        )
        .await?;

        // Without citations there is nothing to check the links against.
        let policy = if output.citations.is_empty() {
            UrlPolicy::Required
        } else {
            UrlPolicy::Cited(&output.citations)
        };
        let mut items = parse_news_items(&output.text, policy)?;
        if items.len() < item_count {
            return Err(SearchFailure::Insufficient {
                wanted: item_count,
                valid: items.len(),
            });
        }
        items.truncate(item_count);
        Ok(items)
    }

    /// Plain generation. The model is told to invent items, so no url survives parsing.
    async fn invent_items(
        &self,
        topic: &str,
        item_count: usize,
        today: NaiveDate,
    ) -> Result<Vec<NewsItem>> {
        let request = CompletionRequest::new(prompt::invented_news(topic, item_count, today));
        let text = with_timeout(self.completion_timeout, self.provider.complete(&request))
            .await
            .map_err(|e| {
                error!(topic, error = %e, "Fallback generation failed");
                AppError::ProviderUnavailable(e.to_string())
            })?;

        let mut items = parse_news_items(&text, UrlPolicy::Discard).map_err(|e| {
            error!(topic, error = %e, "Fallback output could not be parsed");
            AppError::ProviderUnavailable(e.to_string())
        })?;

        if items.is_empty() {
            error!(topic, "Fallback produced no usable items");
            return Err(AppError::ProviderUnavailable(
                "fallback generation produced no items".to_string(),
            ));
        }
        if items.len() < item_count {
            warn!(topic, wanted = item_count, got = items.len(), "Fallback returned fewer items than requested");
        }
        items.truncate(item_count);
        Ok(items)
    }
}
