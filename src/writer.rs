//! Single-call copy generation: free-form prompts, summaries, headlines and
//! articles. Each operation is one plain completion with no fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::llm::{CompletionRequest, LlmProvider, with_timeout};
use crate::prompt::{self, StoryBrief};

pub const DEFAULT_ARTICLE_WORDS: u32 = 300;
pub const DEFAULT_STORY_WORDS: u32 = 450;
pub const DEFAULT_ARTICLE_STYLE: &str = "professional";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsImpact {
    pub why_it_matters: String,
    pub action_items: Vec<String>,
}

impl NewsImpact {
    fn unavailable() -> Self {
        Self {
            why_it_matters: "Unable to generate impact analysis.".to_string(),
            action_items: vec!["Please try again.".to_string()],
        }
    }
}

#[derive(Clone)]
pub struct ContentWriter {
    provider: Arc<dyn LlmProvider>,
    completion_timeout: Duration,
    summary_input_limit: usize,
}

impl ContentWriter {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &Config) -> Self {
        Self {
            provider,
            completion_timeout: config.completion_timeout,
            summary_input_limit: config.summary_input_limit,
        }
    }

    async fn complete(&self, operation: &'static str, request: CompletionRequest) -> Result<String> {
        debug!(operation, provider = self.provider.name(), "Calling provider");
        with_timeout(self.completion_timeout, self.provider.complete(&request))
            .await
            .map_err(|e| {
                error!(operation, error = %e, "Provider call failed");
                AppError::ProviderUnavailable(e.to_string())
            })
    }

    pub async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidRequest("prompt must not be empty".to_string()));
        }

        let mut request = CompletionRequest::new(prompt)
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens);
        request.system = options.system.filter(|s| !s.trim().is_empty());

        let content = self.complete("generate", request).await?;
        Ok(content.trim().to_string())
    }

    /// Summarizes `text`. Blank input short-circuits to an empty summary and
    /// input longer than the configured limit is cut to its leading characters.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let input = truncate_chars(text, self.summary_input_limit);
        if input.len() < text.len() {
            warn!(
                original_chars = text.chars().count(),
                limit = self.summary_input_limit,
                "Summary input truncated"
            );
        }

        let summary = self
            .complete("summarize", CompletionRequest::new(prompt::summarize(input)))
            .await?;
        Ok(prompt::strip_dashes(&summary))
    }

    pub async fn hook_title(&self, title: &str) -> Result<String> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::hook_title_user(title))
            .with_system(prompt::hook_title_system(today));
        let result = self.complete("hook_title", request).await?;
        Ok(prompt::strip_dashes(result.trim().trim_matches('"')))
    }

    pub async fn description(&self, title: &str) -> Result<String> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::description_user(title))
            .with_system(prompt::description_system(today));
        let result = self.complete("description", request).await?;
        Ok(prompt::strip_dashes(&result))
    }

    pub async fn title_summary(&self, title: &str, existing_summary: Option<&str>) -> Result<String> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::title_summary_user(title, existing_summary))
            .with_system(prompt::title_summary_system(today));
        let result = self.complete("title_summary", request).await?;
        Ok(prompt::strip_dashes(&result))
    }

    pub async fn one_liner(&self, title: &str) -> Result<String> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::one_liner_user(title))
            .with_system(prompt::one_liner_system(today));
        let result = self.complete("one_liner", request).await?;
        Ok(prompt::strip_dashes(&result))
    }

    pub async fn story(&self, title: &str, summary: &str, word_count: u32) -> Result<String> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::article_user(title, summary))
            .with_system(prompt::story_system(today, word_count));
        let result = self.complete("story", request).await?;
        Ok(prompt::strip_dashes(&result))
    }

    /// Long-form feature built around `main`, with at most three supporting
    /// stories as context.
    pub async fn feature_article(
        &self,
        main: StoryBrief<'_>,
        supporting: &[StoryBrief<'_>],
        style: &str,
    ) -> Result<String> {
        let style = match style.trim() {
            "" => DEFAULT_ARTICLE_STYLE,
            style => style,
        };
        if supporting.len() > prompt::MAX_SUPPORTING_ITEMS {
            debug!(supplied = supporting.len(), "Extra supporting stories ignored");
        }

        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::feature_article_user(main, supporting))
            .with_system(prompt::feature_article_system(today, style));
        let result = self.complete("feature_article", request).await?;
        Ok(prompt::strip_dashes(&result))
    }

    /// Short hook-style summary of a story. When the provider is down the
    /// story's own summary is returned if it has one.
    pub async fn catchy_summary(&self, title: &str, summary: &str) -> Result<String> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::catchy_summary_user(title, summary))
            .with_system(prompt::catchy_summary_system(today));

        match self.complete("catchy_summary", request).await {
            Ok(result) => Ok(prompt::strip_dashes(&result)),
            Err(e) if !summary.trim().is_empty() => {
                warn!(title, error = %e, "Keeping the original summary");
                Ok(summary.trim().to_string())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn main_article(&self, title: &str, summary: &str, word_count: u32) -> Result<String> {
        let (min_words, max_words) = word_range(word_count);
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::article_user(title, summary))
            .with_system(prompt::main_article_system(today, min_words, max_words));
        let result = self.complete("main_article", request).await?;
        Ok(prompt::strip_dashes(&result))
    }

    /// Business impact analysis. Output the model fails to format as JSON
    /// degrades to a placeholder analysis instead of an error.
    pub async fn news_impact(
        &self,
        title: &str,
        description: &str,
        source: &str,
        category: &str,
    ) -> Result<NewsImpact> {
        let today = Local::now().date_naive();
        let request = CompletionRequest::new(prompt::news_impact_user(title, description, source, category))
            .with_system(prompt::news_impact_system(today));
        let raw = self.complete("news_impact", request).await?;

        Ok(parse_news_impact(&raw).unwrap_or_else(|| {
            warn!(title, "Impact analysis was not valid JSON");
            NewsImpact::unavailable()
        }))
    }
}

fn parse_news_impact(raw: &str) -> Option<NewsImpact> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawImpact {
        #[serde(default)]
        why_it_matters: String,
        #[serde(default)]
        action_items: Vec<String>,
    }

    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if start > end {
        return None;
    }
    let parsed: RawImpact = serde_json::from_str(&trimmed[start..=end]).ok()?;
    Some(NewsImpact {
        why_it_matters: prompt::strip_dashes(&parsed.why_it_matters),
        action_items: parsed.action_items.iter().map(|a| prompt::strip_dashes(a)).collect(),
    })
}

/// Target range around `word_count`, never below 50 words.
pub fn word_range(word_count: u32) -> (u32, u32) {
    (word_count.saturating_sub(50).max(50), word_count.saturating_add(50))
}

/// Leading `limit` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
