use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::news::NewsItem;
use crate::prompt::StoryBrief;
use crate::writer::{DEFAULT_ARTICLE_STYLE, DEFAULT_ARTICLE_WORDS, DEFAULT_STORY_WORDS, GenerateOptions};

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    #[serde(default)]
    #[validate(nested)]
    pub options: Option<GenerateRequestOptions>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenerateRequestOptions {
    pub system: Option<String>,
    #[validate(range(min = 0.0, max = 2.0, message = "temperature must be between 0 and 2"))]
    pub temperature: Option<f32>,
    #[validate(range(min = 1, message = "max_tokens must be positive"))]
    pub max_tokens: Option<u32>,
}

impl From<GenerateRequestOptions> for GenerateOptions {
    fn from(options: GenerateRequestOptions) -> Self {
        GenerateOptions {
            system: options.system,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
}

/// Blank text is accepted and answered with an empty summary.
#[derive(Debug, Deserialize, Validate)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterRequest {
    #[validate(length(min = 1, message = "topic must not be empty"))]
    pub topic: String,
    #[validate(range(min = 1, message = "itemCount must be at least 1"))]
    pub item_count: usize,
    #[serde(default = "default_true")]
    pub prefer_web_search: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct TitleRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitleResponse {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HookTitleResponse {
    pub hook_title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TitleSummaryRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub existing_summary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescriptionResponse {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OneLinerResponse {
    pub one_liner: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoryRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoryResponse {
    pub story: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MainArticleRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_word_count")]
    #[validate(range(min = 50, max = 2000, message = "word_count must be between 50 and 2000"))]
    pub word_count: u32,
}

fn default_word_count() -> u32 {
    DEFAULT_ARTICLE_WORDS
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub article: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewsImpactRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsImpactResponse {
    pub why_it_matters: String,
    pub action_items: Vec<String>,
    #[serde(rename = "tokens_used")]
    pub tokens_used: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSection {
    pub key: String,
    pub title: String,
    pub description: String,
    pub min_items: u32,
    pub max_items: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionsResponse {
    pub sections: Vec<NewsletterSection>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SectionSearchRequest {
    #[validate(length(min = 1, message = "section_key must not be empty"))]
    pub section_key: String,
    #[validate(length(min = 1, message = "section_title must not be empty"))]
    pub section_title: String,
    #[serde(default)]
    pub section_description: String,
    #[serde(default = "default_section_items")]
    #[validate(range(min = 1, message = "num_items must be at least 1"))]
    pub num_items: usize,
}

fn default_section_items() -> usize {
    3
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionSearchResponse {
    pub section_key: String,
    pub items: Vec<NewsItem>,
    #[serde(rename = "usedWebSearch")]
    pub used_web_search: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchAllSectionsRequest {
    #[validate(nested)]
    pub sections: Vec<SectionSearchRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionWithNews {
    pub section_key: String,
    pub section_title: String,
    pub items: Vec<NewsItem>,
    #[serde(rename = "usedWebSearch")]
    pub used_web_search: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchAllSectionsResponse {
    pub sections: Vec<SectionWithNews>,
    pub total_items: usize,
}

/// A story as the frontend holds it. Fields the writer has no use for are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct NewsItemInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub why_it_matters: Option<String>,
}

impl NewsItemInput {
    pub fn brief(&self) -> StoryBrief<'_> {
        StoryBrief {
            title: &self.title,
            summary: &self.summary,
            why_it_matters: self.why_it_matters.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeatureArticleRequest {
    #[validate(nested)]
    pub main_story: NewsItemInput,
    #[serde(default)]
    #[validate(nested)]
    pub supporting_items: Vec<NewsItemInput>,
    #[serde(default = "default_style")]
    pub style: String,
}

fn default_style() -> String {
    DEFAULT_ARTICLE_STYLE.to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct SectionStoryRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_story_words")]
    #[validate(range(min = 50, max = 2000, message = "word_count must be between 50 and 2000"))]
    pub word_count: u32,
}

fn default_story_words() -> u32 {
    DEFAULT_STORY_WORDS
}

#[derive(Debug, Deserialize, Validate)]
pub struct CatchySummaryRequest {
    #[validate(nested)]
    pub item: NewsItemInput,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
