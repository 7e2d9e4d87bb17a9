//! News items and the parser that turns model output into them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::Citation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// Absent for invented items; never present one of those as a verified link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

/// Items for one request plus which path produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub items: Vec<NewsItem>,
    pub used_web_search: bool,
}

/// Whether parsed items must carry a verified source link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UrlPolicy<'a> {
    /// Items without a usable http(s) url are dropped.
    Required,
    /// Like `Required`, and the url must also be one of the cited sources.
    Cited(&'a [Citation]),
    /// Any url the model produced is discarded.
    Discard,
}

#[derive(Debug, thiserror::Error)]
#[error("no JSON item list found in model output: {0}")]
pub struct ParseError(String);

#[derive(Deserialize)]
struct RawNewsItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "link")]
    url: Option<String>,
    #[serde(default, alias = "description")]
    summary: Option<String>,
    #[serde(default, alias = "source")]
    publisher: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    List(Vec<RawNewsItem>),
    Wrapped { items: Vec<RawNewsItem> },
}

/// Parses model output into validated news items.
///
/// Accepts a bare JSON array or an `{"items": [...]}` object, optionally
/// wrapped in markdown fences or surrounded by prose. Items that fail
/// validation are dropped; the call only fails when no item list can be found.
pub fn parse_news_items(raw: &str, policy: UrlPolicy<'_>) -> Result<Vec<NewsItem>, ParseError> {
    let payload = locate_payload(raw)?;

    let items = match payload {
        RawPayload::List(items) => items,
        RawPayload::Wrapped { items } => items,
    };

    let cited: HashSet<String> = match policy {
        UrlPolicy::Cited(citations) => citations
            .iter()
            .filter_map(|c| clean_url(&c.url))
            .map(|url| source_key(&url))
            .collect(),
        UrlPolicy::Required | UrlPolicy::Discard => HashSet::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|raw| validate(raw, policy, &cited))
        .collect())
}

fn locate_payload(raw: &str) -> Result<RawPayload, ParseError> {
    let cleaned = strip_markdown_json(raw);
    if let Ok(payload) = serde_json::from_str::<RawPayload>(&cleaned) {
        return Ok(payload);
    }

    // Prose around the JSON: take the first bracketed value that parses,
    // ignoring whatever follows it (citations, sign-offs).
    for (pos, _) in cleaned.char_indices().filter(|(_, c)| matches!(c, '[' | '{')) {
        let mut values =
            serde_json::Deserializer::from_str(&cleaned[pos..]).into_iter::<RawPayload>();
        if let Some(Ok(payload)) = values.next() {
            return Ok(payload);
        }
    }

    let preview: String = cleaned.chars().take(120).collect();
    Err(ParseError(preview))
}

fn validate(raw: RawNewsItem, policy: UrlPolicy<'_>, cited: &HashSet<String>) -> Option<NewsItem> {
    let title = non_empty(raw.title)?;

    let url = match policy {
        UrlPolicy::Required => Some(clean_url(raw.url.as_deref()?)?),
        UrlPolicy::Cited(_) => {
            let url = clean_url(raw.url.as_deref()?)?;
            if !cited.contains(&source_key(&url)) {
                return None;
            }
            Some(url)
        }
        UrlPolicy::Discard => None,
    };

    Some(NewsItem {
        title,
        url,
        summary: non_empty(raw.summary).unwrap_or_default(),
        publisher: non_empty(raw.publisher),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts absolute http(s) urls only and drops the provider's tracking parameter.
fn clean_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "utm_source")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Some(url.to_string())
}

/// Comparison key for a cleaned url; a trailing slash does not make a different source.
fn source_key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Strip markdown code block wrappers from a JSON response
fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = body.rfind("```") {
            return body[..end].trim().to_string();
        }
    }

    trimmed.to_string()
}
