use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{Citation, CompletionRequest, LlmProvider, ProviderError, SearchOutput};
use crate::config::Config;

// Shared client so every request reuses pooled connections.
// Per-call deadlines are applied by the callers.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

const WEB_SEARCH_TOOL: &str = "web_search_preview";

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    input: &'a str,
    tools: Vec<Tool<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputContent {
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<Annotation>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Annotation {
    UrlCitation {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// OpenAI-backed provider: chat completions for plain text, the Responses API
/// with the web search tool for grounded output.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ProviderError> {
        let res = CLIENT
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(res)
    }
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(Message { role: "system", content: system });
        }
        messages.push(Message { role: "user", content: &request.user });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature.unwrap_or(self.temperature),
            max_tokens: request.max_tokens,
        };

        tracing::debug!(model = %self.model, prompt_len = request.user.len(), "Sending chat completion");
        let res = self.post("chat/completions", &body).await?;
        let parsed: ChatResponse = res.json().await?;
        extract_chat_text(parsed)
    }

    async fn complete_with_web_search(
        &self,
        request: &CompletionRequest,
    ) -> Result<SearchOutput, ProviderError> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: request.system.as_deref(),
            input: &request.user,
            tools: vec![Tool { kind: WEB_SEARCH_TOOL }],
            temperature: request.temperature.unwrap_or(self.temperature),
            max_output_tokens: request.max_tokens,
        };

        tracing::debug!(model = %self.model, prompt_len = request.user.len(), "Sending web search completion");
        let res = self.post("responses", &body).await?;
        let parsed: ResponsesBody = res.json().await?;
        extract_search_output(parsed)
    }
}

fn extract_chat_text(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::Malformed("chat completion had no content".to_string()))
}

/// Collects the message text and url citations from a Responses API body.
pub(crate) fn extract_search_output(body: ResponsesBody) -> Result<SearchOutput, ProviderError> {
    let mut output = SearchOutput::default();

    for item in body.output {
        let OutputItem::Message { content } = item else {
            continue;
        };
        for part in content {
            let OutputContent::OutputText { text, annotations } = part else {
                continue;
            };
            if !output.text.is_empty() {
                output.text.push('\n');
            }
            output.text.push_str(&text);
            output.citations.extend(annotations.into_iter().filter_map(|a| match a {
                Annotation::UrlCitation { url, title } => Some(Citation { url, title }),
                Annotation::Other => None,
            }));
        }
    }

    if output.text.trim().is_empty() {
        return Err(ProviderError::Malformed(
            "web search response contained no message text".to_string(),
        ));
    }
    Ok(output)
}
