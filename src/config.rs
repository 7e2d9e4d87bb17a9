use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::error::{AppError, Result};

/// Longest text, in characters, forwarded to the provider for summarization.
/// Anything past this is cut off before the call.
pub const MAX_SUMMARY_INPUT_CHARS: usize = 12_000;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub web_search_timeout: Duration,
    pub completion_timeout: Duration,
    pub max_item_count: usize,
    pub summary_input_limit: usize,
    pub cors_origins: Vec<HeaderValue>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub environment: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let openai_api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| AppError::ConfigError("OPENAI_API_KEY must be set".to_string()))?;

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", get("PORT"), 8000u16)?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let temperature = parse_or("OPENAI_TEMPERATURE", get("OPENAI_TEMPERATURE"), 0.7f32)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::ConfigError(format!(
                "OPENAI_TEMPERATURE must be between 0 and 2, got {}",
                temperature
            )));
        }

        let web_search_secs = parse_or("WEB_SEARCH_TIMEOUT_SECS", get("WEB_SEARCH_TIMEOUT_SECS"), 30u64)?;
        let completion_secs = parse_or("COMPLETION_TIMEOUT_SECS", get("COMPLETION_TIMEOUT_SECS"), 15u64)?;

        let max_item_count = parse_or("MAX_ITEM_COUNT", get("MAX_ITEM_COUNT"), 10usize)?;
        if max_item_count == 0 {
            return Err(AppError::ConfigError("MAX_ITEM_COUNT must be at least 1".to_string()));
        }

        let summary_input_limit = parse_or(
            "SUMMARY_INPUT_LIMIT",
            get("SUMMARY_INPUT_LIMIT"),
            MAX_SUMMARY_INPUT_CHARS,
        )?;

        let cors_origins = parse_origins(
            &get("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        )?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            web_search_timeout: Duration::from_secs(web_search_secs),
            completion_timeout: Duration::from_secs(completion_secs),
            max_item_count,
            summary_input_limit,
            cors_origins,
            supabase_url: get("SUPABASE_URL"),
            supabase_key: get("SUPABASE_KEY"),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("web_search_timeout", &self.web_search_timeout)
            .field("completion_timeout", &self.completion_timeout)
            .field("max_item_count", &self.max_item_count)
            .field("summary_input_limit", &self.summary_input_limit)
            .field("cors_origins", &self.cors_origins)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &self.supabase_key.as_ref().map(|_| "<redacted>"))
            .field("environment", &self.environment)
            .finish()
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| AppError::ConfigError(format!("Invalid CORS origin {:?}: {}", origin, e)))
        })
        .collect()
}
