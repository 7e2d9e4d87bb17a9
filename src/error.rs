use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

/// Message returned to clients when neither generation path produced content.
pub const PROVIDER_UNAVAILABLE_MESSAGE: &str =
    "Content generation is temporarily unavailable. Please try again shortly.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::InvalidRequest(msg) => msg,
            // Provider details stay in the logs.
            AppError::ProviderUnavailable(_) => PROVIDER_UNAVAILABLE_MESSAGE.to_string(),
            AppError::ConfigError(msg) => msg,
        };

        response::error(status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
