use serde::{Deserialize, Serialize};
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status_code: u16,
    pub timestamp: String,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message,
            status_code: status.as_u16(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
