use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TomeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Provider rejected request (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TomeError {
    /// Builds a structured [`TomeError::Provider`] from a non-success HTTP
    /// response, preferring the server's `error`/`message` JSON field over
    /// raw body text.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .or_else(|| value.get("message"))
                    .and_then(|field| field.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);

        TomeError::Provider { status, message }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TomeError::Cancelled)
    }
}

impl IntoResponse for TomeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TomeError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            TomeError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            TomeError::Extraction(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            TomeError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            TomeError::Retrieval(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            TomeError::Provider { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            TomeError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            // Cancelled requests were superseded, not failed. They are
            // swallowed before reaching a response in normal flow.
            TomeError::Cancelled => (
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                self.to_string(),
            ),
            TomeError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            TomeError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            TomeError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            TomeError::UrlParse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            TomeError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TomeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_displays_status_and_message() {
        let err = TomeError::Provider {
            status: 503,
            message: "overloaded".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("503"));
        assert!(rendered.contains("overloaded"));
    }

    #[test]
    fn test_cancelled_is_distinguished() {
        assert!(TomeError::Cancelled.is_cancelled());
        assert!(!TomeError::Timeout(30).is_cancelled());
        assert!(!TomeError::Validation("bad".into()).is_cancelled());
    }
}
