use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - please log in again")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized(truncated),
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// The response body the backend sent with a non-2xx status, if any
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(body)
            | ApiError::Unauthorized(body)
            | ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body) => Some(body.as_str()),
            _ => None,
        }
    }

    /// Pull the human-readable message out of a JSON error body.
    /// The backend uses either `{"error": ...}` or DRF's `{"detail": ...}`.
    pub fn backend_message(&self) -> Option<String> {
        let value: Value = serde_json::from_str(self.body()?).ok()?;
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| match value.get(key)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
    }

    /// Text suitable for a status line: the backend payload when there is
    /// one, otherwise the error description.
    pub fn user_message(&self) -> String {
        match self.body() {
            Some(body) if !body.trim().is_empty() => body.to_string(),
            _ => self.to_string(),
        }
    }
}
