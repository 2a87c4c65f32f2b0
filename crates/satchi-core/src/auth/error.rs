use thiserror::Error;

use crate::api::ApiError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend refused the credentials; carries its response body
    #[error("Login failed: {0}")]
    Rejected(String),

    #[error("Stored session is no longer valid")]
    InvalidToken,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Classify a failed login call. Non-2xx answers are rejections; anything
    /// else (network, unparseable body) stays an API error.
    pub fn from_login_failure(err: ApiError) -> Self {
        match err {
            ApiError::BadRequest(_) | ApiError::Unauthorized(_) | ApiError::AccessDenied(_) | ApiError::NotFound(_) => {
                let message = err.backend_message().unwrap_or_else(|| "Invalid email or password".to_string());
                AuthError::Rejected(message)
            }
            other => AuthError::Api(other),
        }
    }

    /// Message for the login overlay
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected(message) => message.clone(),
            AuthError::InvalidToken => "Your session expired. Please log in again.".to_string(),
            AuthError::Validation(e) => e.to_string(),
            AuthError::Api(ApiError::NetworkError(_)) => {
                "Cannot reach the server. Check your connection and try again.".to_string()
            }
            AuthError::Api(ApiError::ServerError(_)) => "The server had a problem. Please try again later.".to_string(),
            AuthError::Api(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_login_failure_classification() {
        let err = AuthError::from_login_failure(ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Invalid credentials"}"#,
        ));
        assert!(matches!(&err, AuthError::Rejected(m) if m == "Invalid credentials"));

        let err = AuthError::from_login_failure(ApiError::from_status(StatusCode::UNAUTHORIZED, ""));
        assert_eq!(err.user_message(), "Invalid email or password");

        let err = AuthError::from_login_failure(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
        assert!(matches!(err, AuthError::Api(ApiError::ServerError(_))));
        assert_eq!(err.user_message(), "The server had a problem. Please try again later.");
    }
}
