use taskflow_auth::AuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("task api error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("task api not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Status code for service-rejected requests, None for transport or
    /// local errors.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: r#"{"error":"boom"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            "task api error 500 Internal Server Error: {\"error\":\"boom\"}"
        );
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_auth_error_passes_through() {
        let err = ApiError::from(AuthError::NoSession);
        assert_eq!(err.to_string(), "not signed in");
        assert_eq!(err.status(), None);
    }
}
