use thiserror::Error;

/// Error codes returned by the credential service. The service reports them
/// in the `__type` field, sometimes prefixed with a `namespace#` qualifier.
pub mod codes {
    pub const USER_NOT_FOUND: &str = "UserNotFoundException";
    pub const NOT_AUTHORIZED: &str = "NotAuthorizedException";
    pub const USER_NOT_CONFIRMED: &str = "UserNotConfirmedException";
    pub const USERNAME_EXISTS: &str = "UsernameExistsException";
    pub const CODE_MISMATCH: &str = "CodeMismatchException";
    pub const EXPIRED_CODE: &str = "ExpiredCodeException";
    pub const INVALID_PASSWORD: &str = "InvalidPasswordException";
    pub const INVALID_PARAMETER: &str = "InvalidParameterException";
    pub const LIMIT_EXCEEDED: &str = "LimitExceededException";
    pub const TOO_MANY_REQUESTS: &str = "TooManyRequestsException";
    pub const PASSWORD_RESET_REQUIRED: &str = "PasswordResetRequiredException";
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// Structured error from the credential service.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("not signed in")]
    NoSession,

    #[error("credential service not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Provider error code, if this is a service error.
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Service { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }

    /// User-facing wording for well-known provider codes. Unknown codes fall
    /// through to the provider's own message.
    pub fn friendly_message(&self) -> String {
        match self {
            AuthError::Service { code, message } => {
                friendly_for_code(code).map(str::to_string).unwrap_or_else(|| message.clone())
            }
            AuthError::NoSession => "You are not signed in".to_string(),
            AuthError::NotConfigured(detail) => {
                format!("Authentication is not configured: {detail}")
            }
            other => other.to_string(),
        }
    }
}

fn friendly_for_code(code: &str) -> Option<&'static str> {
    let friendly = match code {
        codes::USER_NOT_FOUND => "No account found with this email address",
        codes::NOT_AUTHORIZED => "Invalid credentials or account not verified",
        codes::USER_NOT_CONFIRMED => "Please verify your email address first",
        codes::USERNAME_EXISTS => "An account with this email already exists",
        codes::CODE_MISMATCH => "Invalid verification code. Please try again",
        codes::EXPIRED_CODE => "Verification code has expired. Please request a new one",
        codes::INVALID_PASSWORD => "Password does not meet requirements",
        codes::INVALID_PARAMETER => "Invalid input parameters",
        codes::LIMIT_EXCEEDED => "Too many attempts. Please try again later",
        codes::TOO_MANY_REQUESTS => "Too many requests. Please wait and try again",
        codes::PASSWORD_RESET_REQUIRED => "Password reset required. Please check your email",
        _ => return None,
    };
    Some(friendly)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = AuthError::service("NotAuthorizedException", "Incorrect username or password.");
        assert_eq!(
            err.to_string(),
            "NotAuthorizedException: Incorrect username or password."
        );
    }

    #[test]
    fn test_code_accessors() {
        let err = AuthError::service(codes::EXPIRED_CODE, "Invalid code provided");
        assert_eq!(err.code(), Some("ExpiredCodeException"));
        assert!(err.is_code(codes::EXPIRED_CODE));
        assert!(!err.is_code(codes::CODE_MISMATCH));
        assert_eq!(AuthError::NoSession.code(), None);
    }

    #[test]
    fn test_friendly_message_known_code() {
        let err = AuthError::service(codes::USER_NOT_FOUND, "User does not exist.");
        assert_eq!(
            err.friendly_message(),
            "No account found with this email address"
        );
    }

    #[test]
    fn test_friendly_message_unknown_code_passes_through() {
        let err = AuthError::service("InternalErrorException", "Something broke upstream");
        assert_eq!(err.friendly_message(), "Something broke upstream");
    }

    #[test]
    fn test_friendly_message_no_session() {
        assert_eq!(AuthError::NoSession.friendly_message(), "You are not signed in");
    }
}
