use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CoreError::Config("apiUrl is still a placeholder".to_string());
        assert_eq!(
            err.to_string(),
            "config error: apiUrl is still a placeholder"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = CoreError::Parse("unknown category: chores".to_string());
        assert_eq!(err.to_string(), "parse error: unknown category: chores");
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.json missing");
        let err = CoreError::from(io_err);
        assert!(err.to_string().contains("config.json missing"));
    }

    #[test]
    fn test_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json");
        let err = CoreError::from(json_err.unwrap_err());
        assert!(err.to_string().contains("key must be a string"));
    }
}
