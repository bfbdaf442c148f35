use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Value the deploy pipeline leaves in config.json before provisioning.
pub const PLACEHOLDER: &str = "loading...";

pub const CONFIG_PATH_ENV: &str = "TASKFLOW_CONFIG";
pub const REGION_ENV: &str = "TASKFLOW_REGION";
pub const USER_POOL_ID_ENV: &str = "TASKFLOW_USER_POOL_ID";
pub const USER_POOL_CLIENT_ID_ENV: &str = "TASKFLOW_USER_POOL_CLIENT_ID";
pub const API_URL_ENV: &str = "TASKFLOW_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub region: String,
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub api_gateway_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: PLACEHOLDER.to_string(),
            user_pool_id: PLACEHOLDER.to_string(),
            user_pool_client_id: PLACEHOLDER.to_string(),
            api_gateway_url: PLACEHOLDER.to_string(),
        }
    }
}

fn unset(value: &str) -> bool {
    value.is_empty() || value == PLACEHOLDER
}

impl AppConfig {
    pub fn new(
        region: impl Into<String>,
        user_pool_id: impl Into<String>,
        user_pool_client_id: impl Into<String>,
        api_gateway_url: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            user_pool_id: user_pool_id.into(),
            user_pool_client_id: user_pool_client_id.into(),
            api_gateway_url: api_gateway_url.into(),
        }
    }

    pub fn with_api_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.api_gateway_url = url.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Loads config from the first readable candidate file, then layers env
    /// overrides on top. No file plus no env overrides means the stack was
    /// never provisioned, which is an error worth stopping on.
    pub fn load() -> Result<Self> {
        let mut from_file = None;
        for path in candidate_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(loaded) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    from_file = Some(loaded);
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable config file"
                    );
                }
            }
        }

        let found = from_file.is_some();
        let config = from_file
            .unwrap_or_default()
            .apply_env(|key| std::env::var(key).ok());
        if !found && !config.is_provisioned() {
            return Err(CoreError::Config(format!(
                "no config.json found (searched ${CONFIG_PATH_ENV}, ./config.json, \
                 ~/.taskflow/config.json); deploy the stack or set TASKFLOW_* variables"
            )));
        }
        Ok(config)
    }

    /// Overrides individual fields from the environment. The lookup is
    /// injected so tests do not mutate process env.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(region) = lookup(REGION_ENV) {
            self.region = region;
        }
        if let Some(pool) = lookup(USER_POOL_ID_ENV) {
            self.user_pool_id = pool;
        }
        if let Some(client) = lookup(USER_POOL_CLIENT_ID_ENV) {
            self.user_pool_client_id = client;
        }
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_gateway_url = url;
        }
        self
    }

    /// Wire names of fields that are empty or still hold the placeholder.
    pub fn placeholder_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if unset(&self.region) {
            fields.push("region");
        }
        if unset(&self.user_pool_id) {
            fields.push("userPoolId");
        }
        if unset(&self.user_pool_client_id) {
            fields.push("userPoolClientId");
        }
        if unset(&self.api_gateway_url) {
            fields.push("apiGatewayUrl");
        }
        fields
    }

    pub fn is_provisioned(&self) -> bool {
        self.placeholder_fields().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.placeholder_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Config(format!(
                "deployment incomplete, unprovisioned fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Directory for user-level state (config, cached session).
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".taskflow"))
}

/// Files [AppConfig::load] checks, in order: the `$TASKFLOW_CONFIG`
/// override, `./config.json`, then `~/.taskflow/config.json`.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        paths.push(PathBuf::from(explicit));
    }
    paths.push(PathBuf::from("config.json"));
    if let Some(dir) = config_dir() {
        paths.push(dir.join("config.json"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROVISIONED: &str = r#"{
        "region": "eu-west-1",
        "userPoolId": "eu-west-1_AbCdEfGhI",
        "userPoolClientId": "4example1client2id3",
        "apiGatewayUrl": "https://api.example.com/prod"
    }"#;

    #[test]
    fn test_default_is_all_placeholders() {
        let config = AppConfig::default();
        assert_eq!(config.region, PLACEHOLDER);
        assert!(!config.is_provisioned());
        assert_eq!(
            config.placeholder_fields(),
            vec!["region", "userPoolId", "userPoolClientId", "apiGatewayUrl"]
        );
    }

    #[test]
    fn test_from_json_camel_case_keys() {
        let config = AppConfig::from_json(PROVISIONED).unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.user_pool_id, "eu-west-1_AbCdEfGhI");
        assert_eq!(config.user_pool_client_id, "4example1client2id3");
        assert_eq!(config.api_gateway_url, "https://api.example.com/prod");
        assert!(config.is_provisioned());
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let raw = r#"{
            "region": "eu-west-1",
            "userPoolId": "pool",
            "userPoolClientId": "client",
            "apiGatewayUrl": "https://api.example.com",
            "deployedBy": "terraform"
        }"#;
        let config = AppConfig::from_json(raw).unwrap();
        assert!(config.is_provisioned());
    }

    #[test]
    fn test_from_json_requires_camel_case_keys() {
        let raw = r#"{"region":"eu-west-1","user_pool_id":"x","user_pool_client_id":"y","api_gateway_url":"z"}"#;
        assert!(AppConfig::from_json(raw).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROVISIONED.as_bytes()).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(AppConfig::from_file("/nonexistent/config.json").is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let config = AppConfig::default().apply_env(|key| match key {
            API_URL_ENV => Some("https://override.example.com".to_string()),
            REGION_ENV => Some("us-east-2".to_string()),
            _ => None,
        });
        assert_eq!(config.api_gateway_url, "https://override.example.com");
        assert_eq!(config.region, "us-east-2");
        assert_eq!(config.user_pool_id, PLACEHOLDER);
    }

    #[test]
    fn test_empty_field_counts_as_unset() {
        let config = AppConfig::new("eu-west-1", "", "client", "https://api.example.com");
        assert_eq!(config.placeholder_fields(), vec!["userPoolId"]);
    }

    #[test]
    fn test_partial_placeholder_detection() {
        let config = AppConfig::default().with_api_gateway_url("https://api.example.com");
        assert!(!config.is_provisioned());
        assert_eq!(
            config.placeholder_fields(),
            vec!["region", "userPoolId", "userPoolClientId"]
        );
    }

    #[test]
    fn test_validate_reports_wire_field_names() {
        let err = AppConfig::default()
            .with_region("eu-west-1")
            .validate()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("userPoolId"));
        assert!(msg.contains("apiGatewayUrl"));
        assert!(!msg.contains(" region"));
    }

    #[test]
    fn test_serializes_back_to_camel_case() {
        let config = AppConfig::from_json(PROVISIONED).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""userPoolClientId":"4example1client2id3""#));
        assert!(json.contains(r#""apiGatewayUrl":"https://api.example.com/prod""#));
        assert!(!json.contains("user_pool_client_id"));
    }
}
