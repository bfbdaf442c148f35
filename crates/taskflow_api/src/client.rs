//! REST client for the task store. Every call carries a bearer token from
//! the [`TokenProvider`] seam and runs inside a fixed retry loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use taskflow_auth::TokenProvider;
use taskflow_core::{AppConfig, Task, TaskDraft, TaskPatch};
use taskflow_extract::ExtractMode;

use crate::error::{ApiError, Result};
use crate::types::{Engine, ExtractRequest, Extraction, TodoEnvelope, TodosEnvelope};

/// Total attempts per request. Failed attempts sleep one second times the
/// attempt number before the next try, so a request that exhausts the loop
/// waits one then two seconds.
const RETRY_ATTEMPTS: u32 = 3;

pub struct TaskApi {
    base_url: String,
    client: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl TaskApi {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            client: Client::new(),
            tokens,
        }
    }

    /// Requires the task API URL of the app config to be provisioned; the
    /// identity fields are the token provider's concern.
    pub fn from_app_config(config: &AppConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        if config.placeholder_fields().contains(&"apiGatewayUrl") {
            return Err(ApiError::NotConfigured("apiGatewayUrl".to_string()));
        }
        Ok(Self::new(&config.api_gateway_url, tokens))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_todos(&self) -> Result<Vec<Task>> {
        let envelope: TodosEnvelope = self.request(Method::GET, "todos", None).await?;
        tracing::debug!(count = envelope.count, "listed todos");
        Ok(envelope.todos)
    }

    pub async fn create_todo(&self, draft: &TaskDraft) -> Result<Task> {
        let body = serde_json::to_value(draft)?;
        let envelope: TodoEnvelope = self.request(Method::POST, "todos", Some(body)).await?;
        Ok(envelope.todo)
    }

    pub async fn update_todo(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let body = serde_json::to_value(patch)?;
        let envelope: TodoEnvelope = self
            .request(Method::PUT, &format!("todos/{id}"), Some(body))
            .await?;
        Ok(envelope.todo)
    }

    /// Completion toggle, a PUT carrying only the flipped flag.
    pub async fn toggle_todo(&self, id: &str, completed: bool) -> Result<Task> {
        self.update_todo(id, &TaskPatch::new().with_completed(completed))
            .await
    }

    pub async fn delete_todo(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .request(Method::DELETE, &format!("todos/{id}"), None)
            .await?;
        Ok(())
    }

    /// Creates every draft concurrently. Results come back in input order,
    /// one per draft, so a single rejection does not discard the rest.
    pub async fn create_many(&self, drafts: &[TaskDraft]) -> Vec<Result<Task>> {
        join_all(drafts.iter().map(|draft| self.create_todo(draft))).await
    }

    pub async fn extract_remote(&self, text: &str, mode: ExtractMode) -> Result<Vec<Task>> {
        let body = serde_json::to_value(ExtractRequest { text, mode })?;
        let envelope: TodosEnvelope = self.request(Method::POST, "ai/extract", Some(body)).await?;
        Ok(envelope.todos)
    }

    /// Extraction with fallback: the hosted extractor first, the local
    /// keyword engine when it is unreachable or rejects the request.
    pub async fn extract_todos(&self, text: &str, mode: ExtractMode, today: NaiveDate) -> Extraction {
        match self.extract_remote(text, mode).await {
            Ok(tasks) => Extraction {
                tasks,
                engine: Engine::Remote,
            },
            Err(err) => {
                tracing::warn!(error = %err, "remote extraction failed, falling back to keyword engine");
                Extraction {
                    tasks: taskflow_extract::extract(text, mode, today),
                    engine: Engine::Local,
                }
            }
        }
    }

    /// Runs one request through the retry loop. The token is fetched once
    /// up front; a token failure means no session and is not worth
    /// retrying.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let token = self.tokens.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);

        for attempt in 1..RETRY_ATTEMPTS {
            match self.attempt(&method, &url, body.as_ref(), &token).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let delay = Duration::from_secs(u64::from(attempt));
                    tracing::warn!(attempt, error = %err, %url, "request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
        self.attempt(&method, &url, body.as_ref(), &token).await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<T> {
        tracing::debug!(%method, %url, "task api request");
        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_auth::StaticToken;

    fn api(base: &str) -> TaskApi {
        TaskApi::new(base, Arc::new(StaticToken("t".to_string())))
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        assert_eq!(api("https://api.example.com/prod").base_url(), "https://api.example.com/prod/");
        assert_eq!(api("https://api.example.com/prod/").base_url(), "https://api.example.com/prod/");
    }

    #[test]
    fn test_from_app_config_requires_api_url() {
        let config = AppConfig::default();
        let err = TaskApi::from_app_config(&config, Arc::new(StaticToken("t".to_string())))
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotConfigured(field) if field == "apiGatewayUrl"));

        let config = config.with_api_gateway_url("https://api.example.com/prod");
        assert!(TaskApi::from_app_config(&config, Arc::new(StaticToken("t".to_string()))).is_ok());
    }
}
