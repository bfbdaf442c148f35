//! Cached session tokens, kept in a small JSON file under the user config
//! directory so sign-in survives across invocations.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::client::UserPoolClient;
use crate::error::{AuthError, Result};
use crate::types::{AuthTokens, UserProfile};

/// Tokens are treated as expired this many seconds early so a request does
/// not leave with a token that dies in flight.
const EXPIRY_SKEW_SECS: i64 = 60;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub username: String,
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn from_tokens(username: impl Into<String>, tokens: AuthTokens) -> Self {
        Self::from_tokens_at(username, tokens, Utc::now())
    }

    pub fn from_tokens_at(
        username: impl Into<String>,
        tokens: AuthTokens,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            id_token: tokens.id_token,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            issued_at: now,
            expires_at: now + Duration::seconds(tokens.expires_in as i64),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }

    /// Token the task API expects in the Authorization header.
    pub fn bearer_token(&self) -> &str {
        &self.id_token
    }

    /// Applies a refresh result. Refresh responses omit the refresh token,
    /// so the stored one is retained.
    pub fn apply_refresh(&mut self, tokens: AuthTokens, now: DateTime<Utc>) {
        self.id_token = tokens.id_token;
        self.access_token = tokens.access_token;
        if tokens.refresh_token.is_some() {
            self.refresh_token = tokens.refresh_token;
        }
        self.issued_at = now;
        self.expires_at = now + Duration::seconds(tokens.expires_in as i64);
    }
}

/// File-backed session cache plus the two session-level operations the app
/// exposes: current session (with transparent refresh) and current user.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        let dir = taskflow_core::config::config_dir()
            .ok_or_else(|| AuthError::NotConfigured("home directory not found".to_string()))?;
        Ok(Self::new(dir.join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// Loads the cached session. A missing or unreadable file reads as "no
    /// session" rather than an error; a corrupt cache should never wedge
    /// the app.
    pub fn load(&self) -> Result<Option<AuthSession>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding corrupt session cache");
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// The `currentSession` operation: cached tokens while they are fresh,
    /// otherwise a refresh that is persisted back. A refresh the service
    /// rejects clears the cache, since those tokens will never work again.
    pub async fn current_session(&self, client: &UserPoolClient) -> Result<AuthSession> {
        let Some(mut session) = self.load()? else {
            return Err(AuthError::NoSession);
        };
        if session.is_valid_at(Utc::now()) {
            return Ok(session);
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            self.clear()?;
            return Err(AuthError::NoSession);
        };
        match client.refresh(&refresh_token).await {
            Ok(tokens) => {
                session.apply_refresh(tokens, Utc::now());
                self.save(&session)?;
                Ok(session)
            }
            Err(err) if err.code().is_some() => {
                tracing::warn!(code = ?err.code(), "refresh rejected, clearing session");
                self.clear()?;
                Err(AuthError::NoSession)
            }
            Err(err) => Err(err),
        }
    }

    /// The `currentAuthenticatedUser` operation.
    pub async fn current_user(&self, client: &UserPoolClient) -> Result<UserProfile> {
        let session = self.current_session(client).await?;
        client.get_user(&session.access_token).await
    }

    /// Global sign-out plus local cache removal. A service-side failure is
    /// logged but does not keep the local session alive.
    pub async fn sign_out(&self, client: &UserPoolClient) -> Result<()> {
        if let Some(session) = self.load()? {
            if let Err(err) = client.global_sign_out(&session.access_token).await {
                tracing::warn!(error = %err, "global sign-out failed, clearing local session anyway");
            }
        }
        self.clear()
    }
}

/// Seam between the task REST client and auth: anything that can produce a
/// bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

/// Production provider: cached session, refreshed through the pool client
/// when stale.
pub struct SessionTokenProvider {
    client: UserPoolClient,
    store: SessionStore,
}

impl SessionTokenProvider {
    pub fn new(client: UserPoolClient, store: SessionStore) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl TokenProvider for SessionTokenProvider {
    async fn bearer_token(&self) -> Result<String> {
        let session = self.store.current_session(&self.client).await?;
        Ok(session.bearer_token().to_string())
    }
}

/// Fixed-token provider for tests and scripted use.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> AuthTokens {
        AuthTokens {
            id_token: "id.jwt".to_string(),
            access_token: "access.jwt".to_string(),
            refresh_token: Some("refresh.jwt".to_string()),
            expires_in: 3600,
        }
    }

    #[test]
    fn test_session_from_tokens() {
        let now = Utc::now();
        let session = AuthSession::from_tokens_at("alice@example.com", tokens(), now);
        assert_eq!(session.username, "alice@example.com");
        assert_eq!(session.bearer_token(), "id.jwt");
        assert_eq!(session.expires_at, now + Duration::seconds(3600));
    }

    #[test]
    fn test_session_validity_includes_skew() {
        let now = Utc::now();
        let session = AuthSession::from_tokens_at("alice", tokens(), now);
        assert!(session.is_valid_at(now));
        // 59 seconds of margin left: inside the skew window, counts as stale
        assert!(!session.is_valid_at(now + Duration::seconds(3541)));
        assert!(!session.is_valid_at(now + Duration::seconds(7200)));
    }

    #[test]
    fn test_apply_refresh_keeps_refresh_token() {
        let now = Utc::now();
        let mut session = AuthSession::from_tokens_at("alice", tokens(), now);
        let refreshed = AuthTokens {
            id_token: "id2.jwt".to_string(),
            access_token: "access2.jwt".to_string(),
            refresh_token: None,
            expires_in: 3600,
        };
        session.apply_refresh(refreshed, now + Duration::seconds(100));
        assert_eq!(session.id_token, "id2.jwt");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh.jwt"));
        assert_eq!(session.expires_at, now + Duration::seconds(3700));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_none());

        let session = AuthSession::from_tokens("alice", tokens());
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_store_discards_corrupt_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = SessionStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_static_token_provider() {
        let provider = StaticToken("fixed.jwt".to_string());
        assert_eq!(provider.bearer_token().await.unwrap(), "fixed.jwt");
    }
}
