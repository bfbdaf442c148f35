//! Credential-service client. The service speaks `x-amz-json-1.1`: every
//! operation is a POST to one endpoint, selected by the `X-Amz-Target`
//! header.

use std::collections::HashMap;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use taskflow_core::AppConfig;

use crate::error::{AuthError, Result};
use crate::types::{
    AccessTokenRequest, Attribute, AuthTokens, ConfirmSignUpRequest, GetUserResponse,
    InitiateAuthRequest, InitiateAuthResponse, ResendConfirmationCodeRequest,
    RespondToChallengeRequest, ServiceErrorBody, SignInOutcome, SignUpOutcome, SignUpRequest,
    SignUpResponse, UserProfile,
};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const NEW_PASSWORD_CHALLENGE: &str = "NEW_PASSWORD_REQUIRED";

/// Connection settings for the user pool.
#[derive(Debug, Clone)]
pub struct UserPoolConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    /// Overrides the regional endpoint; used by tests.
    pub endpoint: Option<String>,
}

impl UserPoolConfig {
    pub fn new(
        region: impl Into<String>,
        user_pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut url = endpoint.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.endpoint = Some(url);
        self
    }

    /// Requires the identity fields of the app config to be provisioned;
    /// the task API URL is not needed here.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let missing: Vec<&str> = config
            .placeholder_fields()
            .into_iter()
            .filter(|field| *field != "apiGatewayUrl")
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::NotConfigured(missing.join(", ")));
        }
        Ok(Self::new(
            &config.region,
            &config.user_pool_id,
            &config.user_pool_client_id,
        ))
    }

    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }
}

/// Thin client over the credential service; one method per operation the
/// app uses, nothing more.
#[derive(Debug, Clone)]
pub struct UserPoolClient {
    config: UserPoolConfig,
    client: Client,
}

impl UserPoolClient {
    pub fn new(config: UserPoolConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(UserPoolConfig::from_app_config(config)?))
    }

    pub fn config(&self) -> &UserPoolConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(&self, op: &str, body: &impl Serialize) -> Result<T> {
        let url = self.config.endpoint();
        tracing::debug!(op, "credential service request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{op}"))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn sign_up(&self, username: &str, password: &str) -> Result<SignUpOutcome> {
        let request = SignUpRequest {
            client_id: &self.config.client_id,
            username,
            password,
            user_attributes: vec![Attribute {
                name: "email",
                value: username,
            }],
        };
        let response: SignUpResponse = self.call("SignUp", &request).await?;
        Ok(SignUpOutcome {
            user_sub: response.user_sub,
            confirmed: response.user_confirmed,
        })
    }

    pub async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<()> {
        let request = ConfirmSignUpRequest {
            client_id: &self.config.client_id,
            username,
            confirmation_code: code,
        };
        let _: serde_json::Value = self.call("ConfirmSignUp", &request).await?;
        Ok(())
    }

    pub async fn resend_confirmation_code(&self, username: &str) -> Result<()> {
        let request = ResendConfirmationCodeRequest {
            client_id: &self.config.client_id,
            username,
        };
        let _: serde_json::Value = self.call("ResendConfirmationCode", &request).await?;
        Ok(())
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignInOutcome> {
        let mut params = HashMap::new();
        params.insert("USERNAME", username);
        params.insert("PASSWORD", password);
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.config.client_id,
            auth_parameters: params,
        };
        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;
        outcome_from(response)
    }

    pub async fn respond_new_password(
        &self,
        username: &str,
        new_password: &str,
        session: &str,
    ) -> Result<AuthTokens> {
        let mut responses = HashMap::new();
        responses.insert("USERNAME", username);
        responses.insert("NEW_PASSWORD", new_password);
        let request = RespondToChallengeRequest {
            challenge_name: NEW_PASSWORD_CHALLENGE,
            client_id: &self.config.client_id,
            session,
            challenge_responses: responses,
        };
        let response: InitiateAuthResponse = self.call("RespondToAuthChallenge", &request).await?;
        match outcome_from(response)? {
            SignInOutcome::Tokens(tokens) => Ok(tokens),
            SignInOutcome::NewPasswordRequired { .. } => Err(AuthError::service(
                NEW_PASSWORD_CHALLENGE,
                "service repeated the new-password challenge",
            )),
        }
    }

    /// Trades a refresh token for fresh id/access tokens. The response omits
    /// the refresh token itself.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens> {
        let mut params = HashMap::new();
        params.insert("REFRESH_TOKEN", refresh_token);
        let request = InitiateAuthRequest {
            auth_flow: "REFRESH_TOKEN_AUTH",
            client_id: &self.config.client_id,
            auth_parameters: params,
        };
        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;
        match outcome_from(response)? {
            SignInOutcome::Tokens(tokens) => Ok(tokens),
            SignInOutcome::NewPasswordRequired { .. } => Err(AuthError::service(
                NEW_PASSWORD_CHALLENGE,
                "refresh flow cannot answer challenges",
            )),
        }
    }

    pub async fn global_sign_out(&self, access_token: &str) -> Result<()> {
        let request = AccessTokenRequest { access_token };
        let _: serde_json::Value = self.call("GlobalSignOut", &request).await?;
        Ok(())
    }

    pub async fn get_user(&self, access_token: &str) -> Result<UserProfile> {
        let request = AccessTokenRequest { access_token };
        let response: GetUserResponse = self.call("GetUser", &request).await?;
        let email = response
            .user_attributes
            .into_iter()
            .find(|attr| attr.name == "email")
            .map(|attr| attr.value);
        Ok(UserProfile {
            username: response.username,
            email,
        })
    }
}

fn outcome_from(response: InitiateAuthResponse) -> Result<SignInOutcome> {
    if let Some(result) = response.authentication_result {
        return Ok(SignInOutcome::Tokens(result.into()));
    }
    match (response.challenge_name.as_deref(), response.session) {
        (Some(NEW_PASSWORD_CHALLENGE), Some(session)) => {
            Ok(SignInOutcome::NewPasswordRequired { session })
        }
        (Some(challenge), _) => Err(AuthError::service(
            challenge,
            format!("unsupported challenge: {challenge}"),
        )),
        (None, _) => Err(AuthError::service(
            "UnknownException",
            "response carried neither tokens nor a challenge",
        )),
    }
}

async fn service_error(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ServiceErrorBody>(&text) {
        Ok(body) => {
            let code = body
                .type_
                .as_deref()
                .map(strip_namespace)
                .unwrap_or("UnknownException")
                .to_string();
            let message = body
                .message
                .unwrap_or_else(|| format!("service returned {status}"));
            AuthError::Service { code, message }
        }
        Err(_) => AuthError::Service {
            code: "UnknownException".to_string(),
            message: format!("service returned {status}: {text}"),
        },
    }
}

/// Error codes may arrive qualified, e.g. `com.amazonaws.x#CodeMismatchException`.
fn strip_namespace(code: &str) -> &str {
    code.rsplit('#').next().unwrap_or(code)
}
