//! Sign-in flow state machine. States and transitions mirror the provider's
//! error codes; the flow itself stays pure so it can be tested without a
//! network, with `submit_*` drivers layered on top for callers that want the
//! whole round trip.

use crate::client::UserPoolClient;
use crate::error::{AuthError, Result, codes};
use crate::types::{AuthTokens, SignInOutcome, SignUpOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
    Verify,
    NewPassword,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign in",
            AuthMode::SignUp => "Create account",
            AuthMode::Verify => "Verify email",
            AuthMode::NewPassword => "Set new password",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FlowMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

/// Follow-up the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    None,
    /// Request a fresh verification code for the pending user.
    Resend,
    /// Sign in with the retained credentials (after a successful verify).
    SignIn { username: String, password: String },
}

#[derive(Debug, Default)]
pub struct AuthFlow {
    mode: AuthMode,
    pending_username: Option<String>,
    pending_password: Option<String>,
    challenge_session: Option<String>,
    message: Option<FlowMessage>,
}

impl AuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn message(&self) -> Option<&FlowMessage> {
        self.message.as_ref()
    }

    pub fn pending_username(&self) -> Option<&str> {
        self.pending_username.as_deref()
    }

    pub fn challenge_session(&self) -> Option<&str> {
        self.challenge_session.as_deref()
    }

    /// Manual mode switches from the UI footer links.
    pub fn switch_to(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.message = None;
    }

    pub fn note_sign_in(
        &mut self,
        username: &str,
        password: &str,
        result: &Result<SignInOutcome>,
    ) -> FlowAction {
        self.pending_username = Some(username.to_string());
        self.pending_password = Some(password.to_string());
        match result {
            Ok(SignInOutcome::Tokens(_)) => {
                self.message = None;
                FlowAction::None
            }
            Ok(SignInOutcome::NewPasswordRequired { session }) => {
                self.mode = AuthMode::NewPassword;
                self.challenge_session = Some(session.clone());
                self.message = Some(FlowMessage::info("Please set a new password to continue"));
                FlowAction::None
            }
            Err(err) if err.is_code(codes::USER_NOT_CONFIRMED) => {
                self.mode = AuthMode::Verify;
                self.message = Some(FlowMessage::error(
                    "Please verify your email first. We'll send you a new verification code",
                ));
                FlowAction::Resend
            }
            Err(err) if err.is_code(codes::PASSWORD_RESET_REQUIRED) => {
                self.mode = AuthMode::NewPassword;
                self.message = Some(FlowMessage::error(err.friendly_message()));
                FlowAction::None
            }
            Err(err) => {
                self.message = Some(FlowMessage::error(err.friendly_message()));
                FlowAction::None
            }
        }
    }

    pub fn note_sign_up(
        &mut self,
        username: &str,
        password: &str,
        result: &Result<SignUpOutcome>,
    ) -> FlowAction {
        match result {
            Ok(_) => {
                self.pending_username = Some(username.to_string());
                self.pending_password = Some(password.to_string());
                self.mode = AuthMode::Verify;
                self.message = Some(FlowMessage::info(
                    "Account created! Please check your email for the verification code",
                ));
            }
            Err(err) if err.is_code(codes::USERNAME_EXISTS) => {
                self.mode = AuthMode::SignIn;
                self.message = Some(FlowMessage::error(
                    "An account with this email already exists. Please sign in instead",
                ));
            }
            Err(err) => {
                self.message = Some(FlowMessage::error(err.friendly_message()));
            }
        }
        FlowAction::None
    }

    pub fn note_verify(&mut self, result: &Result<()>) -> FlowAction {
        match result {
            Ok(()) => {
                self.mode = AuthMode::SignIn;
                match (self.pending_username.clone(), self.pending_password.clone()) {
                    (Some(username), Some(password)) => {
                        self.message = Some(FlowMessage::info("Email verified! Signing you in"));
                        FlowAction::SignIn { username, password }
                    }
                    _ => {
                        self.message = Some(FlowMessage::info(
                            "Email verified! Please sign in with your credentials",
                        ));
                        FlowAction::None
                    }
                }
            }
            Err(err) if err.is_code(codes::EXPIRED_CODE) => {
                self.message = Some(FlowMessage::error(
                    "The verification code has expired. We'll send you a new one",
                ));
                FlowAction::Resend
            }
            Err(err) => {
                self.message = Some(FlowMessage::error(err.friendly_message()));
                FlowAction::None
            }
        }
    }

    pub fn note_resend(&mut self, result: &Result<()>) {
        match result {
            Ok(()) => {
                self.message = Some(FlowMessage::info(
                    "New verification code sent! Please check your email",
                ));
            }
            Err(err) => {
                self.message = Some(FlowMessage::error(err.friendly_message()));
            }
        }
    }

    pub fn note_new_password(&mut self, result: &Result<AuthTokens>) {
        match result {
            Ok(_) => {
                self.challenge_session = None;
                self.message = None;
            }
            Err(err) => {
                self.message = Some(FlowMessage::error(err.friendly_message()));
            }
        }
    }

    /// Runs sign-in and every follow-up transition demands. `Some(tokens)`
    /// means fully signed in.
    pub async fn submit_sign_in(
        &mut self,
        client: &UserPoolClient,
        username: &str,
        password: &str,
    ) -> Option<AuthTokens> {
        let result = client.sign_in(username, password).await;
        let action = self.note_sign_in(username, password, &result);
        self.run_action(client, action).await;
        match result {
            Ok(SignInOutcome::Tokens(tokens)) => Some(tokens),
            _ => None,
        }
    }

    pub async fn submit_sign_up(
        &mut self,
        client: &UserPoolClient,
        username: &str,
        password: &str,
    ) -> Option<AuthTokens> {
        let result = client.sign_up(username, password).await;
        let action = self.note_sign_up(username, password, &result);
        self.run_action(client, action).await
    }

    /// Confirms the pending user's code. On success the flow signs in with
    /// the retained credentials; an expired code triggers an automatic
    /// resend.
    pub async fn submit_verify(
        &mut self,
        client: &UserPoolClient,
        code: &str,
    ) -> Option<AuthTokens> {
        let Some(username) = self.pending_username.clone() else {
            self.message = Some(FlowMessage::error("No pending account to verify"));
            return None;
        };
        let result = client.confirm_sign_up(&username, code).await;
        let action = self.note_verify(&result);
        self.run_action(client, action).await
    }

    pub async fn submit_resend(&mut self, client: &UserPoolClient) {
        let Some(username) = self.pending_username.clone() else {
            self.message = Some(FlowMessage::error("No pending account to verify"));
            return;
        };
        let result = client.resend_confirmation_code(&username).await;
        self.note_resend(&result);
    }

    pub async fn submit_new_password(
        &mut self,
        client: &UserPoolClient,
        new_password: &str,
    ) -> Option<AuthTokens> {
        let Some(username) = self.pending_username.clone() else {
            self.message = Some(FlowMessage::error("Sign in first"));
            return None;
        };
        let Some(session) = self.challenge_session.clone() else {
            self.message = Some(FlowMessage::error(
                AuthError::NoSession.friendly_message(),
            ));
            return None;
        };
        let result = client
            .respond_new_password(&username, new_password, &session)
            .await;
        self.note_new_password(&result);
        result.ok()
    }

    async fn run_action(&mut self, client: &UserPoolClient, action: FlowAction) -> Option<AuthTokens> {
        match action {
            FlowAction::None => None,
            FlowAction::Resend => {
                let Some(username) = self.pending_username.clone() else {
                    return None;
                };
                let result = client.resend_confirmation_code(&username).await;
                self.note_resend(&result);
                None
            }
            FlowAction::SignIn { username, password } => {
                match client.sign_in(&username, &password).await {
                    Ok(SignInOutcome::Tokens(tokens)) => {
                        self.message = None;
                        Some(tokens)
                    }
                    Ok(SignInOutcome::NewPasswordRequired { session }) => {
                        self.mode = AuthMode::NewPassword;
                        self.challenge_session = Some(session);
                        self.message =
                            Some(FlowMessage::info("Please set a new password to continue"));
                        None
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "auto sign-in after verification failed");
                        self.mode = AuthMode::SignIn;
                        self.message = Some(FlowMessage::info(
                            "Email verified! Please sign in with your credentials",
                        ));
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_err<T>(code: &str) -> Result<T> {
        Err(AuthError::service(code, "from service"))
    }

    fn tokens() -> AuthTokens {
        AuthTokens {
            id_token: "id.jwt".to_string(),
            access_token: "access.jwt".to_string(),
            refresh_token: Some("refresh.jwt".to_string()),
            expires_in: 3600,
        }
    }

    #[test]
    fn test_starts_in_sign_in() {
        let flow = AuthFlow::new();
        assert_eq!(flow.mode(), AuthMode::SignIn);
        assert!(flow.message().is_none());
    }

    #[test]
    fn test_sign_in_unconfirmed_moves_to_verify_and_resends() {
        let mut flow = AuthFlow::new();
        let action = flow.note_sign_in(
            "alice@example.com",
            "pw",
            &service_err(codes::USER_NOT_CONFIRMED),
        );
        assert_eq!(flow.mode(), AuthMode::Verify);
        assert_eq!(flow.pending_username(), Some("alice@example.com"));
        assert_eq!(action, FlowAction::Resend);
    }

    #[test]
    fn test_sign_in_password_reset_moves_to_new_password() {
        let mut flow = AuthFlow::new();
        let action = flow.note_sign_in(
            "alice",
            "pw",
            &service_err(codes::PASSWORD_RESET_REQUIRED),
        );
        assert_eq!(flow.mode(), AuthMode::NewPassword);
        assert_eq!(action, FlowAction::None);
    }

    #[test]
    fn test_sign_in_challenge_carries_session() {
        let mut flow = AuthFlow::new();
        let outcome = Ok(SignInOutcome::NewPasswordRequired {
            session: "sess-1".to_string(),
        });
        flow.note_sign_in("alice", "pw", &outcome);
        assert_eq!(flow.mode(), AuthMode::NewPassword);
        assert_eq!(flow.challenge_session(), Some("sess-1"));
    }

    #[test]
    fn test_sign_in_wrong_password_stays_put_with_message() {
        let mut flow = AuthFlow::new();
        flow.note_sign_in("alice", "pw", &service_err(codes::NOT_AUTHORIZED));
        assert_eq!(flow.mode(), AuthMode::SignIn);
        let message = flow.message().unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, "Invalid credentials or account not verified");
    }

    #[test]
    fn test_sign_up_success_moves_to_verify() {
        let mut flow = AuthFlow::new();
        flow.switch_to(AuthMode::SignUp);
        let outcome = Ok(SignUpOutcome {
            user_sub: "sub-1".to_string(),
            confirmed: false,
        });
        flow.note_sign_up("alice", "pw", &outcome);
        assert_eq!(flow.mode(), AuthMode::Verify);
        assert_eq!(flow.pending_username(), Some("alice"));
    }

    #[test]
    fn test_sign_up_existing_account_returns_to_sign_in() {
        let mut flow = AuthFlow::new();
        flow.switch_to(AuthMode::SignUp);
        flow.note_sign_up("alice", "pw", &service_err(codes::USERNAME_EXISTS));
        assert_eq!(flow.mode(), AuthMode::SignIn);
        assert_eq!(
            flow.message().unwrap().text,
            "An account with this email already exists. Please sign in instead"
        );
    }

    #[test]
    fn test_verify_success_triggers_auto_sign_in() {
        let mut flow = AuthFlow::new();
        flow.note_sign_in("alice", "pw", &service_err(codes::USER_NOT_CONFIRMED));
        let action = flow.note_verify(&Ok(()));
        assert_eq!(
            action,
            FlowAction::SignIn {
                username: "alice".to_string(),
                password: "pw".to_string()
            }
        );
        assert_eq!(flow.mode(), AuthMode::SignIn);
    }

    #[test]
    fn test_verify_expired_code_stays_and_resends() {
        let mut flow = AuthFlow::new();
        flow.note_sign_in("alice", "pw", &service_err(codes::USER_NOT_CONFIRMED));
        let action = flow.note_verify(&service_err(codes::EXPIRED_CODE));
        assert_eq!(flow.mode(), AuthMode::Verify);
        assert_eq!(action, FlowAction::Resend);
    }

    #[test]
    fn test_verify_wrong_code_stays_with_message() {
        let mut flow = AuthFlow::new();
        flow.note_sign_in("alice", "pw", &service_err(codes::USER_NOT_CONFIRMED));
        let action = flow.note_verify(&service_err(codes::CODE_MISMATCH));
        assert_eq!(flow.mode(), AuthMode::Verify);
        assert_eq!(action, FlowAction::None);
        assert_eq!(
            flow.message().unwrap().text,
            "Invalid verification code. Please try again"
        );
    }

    #[test]
    fn test_resend_outcome_messages() {
        let mut flow = AuthFlow::new();
        flow.note_resend(&Ok(()));
        assert_eq!(flow.message().unwrap().kind, MessageKind::Info);
        flow.note_resend(&service_err(codes::LIMIT_EXCEEDED));
        let message = flow.message().unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, "Too many attempts. Please try again later");
    }

    #[test]
    fn test_new_password_success_clears_challenge() {
        let mut flow = AuthFlow::new();
        let outcome = Ok(SignInOutcome::NewPasswordRequired {
            session: "sess-1".to_string(),
        });
        flow.note_sign_in("alice", "pw", &outcome);
        flow.note_new_password(&Ok(tokens()));
        assert!(flow.challenge_session().is_none());
        assert!(flow.message().is_none());
    }
}
