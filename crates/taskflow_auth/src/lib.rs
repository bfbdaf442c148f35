//! taskflow-auth — client for the hosted credential service.
//!
//! Three layers:
//! - [`UserPoolClient`]: one method per service operation (sign up, confirm,
//!   sign in, refresh, sign out, get user).
//! - [`SessionStore`]: file-backed token cache implementing the
//!   `currentSession` / `currentAuthenticatedUser` semantics, refreshing
//!   through the client when tokens go stale.
//! - [`AuthFlow`]: the sign-in/sign-up/verify/new-password state machine,
//!   with transitions keyed off the service's error codes.

pub mod client;
pub mod error;
pub mod flow;
pub mod session;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{UserPoolClient, UserPoolConfig};
pub use error::{AuthError, Result, codes};
pub use flow::{AuthFlow, AuthMode, FlowAction, FlowMessage, MessageKind};
pub use session::{
    AuthSession, SessionStore, SessionTokenProvider, StaticToken, TokenProvider,
};
pub use types::{AuthTokens, SignInOutcome, SignUpOutcome, UserProfile};
