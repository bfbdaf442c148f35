//! Client for the hosted task store.
//!
//! [`TaskApi`] wraps the REST surface (`/todos` CRUD plus `/ai/extract`)
//! with bearer-token auth, a fixed retry loop, and a local fallback for
//! extraction. Tokens come through the [`TokenProvider`] seam from
//! `taskflow-auth`, so the client itself never touches credentials.

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::TaskApi;
pub use error::{ApiError, Result};
pub use types::{Engine, Extraction};

pub use taskflow_auth::TokenProvider;
