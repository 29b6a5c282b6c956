//! Auth passthrough.
//!
//! Session state is owned by Supabase; this module only extracts the caller's
//! access token and forwards "who am I" and "sign me out" to the provider.

pub mod session;
pub mod supabase;

pub use session::{
    LEGACY_SESSION_COOKIE, clear_session_cookie, clear_session_cookies, extract_access_token,
    project_session_cookie,
};
pub use supabase::SupabaseAuth;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;

/// Auth provider settings, resolved once at startup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub url: String,
    pub anon_key: SecretString,
    pub session_cookie: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Provider { status: u16, message: String },
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The user behind `access_token`, or `None` when the session is not valid.
    async fn current_user(&self, access_token: &str) -> Result<Option<Value>, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// Shared handler state for the auth endpoints.
#[derive(Clone)]
pub struct AuthState {
    provider: Arc<dyn AuthProvider>,
    session_cookie: String,
}

impl AuthState {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>, session_cookie: String) -> Self {
        Self {
            provider,
            session_cookie,
        }
    }

    #[must_use]
    pub fn provider(&self) -> &dyn AuthProvider {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("session_cookie", &self.session_cookie)
            .finish_non_exhaustive()
    }
}
