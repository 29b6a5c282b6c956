use crate::auth::{AuthConfig, AuthError, AuthProvider};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};

// GoTrue reports errors under different keys depending on the endpoint.
fn provider_message(status: StatusCode, body: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map_or_else(|| status.to_string(), str::to_string)
}

/// Supabase Auth (GoTrue) REST client.
pub struct SupabaseAuth {
    client: Client,
    url: String,
    anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseAuth")
            .field("url", &self.url)
            .field("anon_key", &"***")
            .finish_non_exhaustive()
    }
}

impl SupabaseAuth {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let client = Client::builder().user_agent(crate::APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.url)
    }

    fn authorized(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    #[instrument(skip_all)]
    async fn current_user(&self, access_token: &str) -> Result<Option<Value>, AuthError> {
        let response = self
            .authorized(self.client.get(self.endpoint("/user")), access_token)
            .send()
            .await?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!("Session rejected by auth provider: {}", status);
            return Ok(None);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message: provider_message(status, &body),
            });
        }

        Ok(Some(body).filter(|user| !user.is_null()))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .authorized(
                self.client
                    .post(self.endpoint("/logout"))
                    .query(&[("scope", "global")]),
                access_token,
            )
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // An already-expired or unknown session is signed out as far as the caller cares.
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            debug!("Session already gone at auth provider: {}", status);
            return Ok(());
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(AuthError::Provider {
            status: status.as_u16(),
            message: provider_message(status, &body),
        })
    }
}
