use crate::content::{
    ContentConfig, ContentError, ContentSource, QueryPage, QueryRequest,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, instrument};

pub const NOTION_VERSION: &str = "2022-06-28";

// Notion caps a single query page at 100 rows.
const PAGE_SIZE: u8 = 100;

fn provider_error(status: u16, body: &Value) -> ContentError {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    ContentError::Provider {
        status,
        code: field("code"),
        message: field("message"),
    }
}

/// Notion REST client for database queries.
pub struct NotionClient {
    client: Client,
    api_url: String,
    token: SecretString,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("api_url", &self.api_url)
            .field("token", &"***")
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    #[must_use]
    pub fn query_url(&self, database_id: &str) -> String {
        format!("{}/v1/databases/{database_id}/query", self.api_url)
    }
}

#[async_trait]
impl ContentSource for NotionClient {
    #[instrument(skip(self))]
    async fn query(&self, request: &QueryRequest) -> Result<QueryPage, ContentError> {
        let url = self.query_url(&request.database_id);

        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(sort) = &request.sort {
            body["sorts"] = json!([sort]);
        }

        debug!("query URL: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            return Err(provider_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
