//! External content adapter.
//!
//! Pulls rows from a Notion database through a [`ContentSource`] and flattens
//! them into [`Card`]s for the landing page carousel.

mod adapter;
mod card;
mod error;
pub mod model;
pub mod notion;

pub use adapter::{
    BatchOutcome, ContentAdapter, RecordOutcome, SkipReason, TextKind, image, map_record, text,
    url,
};
pub use card::{
    Card, DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_TITLE, Field, SENTINEL_AUTHOR,
    SENTINEL_DESCRIPTION, SENTINEL_TITLE,
};
pub use error::{ContentError, MappingError};
pub use model::{QueryPage, QueryRequest};

use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Content store settings, resolved once at startup.
#[derive(Clone, Debug)]
pub struct ContentConfig {
    pub token: SecretString,
    pub database_id: String,
    pub api_url: String,
    pub timeout: Duration,
    pub sort_by_title: bool,
}

/// A store that can answer a database query with one page of raw rows.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryPage, ContentError>;
}
