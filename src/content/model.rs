//! Notion's wire shapes for database rows.
//!
//! Only the property kinds the cards consume are modelled; every other `type`
//! decodes to [`Property::Unsupported`] and is treated as absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of a database query. Rows stay untyped until they are mapped so a
/// single malformed row cannot fail the whole envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    /// Uploaded to Notion; the URL is signed and expires.
    File {
        #[serde(default)]
        file: Option<HostedFile>,
    },
    External {
        #[serde(default)]
        external: Option<ExternalFile>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedFile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalFile {
    #[serde(default)]
    pub url: Option<String>,
}

/// Query sort directive, serialized as Notion expects it in `sorts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    #[must_use]
    pub fn ascending(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

/// What the adapter asks the content store for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub database_id: String,
    pub sort: Option<Sort>,
}
