use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_AUTHOR: &str = "Anonymous";

pub const SENTINEL_TITLE: &str = "Error: Failed to load content";
pub const SENTINEL_DESCRIPTION: &str = "This card could not be loaded";
pub const SENTINEL_AUTHOR: &str = "System";

/// Flat, UI-ready record. Empty `link` means "no link" and empty `image_url`
/// means "show a placeholder".
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub link: String,
    pub image_url: String,
}

impl Card {
    /// Placeholder shown in place of a row that could not be mapped.
    #[must_use]
    pub fn sentinel(id: String) -> Self {
        Self {
            id,
            title: SENTINEL_TITLE.to_string(),
            description: SENTINEL_DESCRIPTION.to_string(),
            author: SENTINEL_AUTHOR.to_string(),
            link: String::new(),
            image_url: String::new(),
        }
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.title == SENTINEL_TITLE && self.author == SENTINEL_AUTHOR
    }
}

/// Result of extracting one card field from a row's property bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Found(String),
    Missing,
}

impl Field {
    /// Empty strings count as missing; Notion returns them for cleared cells.
    #[must_use]
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => Self::Found(value.to_string()),
            _ => Self::Missing,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub fn or(self, default: &str) -> String {
        match self {
            Self::Found(value) => value,
            Self::Missing => default.to_string(),
        }
    }

    #[must_use]
    pub fn or_empty(self) -> String {
        self.or("")
    }
}
