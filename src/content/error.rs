/// Batch-level failure: the query itself did not produce a page.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content store returned {status} ({code}): {message}")]
    Provider {
        status: u16,
        code: String,
        message: String,
    },
    #[error("content store response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Record-level failure: one row could not be turned into a card.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no string id")]
    MissingId,
    #[error("record properties are not an object")]
    MalformedProperties,
    #[error("property `{name}` is malformed: {source}")]
    Property {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
