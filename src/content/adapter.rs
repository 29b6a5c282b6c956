use crate::content::{
    ContentConfig, ContentSource,
    card::{Card, DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_TITLE, Field},
    error::{ContentError, MappingError},
    model::{FileObject, Property, QueryRequest, RichText, Sort},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use ulid::Ulid;

const TITLE_PROPERTY: &str = "title";
const DESCRIPTION_PROPERTY: &str = "description";
const AUTHOR_PROPERTY: &str = "author";
const LINK_PROPERTY: &str = "link";
const IMAGE_PROPERTY: &str = "image";

const URL_KIND: &str = "url";
const FILES_KIND: &str = "files";

/// Which text-holding property kind a field must carry to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Title,
    RichText,
}

impl TextKind {
    /// Wire discriminator of this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingProperties,
}

/// Outcome of mapping a single row.
#[derive(Debug)]
pub enum RecordOutcome {
    Mapped {
        card: Card,
        /// Text fields that fell back to their default.
        missing_text: Vec<&'static str>,
    },
    Sentinel {
        card: Card,
        error: MappingError,
    },
    Skipped {
        id: Option<String>,
        reason: SkipReason,
    },
}

impl RecordOutcome {
    #[must_use]
    pub fn card(&self) -> Option<&Card> {
        match self {
            Self::Mapped { card, .. } | Self::Sentinel { card, .. } => Some(card),
            Self::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn into_card(self) -> Option<Card> {
        match self {
            Self::Mapped { card, .. } | Self::Sentinel { card, .. } => Some(card),
            Self::Skipped { .. } => None,
        }
    }
}

/// Outcome of one fetch.
#[derive(Debug)]
pub enum BatchOutcome {
    Fetched(Vec<RecordOutcome>),
    Failed(ContentError),
}

impl BatchOutcome {
    /// Cards in store order; a failed batch is an empty list.
    #[must_use]
    pub fn into_cards(self) -> Vec<Card> {
        match self {
            Self::Fetched(records) => records
                .into_iter()
                .filter_map(RecordOutcome::into_card)
                .collect(),
            Self::Failed(_) => Vec::new(),
        }
    }
}

/// Reads the configured database and turns its rows into cards.
pub struct ContentAdapter {
    source: Arc<dyn ContentSource>,
    config: ContentConfig,
}

impl std::fmt::Debug for ContentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAdapter")
            .field("database_id", &self.config.database_id)
            .field("sort_by_title", &self.config.sort_by_title)
            .finish_non_exhaustive()
    }
}

impl ContentAdapter {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, config: ContentConfig) -> Self {
        Self { source, config }
    }

    #[must_use]
    pub fn request(&self) -> QueryRequest {
        QueryRequest {
            database_id: self.config.database_id.clone(),
            sort: self
                .config
                .sort_by_title
                .then(|| Sort::ascending(TITLE_PROPERTY)),
        }
    }

    /// Fetch and map every row, keeping each tier's outcome.
    #[instrument(skip(self), fields(database_id = %self.config.database_id))]
    pub async fn fetch(&self) -> BatchOutcome {
        info!("Fetching cards from database {}", self.config.database_id);

        let page = match self.source.query(&self.request()).await {
            Ok(page) => page,
            Err(err) => {
                error!("Error fetching cards: {err}");
                return BatchOutcome::Failed(err);
            }
        };

        info!("Fetched {} records", page.results.len());
        if page.has_more {
            debug!(
                "Database has more rows after this page (next cursor: {:?}); only the first page is shown",
                page.next_cursor
            );
        }

        let records = page
            .results
            .iter()
            .map(|raw| {
                let outcome = map_record(raw);
                log_outcome(&outcome);
                outcome
            })
            .collect();

        BatchOutcome::Fetched(records)
    }

    /// Best-effort card list; never fails.
    pub async fn fetch_cards(&self) -> Vec<Card> {
        self.fetch().await.into_cards()
    }
}

fn log_outcome(outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Mapped { card, missing_text } if !missing_text.is_empty() => {
            warn!(
                "Record {} is missing text fields: {}",
                card.id,
                missing_text.join(", ")
            );
        }
        RecordOutcome::Mapped { .. } => {}
        RecordOutcome::Sentinel { card, error } => {
            warn!("Error processing record {}: {error}", card.id);
        }
        RecordOutcome::Skipped { id, reason } => {
            warn!(
                "Skipping record {}: {reason:?}",
                id.as_deref().unwrap_or("<no id>")
            );
        }
    }
}

/// Map one raw row into a card. Pure; logging is left to the caller.
#[must_use]
pub fn map_record(raw: &Value) -> RecordOutcome {
    let Some(record) = raw.as_object() else {
        return sentinel(None, MappingError::NotAnObject);
    };
    let id = record.get("id").and_then(Value::as_str).map(str::to_string);

    let properties = match record.get("properties") {
        None | Some(Value::Null) => {
            return RecordOutcome::Skipped {
                id,
                reason: SkipReason::MissingProperties,
            };
        }
        Some(Value::Object(properties)) => properties,
        Some(_) => return sentinel(id, MappingError::MalformedProperties),
    };

    let Some(id) = id else {
        return sentinel(None, MappingError::MissingId);
    };

    match map_properties(id.clone(), properties) {
        Ok((card, missing_text)) => RecordOutcome::Mapped { card, missing_text },
        Err(error) => sentinel(Some(id), error),
    }
}

fn sentinel(id: Option<String>, error: MappingError) -> RecordOutcome {
    let id = id.unwrap_or_else(|| Ulid::new().to_string());
    RecordOutcome::Sentinel {
        card: Card::sentinel(id),
        error,
    }
}

fn map_properties(
    id: String,
    properties: &Map<String, Value>,
) -> Result<(Card, Vec<&'static str>), MappingError> {
    let title = text(
        property(properties, TITLE_PROPERTY, TextKind::Title.tag())?.as_ref(),
        TextKind::Title,
    );
    let description = text(
        property(properties, DESCRIPTION_PROPERTY, TextKind::RichText.tag())?.as_ref(),
        TextKind::RichText,
    );
    let author = text(
        property(properties, AUTHOR_PROPERTY, TextKind::RichText.tag())?.as_ref(),
        TextKind::RichText,
    );
    let link = url(property(properties, LINK_PROPERTY, URL_KIND)?.as_ref());
    let image_url = image(property(properties, IMAGE_PROPERTY, FILES_KIND)?.as_ref());

    let missing_text = [
        (TITLE_PROPERTY, &title),
        (DESCRIPTION_PROPERTY, &description),
        (AUTHOR_PROPERTY, &author),
    ]
    .into_iter()
    .filter(|(_, field)| field.is_missing())
    .map(|(name, _)| name)
    .collect();

    let card = Card {
        id,
        title: title.or(DEFAULT_TITLE),
        description: description.or(DEFAULT_DESCRIPTION),
        author: author.or(DEFAULT_AUTHOR),
        link: link.or_empty(),
        image_url: image_url.or_empty(),
    };

    Ok((card, missing_text))
}

/// Decode a named property only when it carries the `kind` discriminator.
///
/// Absent, untagged, non-object or differently tagged values are `None` and
/// fall back to the field default. Only a broken body under the expected tag
/// is an error.
fn property(
    properties: &Map<String, Value>,
    name: &'static str,
    kind: &str,
) -> Result<Option<Property>, MappingError> {
    let Some(value) = properties.get(name) else {
        return Ok(None);
    };

    if value.get("type").and_then(Value::as_str) != Some(kind) {
        return Ok(None);
    }

    Property::deserialize(value)
        .map(Some)
        .map_err(|source| MappingError::Property { name, source })
}

/// First plain-text run of a `title` or `rich_text` property.
#[must_use]
pub fn text(property: Option<&Property>, expected: TextKind) -> Field {
    let runs: &[RichText] = match (property, expected) {
        (Some(Property::Title { title }), TextKind::Title) => title,
        (Some(Property::RichText { rich_text }), TextKind::RichText) => rich_text,
        _ => return Field::Missing,
    };

    Field::from_option(runs.first().and_then(|run| run.plain_text.as_deref()))
}

#[must_use]
pub fn url(property: Option<&Property>) -> Field {
    match property {
        Some(Property::Url { url }) => Field::from_option(url.as_deref()),
        _ => Field::Missing,
    }
}

/// URL of the first attachment only; hosted and external files keep their URL
/// in differently named holders.
#[must_use]
pub fn image(property: Option<&Property>) -> Field {
    let Some(Property::Files { files }) = property else {
        return Field::Missing;
    };

    let url = match files.first() {
        Some(FileObject::File { file: Some(file) }) => file.url.as_deref(),
        Some(FileObject::External {
            external: Some(external),
        }) => external.url.as_deref(),
        _ => None,
    };

    Field::from_option(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::model::{ExternalFile, HostedFile, QueryPage};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn config(sort_by_title: bool) -> ContentConfig {
        ContentConfig {
            token: SecretString::from("secret_token".to_string()),
            database_id: "db-1".to_string(),
            api_url: "https://api.notion.com".to_string(),
            timeout: Duration::from_secs(10),
            sort_by_title,
        }
    }

    fn full_record(id: &str) -> Value {
        json!({
            "object": "page",
            "id": id,
            "properties": {
                "title": { "type": "title", "title": [{ "plain_text": format!("Title {id}") }] },
                "description": { "type": "rich_text", "rich_text": [{ "plain_text": "A card" }] },
                "author": { "type": "rich_text", "rich_text": [{ "plain_text": "Ann" }] },
                "link": { "type": "url", "url": "https://example.com" },
                "image": { "type": "files", "files": [
                    { "type": "external", "external": { "url": "https://cdn/img.png" } }
                ] }
            }
        })
    }

    struct StaticSource {
        result: Mutex<Option<Result<QueryPage, ContentError>>>,
        seen: Mutex<Option<QueryRequest>>,
    }

    impl StaticSource {
        fn new(result: Result<QueryPage, ContentError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn query(&self, request: &QueryRequest) -> Result<QueryPage, ContentError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(QueryPage::default()))
        }
    }

    fn page(results: Vec<Value>) -> QueryPage {
        QueryPage {
            results,
            has_more: false,
            next_cursor: None,
        }
    }

    #[test]
    fn text_requires_matching_kind() {
        let title = Property::Title {
            title: vec![RichText {
                plain_text: Some("Hello".to_string()),
            }],
        };
        assert_eq!(
            text(Some(&title), TextKind::Title),
            Field::Found("Hello".to_string())
        );
        assert_eq!(text(Some(&title), TextKind::RichText), Field::Missing);
        assert_eq!(text(None, TextKind::Title), Field::Missing);
    }

    #[test]
    fn text_with_empty_runs_is_missing() {
        let empty = Property::RichText { rich_text: vec![] };
        assert_eq!(text(Some(&empty), TextKind::RichText), Field::Missing);

        let no_plain = Property::RichText {
            rich_text: vec![RichText { plain_text: None }],
        };
        assert_eq!(text(Some(&no_plain), TextKind::RichText), Field::Missing);
    }

    #[test]
    fn text_takes_only_the_first_run() {
        let property = Property::RichText {
            rich_text: vec![
                RichText {
                    plain_text: Some("first".to_string()),
                },
                RichText {
                    plain_text: Some("second".to_string()),
                },
            ],
        };
        assert_eq!(
            text(Some(&property), TextKind::RichText),
            Field::Found("first".to_string())
        );
    }

    #[test]
    fn url_requires_url_kind() {
        let link = Property::Url {
            url: Some("https://example.com".to_string()),
        };
        assert_eq!(
            url(Some(&link)),
            Field::Found("https://example.com".to_string())
        );
        assert_eq!(url(Some(&Property::Url { url: None })), Field::Missing);
        assert_eq!(url(Some(&Property::Unsupported)), Field::Missing);
    }

    #[test]
    fn image_with_no_files_is_missing() {
        assert_eq!(
            image(Some(&Property::Files { files: vec![] })),
            Field::Missing
        );
    }

    #[test]
    fn image_reads_external_url() {
        let property = Property::Files {
            files: vec![FileObject::External {
                external: Some(ExternalFile {
                    url: Some("https://cdn/ext.png".to_string()),
                }),
            }],
        };
        assert_eq!(
            image(Some(&property)),
            Field::Found("https://cdn/ext.png".to_string())
        );
    }

    #[test]
    fn image_reads_hosted_url() {
        let property = Property::Files {
            files: vec![FileObject::File {
                file: Some(HostedFile {
                    url: Some("https://s3/hosted.png".to_string()),
                    expiry_time: None,
                }),
            }],
        };
        assert_eq!(
            image(Some(&property)),
            Field::Found("https://s3/hosted.png".to_string())
        );
    }

    #[test]
    fn image_only_considers_first_attachment() {
        let property = Property::Files {
            files: vec![
                FileObject::Unsupported,
                FileObject::External {
                    external: Some(ExternalFile {
                        url: Some("https://cdn/second.png".to_string()),
                    }),
                },
            ],
        };
        assert_eq!(image(Some(&property)), Field::Missing);
    }

    #[test]
    fn image_ignores_the_other_holder() {
        // Tagged `file` but only carrying an `external` holder: never read both.
        let raw = json!({
            "type": "files",
            "files": [{ "type": "file", "external": { "url": "https://cdn/wrong.png" } }]
        });
        let property = Property::deserialize(&raw).unwrap();
        assert_eq!(image(Some(&property)), Field::Missing);
    }

    #[test]
    fn image_requires_files_kind() {
        let property = Property::Url {
            url: Some("https://cdn/x.png".to_string()),
        };
        assert_eq!(image(Some(&property)), Field::Missing);
    }

    #[test]
    fn maps_full_record() {
        let outcome = map_record(&full_record("p1"));
        let RecordOutcome::Mapped { card, missing_text } = outcome else {
            panic!("expected mapped record, got {outcome:?}");
        };
        assert!(missing_text.is_empty());
        assert_eq!(
            card,
            Card {
                id: "p1".to_string(),
                title: "Title p1".to_string(),
                description: "A card".to_string(),
                author: "Ann".to_string(),
                link: "https://example.com".to_string(),
                image_url: "https://cdn/img.png".to_string(),
            }
        );
    }

    #[test]
    fn maps_sparse_record_with_defaults() {
        let raw = json!({
            "id": "p1",
            "properties": {
                "title": { "type": "title", "title": [{ "plain_text": "Hello" }] },
                "author": { "type": "rich_text", "rich_text": [{ "plain_text": "Ann" }] },
                "link": { "type": "url", "url": null },
                "image": { "type": "files", "files": [] }
            }
        });

        let outcome = map_record(&raw);
        let RecordOutcome::Mapped { card, missing_text } = outcome else {
            panic!("expected mapped record, got {outcome:?}");
        };
        assert_eq!(missing_text, vec!["description"]);
        assert_eq!(
            card,
            Card {
                id: "p1".to_string(),
                title: "Hello".to_string(),
                description: DEFAULT_DESCRIPTION.to_string(),
                author: "Ann".to_string(),
                link: String::new(),
                image_url: String::new(),
            }
        );
    }

    #[test]
    fn each_missing_field_defaults_independently() {
        for name in ["title", "description", "author", "link", "image"] {
            let mut raw = full_record("p1");
            raw["properties"].as_object_mut().unwrap().remove(name);

            let card = map_record(&raw).into_card().unwrap();
            let expected = map_record(&full_record("p1")).into_card().unwrap();

            let mut patched = expected.clone();
            match name {
                "title" => patched.title = DEFAULT_TITLE.to_string(),
                "description" => patched.description = DEFAULT_DESCRIPTION.to_string(),
                "author" => patched.author = DEFAULT_AUTHOR.to_string(),
                "link" => patched.link = String::new(),
                _ => patched.image_url = String::new(),
            }
            assert_eq!(card, patched, "removing `{name}`");
        }
    }

    #[test]
    fn mismatched_discriminator_is_absent_not_error() {
        let raw = json!({
            "id": "p2",
            "properties": {
                "title": { "type": "rich_text", "rich_text": [{ "plain_text": "wrong kind" }] },
                "author": { "type": "people", "people": [] }
            }
        });

        let outcome = map_record(&raw);
        let RecordOutcome::Mapped { card, missing_text } = outcome else {
            panic!("expected mapped record, got {outcome:?}");
        };
        assert_eq!(card.title, DEFAULT_TITLE);
        assert_eq!(card.author, DEFAULT_AUTHOR);
        assert_eq!(missing_text, vec!["title", "description", "author"]);
    }

    #[test]
    fn untagged_or_non_object_property_is_absent_not_error() {
        let raw = json!({
            "id": "p1",
            "properties": {
                "title": { "type": "title", "title": [{ "plain_text": "Hello" }] },
                "description": { "rich_text": [{ "plain_text": "no discriminator" }] },
                "author": { "type": "rich_text", "rich_text": [{ "plain_text": "Ann" }] },
                "link": "https://example.com",
                "image": { "type": 7, "files": [] }
            }
        });

        let outcome = map_record(&raw);
        let RecordOutcome::Mapped { card, missing_text } = outcome else {
            panic!("expected mapped record, got {outcome:?}");
        };
        assert_eq!(card.id, "p1");
        assert_eq!(card.title, "Hello");
        assert_eq!(card.description, DEFAULT_DESCRIPTION);
        assert_eq!(card.author, "Ann");
        assert_eq!(card.link, "");
        assert_eq!(card.image_url, "");
        assert_eq!(missing_text, vec!["description"]);
    }

    #[test]
    fn broken_body_under_other_tag_is_absent_not_error() {
        let mut raw = full_record("p8");
        raw["properties"]["link"] = json!({ "type": "title", "title": "not a list" });

        let outcome = map_record(&raw);
        let RecordOutcome::Mapped { card, .. } = outcome else {
            panic!("expected mapped record, got {outcome:?}");
        };
        assert_eq!(card.link, "");
        assert_eq!(card.title, "Title p8");
    }

    #[test]
    fn record_without_properties_is_skipped() {
        let outcome = map_record(&json!({ "id": "p3" }));
        assert!(matches!(
            outcome,
            RecordOutcome::Skipped {
                reason: SkipReason::MissingProperties,
                ..
            }
        ));
        assert!(outcome.into_card().is_none());

        let outcome = map_record(&json!({ "id": "p3", "properties": null }));
        assert!(matches!(outcome, RecordOutcome::Skipped { .. }));
    }

    #[test]
    fn malformed_property_yields_sentinel() {
        let mut raw = full_record("p4");
        raw["properties"]["title"] = json!({ "type": "title", "title": "not a list" });

        let outcome = map_record(&raw);
        let RecordOutcome::Sentinel { card, error } = outcome else {
            panic!("expected sentinel, got {outcome:?}");
        };
        assert_eq!(card, Card::sentinel("p4".to_string()));
        assert!(matches!(error, MappingError::Property { name: "title", .. }));
    }

    #[test]
    fn unconsulted_properties_are_never_decoded() {
        let mut raw = full_record("p5");
        raw["properties"]["tags"] = json!({ "type": "multi_select", "multi_select": "garbage" });
        raw["properties"]["weird"] = json!(42);

        assert!(matches!(map_record(&raw), RecordOutcome::Mapped { .. }));
    }

    #[test]
    fn non_object_record_gets_generated_id() {
        let outcome = map_record(&json!("oops"));
        let RecordOutcome::Sentinel { card, error } = outcome else {
            panic!("expected sentinel, got {outcome:?}");
        };
        assert!(matches!(error, MappingError::NotAnObject));
        assert!(Ulid::from_string(&card.id).is_ok());
        assert!(card.is_sentinel());
    }

    #[test]
    fn record_without_id_yields_sentinel() {
        let mut raw = full_record("p6");
        raw.as_object_mut().unwrap().remove("id");

        let outcome = map_record(&raw);
        assert!(matches!(
            outcome,
            RecordOutcome::Sentinel {
                error: MappingError::MissingId,
                ..
            }
        ));
    }

    #[test]
    fn properties_of_wrong_type_yield_sentinel() {
        let outcome = map_record(&json!({ "id": "p7", "properties": [] }));
        let RecordOutcome::Sentinel { card, error } = outcome else {
            panic!("expected sentinel, got {outcome:?}");
        };
        assert_eq!(card.id, "p7");
        assert!(matches!(error, MappingError::MalformedProperties));
    }

    #[tokio::test]
    async fn one_faulty_record_is_replaced_by_sentinel() {
        let mut faulty = full_record("p2");
        faulty["properties"]["image"] = json!({ "type": "files", "files": { "not": "a list" } });

        let source = StaticSource::new(Ok(page(vec![
            full_record("p1"),
            faulty,
            full_record("p3"),
        ])));
        let adapter = ContentAdapter::new(Arc::new(source), config(true));

        let cards = adapter.fetch_cards().await;
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "Title p1");
        assert_eq!(cards[1], Card::sentinel("p2".to_string()));
        assert_eq!(cards[2].title, "Title p3");
    }

    #[tokio::test]
    async fn skipped_records_are_excluded() {
        let source = StaticSource::new(Ok(page(vec![
            full_record("p1"),
            json!({ "id": "p2" }),
            full_record("p3"),
        ])));
        let adapter = ContentAdapter::new(Arc::new(source), config(true));

        let BatchOutcome::Fetched(records) = adapter.fetch().await else {
            panic!("expected fetched batch");
        };
        assert_eq!(records.len(), 3);
        assert!(matches!(records[1], RecordOutcome::Skipped { .. }));

        let ids: Vec<_> = records
            .into_iter()
            .filter_map(RecordOutcome::into_card)
            .map(|card| card.id)
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn failed_query_yields_empty_list() {
        let source = StaticSource::new(Err(ContentError::Provider {
            status: 401,
            code: "unauthorized".to_string(),
            message: "API token is invalid.".to_string(),
        }));
        let adapter = ContentAdapter::new(Arc::new(source), config(true));

        let outcome = adapter.fetch().await;
        assert!(matches!(
            outcome,
            BatchOutcome::Failed(ContentError::Provider { status: 401, .. })
        ));
        assert!(outcome.into_cards().is_empty());
    }

    #[tokio::test]
    async fn request_uses_configured_database_and_sort() {
        let source = Arc::new(StaticSource::new(Ok(page(vec![]))));
        let adapter = ContentAdapter::new(source.clone(), config(true));
        assert!(adapter.fetch_cards().await.is_empty());

        let seen = source.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.database_id, "db-1");
        assert_eq!(seen.sort, Some(Sort::ascending("title")));

        let unsorted = ContentAdapter::new(source, config(false));
        assert_eq!(unsorted.request().sort, None);
    }

    #[tokio::test]
    async fn order_follows_the_store() {
        let source = StaticSource::new(Ok(page(vec![
            full_record("z"),
            full_record("a"),
            full_record("m"),
        ])));
        let adapter = ContentAdapter::new(Arc::new(source), config(true));

        let ids: Vec<_> = adapter
            .fetch_cards()
            .await
            .into_iter()
            .map(|card| card.id)
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
