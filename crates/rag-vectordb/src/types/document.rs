//! Document types stored in the vector database

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Free-form metadata map as stored next to each vector
pub type MetadataMap = Map<String, Value>;

const TITLE_KEY: &str = "title";
const CREATED_AT_KEY: &str = "createdAt";
const UPDATED_AT_KEY: &str = "updatedAt";

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Document {
    /// UUID v4 assigned on creation
    pub id: String,
    /// Raw text content (the text that gets embedded)
    pub content: String,
    /// Title, timestamps and any other key-values
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a new document with a fresh id, a default title when none is
    /// given, and a creation timestamp
    pub fn new(content: impl Into<String>, title: Option<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title(&id));

        Self {
            metadata: DocumentMetadata {
                title: Some(title),
                created_at: Some(Utc::now()),
                ..Default::default()
            },
            id,
            content: content.into(),
        }
    }

    /// Title if one is set
    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }
}

/// `"Document "` followed by the first eight characters of the id
pub fn default_title(id: &str) -> String {
    format!("Document {}", id.chars().take(8).collect::<String>())
}

/// Document metadata
///
/// Known keys are typed; anything else round-trips untouched through
/// `extra`. Decoding is lenient: a timestamp that does not parse as RFC 3339
/// stays in `extra` under its original key instead of failing the whole
/// document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Display title
    pub title: Option<String>,
    /// Creation time
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    pub updated_at: Option<DateTime<Utc>>,
    /// Remaining key-values
    pub extra: MetadataMap,
}

impl DocumentMetadata {
    /// Decode from a raw metadata map
    pub fn from_map(mut map: MetadataMap) -> Self {
        let title = match map.remove(TITLE_KEY) {
            Some(Value::String(title)) => Some(title),
            Some(other) => {
                map.insert(TITLE_KEY.to_string(), other);
                None
            }
            None => None,
        };
        let created_at = take_timestamp(&mut map, CREATED_AT_KEY);
        let updated_at = take_timestamp(&mut map, UPDATED_AT_KEY);

        Self {
            title,
            created_at,
            updated_at,
            extra: map,
        }
    }

    /// Encode into a raw metadata map
    pub fn to_map(&self) -> MetadataMap {
        let mut map = self.extra.clone();
        if let Some(title) = &self.title {
            map.insert(TITLE_KEY.to_string(), Value::String(title.clone()));
        }
        if let Some(ts) = self.created_at {
            map.insert(CREATED_AT_KEY.to_string(), Value::String(format_timestamp(ts)));
        }
        if let Some(ts) = self.updated_at {
            map.insert(UPDATED_AT_KEY.to_string(), Value::String(format_timestamp(ts)));
        }
        map
    }
}

fn take_timestamp(map: &mut MetadataMap, key: &str) -> Option<DateTime<Utc>> {
    let parsed = map
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?;
    map.remove(key);
    Some(parsed.with_timezone(&Utc))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Serialize for DocumentMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocumentMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<MetadataMap>::deserialize(deserializer)
            .map(|map| Self::from_map(map.unwrap_or_default()))
    }
}

/// A document returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    /// The matched document
    #[serde(flatten)]
    pub document: Document,
    /// Distance to the query embedding (lower is more similar)
    pub distance: f64,
}

/// Body of `POST /documents`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddDocumentRequest {
    /// Document text
    pub content: String,
    /// Optional title; defaults to `Document <id prefix>`
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `PUT /documents/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    /// Replacement content
    #[serde(default)]
    pub content: Option<String>,
    /// Replacement title
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `POST /documents/search`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Text to search for
    pub query: String,
    /// Maximum number of results (default: 5, also used for 0)
    #[serde(default)]
    pub limit: Option<usize>,
}
