//! Source capabilities and record types

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, SortMode, TimeFilter};
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Fields extracted from every post, in output column order
pub const POST_FIELDS: [&str; 15] = [
    "id",
    "subreddit",
    "title",
    "selftext",
    "score",
    "num_comments",
    "author",
    "created_utc",
    "upvote_ratio",
    "url",
    "permalink",
    "is_self",
    "over_18",
    "stickied",
    "distinguished",
];

/// Largest page a Reddit listing will return
pub const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// Records
// ============================================================================

/// One post reduced to [`POST_FIELDS`]
///
/// Every field key is present; a field that could not be read is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(JsonObject);

impl RawRecord {
    /// Build a record from field values, filling absent fields with null
    pub fn from_fields(mut fields: JsonObject) -> Self {
        let mut record = JsonObject::new();
        for name in POST_FIELDS {
            record.insert(
                name.to_string(),
                fields.remove(name).unwrap_or(JsonValue::Null),
            );
        }
        Self(record)
    }

    /// Value of a field; `None` only for names outside [`POST_FIELDS`]
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// The record's id, when it has a string one
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(JsonValue::as_str)
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    pub fn into_inner(self) -> JsonObject {
        self.0
    }
}

/// Lazily produced batches of records from one partition
pub type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<Vec<RawRecord>>> + Send + 'a>>;

// ============================================================================
// Listing Requests
// ============================================================================

/// Which listing of which partition to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Subreddit name, without the `r/` prefix
    pub partition: String,
    pub sort: SortMode,
    /// Only sent for [`SortMode::Top`]
    pub time_filter: TimeFilter,
}

impl ListingQuery {
    pub fn new(partition: impl Into<String>, sort: SortMode, time_filter: TimeFilter) -> Self {
        Self {
            partition: partition.into(),
            sort,
            time_filter,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    /// Raw listing children, in listing order
    pub items: Vec<JsonValue>,
    /// Cursor for the next page; `None` at the end of the listing
    pub after: Option<String>,
}

// ============================================================================
// Source Trait
// ============================================================================

/// A paginated origin of posts
#[async_trait]
pub trait Source: Send + Sync {
    /// Fetch one page of a listing, starting after the given cursor
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<ListingPage>;

    /// Largest page size this source accepts
    fn max_page_size(&self) -> usize {
        MAX_PAGE_SIZE
    }

    /// Fetch up to `limit` items, following the cursor across pages
    ///
    /// With no limit the listing is read until it ends.
    async fn fetch(&self, query: &ListingQuery, limit: Option<usize>) -> Result<Vec<JsonValue>> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let remaining = limit.map_or(usize::MAX, |l| l.saturating_sub(items.len()));
            if remaining == 0 {
                break;
            }
            let page_size = remaining.min(self.max_page_size());

            let page = self.fetch_page(query, after.as_deref(), page_size).await?;
            let fetched = page.items.len();
            items.extend(page.items);

            match page.after {
                Some(cursor) if fetched > 0 => after = Some(cursor),
                _ => break,
            }
        }

        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}

// ============================================================================
// Item Capability
// ============================================================================

/// Named field access on a raw item
pub trait SourceItem {
    /// Read a field. `Ok(None)` means the item does not carry it; `Err`
    /// means the item itself could not be read.
    fn get_field(&self, name: &str) -> Result<Option<JsonValue>>;
}

impl SourceItem for JsonValue {
    fn get_field(&self, name: &str) -> Result<Option<JsonValue>> {
        // listing children wrap the post as {"kind": "t3", "data": {...}}
        let data = match self.get("data") {
            Some(inner) if self.get("kind").is_some() => inner,
            _ => self,
        };

        match data {
            JsonValue::Object(map) => Ok(map.get(name).cloned()),
            other => Err(Error::item_extraction(
                name,
                format!("item is not an object: {}", json_kind(other)),
            )),
        }
    }
}

impl SourceItem for JsonObject {
    fn get_field(&self, name: &str) -> Result<Option<JsonValue>> {
        Ok(self.get(name).cloned())
    }
}

/// Short name of a JSON value's type, for log and error messages
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
