//! Partition extraction
//!
//! [`SourceClient`] turns listing pages into [`RawRecord`]s. Problems with
//! a single field never fail an item, and problems with a single item
//! never fail a partition; only a failed listing request does.

use super::types::{
    json_kind, ListingQuery, RawRecord, RecordStream, Source, SourceItem, POST_FIELDS,
};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, SortMode, TimeFilter};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Extracts posts from a [`Source`], one partition at a time
pub struct SourceClient {
    source: Box<dyn Source>,
}

impl SourceClient {
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn from_boxed(source: Box<dyn Source>) -> Self {
        Self { source }
    }

    /// Reduce one item to [`POST_FIELDS`]
    ///
    /// Never fails: a field that cannot be read or normalized is null.
    pub fn extract_item(&self, item: &impl SourceItem) -> RawRecord {
        extract_item(item)
    }

    /// Fetch up to `limit` posts from one partition's listing
    pub async fn extract_partition(
        &self,
        partition: &str,
        sort: SortMode,
        time_filter: TimeFilter,
        limit: Option<usize>,
    ) -> Result<Vec<RawRecord>> {
        info!(
            partition = %partition,
            sort = %sort,
            time_filter = %time_filter,
            limit = ?limit,
            "Extracting posts"
        );

        let query = ListingQuery::new(partition, sort, time_filter);
        let items = self
            .source
            .fetch(&query, limit)
            .await
            .map_err(|e| unavailable(partition, e))?;

        let records = records_from_items(partition, &items);
        info!(
            partition = %partition,
            count = records.len(),
            "Extracted posts"
        );
        Ok(records)
    }

    /// Lazily read a partition's `top` listing in batches of `batch_size`
    ///
    /// Pages are requested only as batches are pulled. The last batch may
    /// be short. A failed page request is yielded once, after any records
    /// already buffered, and ends the stream.
    pub fn stream_partition(
        &self,
        partition: &str,
        time_filter: TimeFilter,
        batch_size: usize,
    ) -> RecordStream<'_> {
        let state = StreamState {
            client: self,
            query: ListingQuery::new(partition, SortMode::Top, time_filter),
            batch_size: batch_size.max(1),
            buffer: VecDeque::new(),
            after: None,
            exhausted: false,
            pending_error: None,
        };

        Box::pin(futures::stream::unfold(state, |mut state| async move {
            let item = state.next_batch().await?;
            Some((item, state))
        }))
    }

    /// Fetch a single post to confirm the source is reachable
    pub async fn probe(&self, partition: &str) -> Result<Option<RawRecord>> {
        let query = ListingQuery::new(partition, SortMode::Hot, TimeFilter::All);
        let page = self
            .source
            .fetch_page(&query, None, 1)
            .await
            .map_err(|e| unavailable(partition, e))?;
        Ok(page.items.first().map(|item| extract_item(item)))
    }
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient").finish_non_exhaustive()
    }
}

/// Cursor state behind [`SourceClient::stream_partition`]
struct StreamState<'a> {
    client: &'a SourceClient,
    query: ListingQuery,
    batch_size: usize,
    buffer: VecDeque<RawRecord>,
    after: Option<String>,
    exhausted: bool,
    pending_error: Option<Error>,
}

impl StreamState<'_> {
    async fn next_batch(&mut self) -> Option<Result<Vec<RawRecord>>> {
        while self.buffer.len() < self.batch_size && !self.exhausted {
            let page_size = self.client.source.max_page_size();
            match self
                .client
                .source
                .fetch_page(&self.query, self.after.as_deref(), page_size)
                .await
            {
                Ok(page) => {
                    let fetched = page.items.len();
                    self.buffer
                        .extend(records_from_items(&self.query.partition, &page.items));
                    match page.after {
                        Some(cursor) if fetched > 0 => self.after = Some(cursor),
                        _ => self.exhausted = true,
                    }
                }
                Err(e) => {
                    warn!(
                        partition = %self.query.partition,
                        error = %e,
                        "Streaming extraction failed"
                    );
                    self.exhausted = true;
                    self.pending_error = Some(unavailable(&self.query.partition, e));
                }
            }
        }

        if !self.buffer.is_empty() {
            let take = self.batch_size.min(self.buffer.len());
            return Some(Ok(self.buffer.drain(..take).collect()));
        }

        self.pending_error.take().map(Err)
    }
}

fn unavailable(partition: &str, error: Error) -> Error {
    match error {
        e @ Error::SourceUnavailable { .. } => e,
        other => Error::source_unavailable(partition, other.to_string()),
    }
}

/// Extract every object item, skipping the rest
fn records_from_items(partition: &str, items: &[JsonValue]) -> Vec<RawRecord> {
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.get_field("id").is_err() {
            warn!(
                partition = %partition,
                index,
                kind = json_kind(item),
                "Skipping item that is not an object"
            );
            continue;
        }
        records.push(extract_item(item));
        if records.len() % 100 == 0 {
            debug!(partition = %partition, count = records.len(), "Extracted posts so far");
        }
    }
    records
}

/// Reduce one item to [`POST_FIELDS`]
pub fn extract_item(item: &impl SourceItem) -> RawRecord {
    let mut fields = JsonObject::new();
    for name in POST_FIELDS {
        let value = item
            .get_field(name)
            .and_then(|raw| normalize_field(name, raw.unwrap_or(JsonValue::Null)));
        let value = value.unwrap_or_else(|e| {
            debug!(field = name, error = %e, "Failed to extract field");
            JsonValue::Null
        });
        fields.insert(name.to_string(), value);
    }
    RawRecord::from_fields(fields)
}

/// Coerce a field to the scalar shape the record stores
fn normalize_field(name: &str, value: JsonValue) -> Result<JsonValue> {
    match name {
        "author" => normalize_author(value),
        "created_utc" => normalize_epoch(value),
        _ => match value {
            JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::item_extraction(
                name,
                format!("expected a scalar, got {}", json_kind(&value)),
            )),
            scalar => Ok(scalar),
        },
    }
}

/// Authors collapse to their name
fn normalize_author(value: JsonValue) -> Result<JsonValue> {
    match value {
        JsonValue::Null | JsonValue::String(_) => Ok(value),
        JsonValue::Object(ref map) => match map.get("name") {
            Some(JsonValue::String(name)) => Ok(JsonValue::String(name.clone())),
            _ => Err(Error::item_extraction("author", "author object has no name")),
        },
        JsonValue::Number(n) => Ok(JsonValue::String(n.to_string())),
        other => Err(Error::item_extraction(
            "author",
            format!("unexpected {}", json_kind(&other)),
        )),
    }
}

/// Creation times become whole epoch seconds
fn normalize_epoch(value: JsonValue) -> Result<JsonValue> {
    let seconds = match &value {
        JsonValue::Null => return Ok(JsonValue::Null),
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    seconds.map(JsonValue::from).ok_or_else(|| {
        Error::item_extraction("created_utc", format!("not an epoch timestamp: {value}"))
    })
}
