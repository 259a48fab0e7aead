//! In-memory source
//!
//! Serves fixed listings with real cursor pagination. Used by tests and
//! for offline runs against captured listing data.

use super::types::{ListingPage, ListingQuery, Source};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`Source`] answering from listings held in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    listings: HashMap<String, Vec<JsonValue>>,
    failures: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `items` for `partition`, whatever the sort mode
    #[must_use]
    pub fn with_listing(mut self, partition: impl Into<String>, items: Vec<JsonValue>) -> Self {
        self.listings.insert(partition.into(), items);
        self
    }

    /// Fail every request for `partition`
    #[must_use]
    pub fn with_failure(mut self, partition: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(partition.into(), message.into());
        self
    }

    /// Partitions requested so far, one entry per page
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Source for MemorySource {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<ListingPage> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(query.partition.clone());
        }

        if let Some(message) = self.failures.get(&query.partition) {
            return Err(Error::source_unavailable(&query.partition, message.clone()));
        }
        let Some(items) = self.listings.get(&query.partition) else {
            return Err(Error::source_unavailable(
                &query.partition,
                "HTTP 404: subreddit not found",
            ));
        };

        // cursors are stringified offsets
        let start = match after {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| Error::invalid_argument(format!("Bad cursor '{cursor}'")))?,
            None => 0,
        };
        let end = start.saturating_add(page_size).min(items.len());
        let page = items.get(start..end).unwrap_or_default().to_vec();

        Ok(ListingPage {
            items: page,
            after: (end < items.len()).then(|| end.to_string()),
        })
    }
}
