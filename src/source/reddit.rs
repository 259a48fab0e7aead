//! Reddit listing source
//!
//! Reads subreddit listings from the OAuth API
//! (`GET /r/{subreddit}/{sort}`) through the retrying, rate limited
//! [`HttpClient`].

use super::types::{ListingPage, ListingQuery, Source};
use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::{JsonValue, SortMode};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Host serving authenticated API requests
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

/// Endpoint issuing application-only tokens
pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Listing source backed by the Reddit API
#[derive(Debug)]
pub struct RedditSource {
    client: HttpClient,
}

impl RedditSource {
    /// Wrap a configured client; its base URL must point at the API host
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build a source that authenticates with application credentials
    pub fn with_credentials(
        http: HttpClientConfig,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let auth = AuthConfig::reddit(token_url, client_id, client_secret);
        Ok(Self::new(HttpClient::with_auth(http, auth)?))
    }

    fn listing_path(query: &ListingQuery) -> Result<String> {
        let partition = query.partition.trim().trim_start_matches("r/");
        if partition.is_empty() || partition.contains(['/', '?', '#', ' ']) {
            return Err(Error::invalid_argument(format!(
                "Invalid subreddit name: '{}'",
                query.partition
            )));
        }
        Ok(format!("/r/{partition}/{}", query.sort.as_str()))
    }
}

#[async_trait]
impl Source for RedditSource {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<ListingPage> {
        let path = Self::listing_path(query)?;

        let mut request = RequestConfig::new()
            .query("limit", page_size.min(self.max_page_size()).to_string())
            .query("raw_json", "1");
        if query.sort == SortMode::Top {
            request = request.query("t", query.time_filter.as_str());
        }
        if let Some(cursor) = after {
            request = request.query("after", cursor);
        }

        debug!(path = %path, after = ?after, page_size, "Fetching listing page");
        let listing: Listing = self
            .client
            .get_json_with_config(&path, request)
            .await
            .map_err(|e| Error::source_unavailable(&query.partition, e.to_string()))?;

        Ok(ListingPage {
            items: listing.data.children,
            after: listing.data.after.filter(|a| !a.is_empty()),
        })
    }
}

/// `{"kind": "Listing", "data": {...}}`
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<JsonValue>,
    #[serde(default)]
    after: Option<String>,
}
