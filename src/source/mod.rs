//! Post extraction
//!
//! A [`Source`] serves pages of raw listing items; [`SourceClient`]
//! reduces them to [`RawRecord`]s with a fixed field set, either all at
//! once per partition or as a lazy stream of batches.

mod client;
mod memory;
mod reddit;
mod types;

pub use client::{extract_item, SourceClient};
pub use memory::MemorySource;
pub use reddit::{RedditSource, DEFAULT_API_BASE, DEFAULT_TOKEN_URL};
pub use types::{
    ListingPage, ListingQuery, RawRecord, RecordStream, Source, SourceItem, MAX_PAGE_SIZE,
    POST_FIELDS,
};
