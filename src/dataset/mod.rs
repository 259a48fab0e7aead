//! Tabular dataset
//!
//! The in-memory table that flows between pipeline stages.
//!
//! # Overview
//!
//! - [`Value`] - a typed scalar cell (text, numbers, booleans, timestamps)
//! - [`Dataset`] - an ordered list of columns plus rows aligned to them
//!
//! Stages take a `Dataset` by value and hand back a new one, so no stage
//! ever observes a half-applied transformation.

mod table;
mod value;

pub use table::Dataset;
pub use value::{Value, ValueKind};

#[cfg(test)]
mod tests;
