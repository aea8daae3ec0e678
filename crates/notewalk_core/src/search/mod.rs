//! Full-text search entry points.
//!
//! # Responsibility
//! - Turn user query text into a store match expression.
//! - Keep the store's ranking; never re-rank.

mod fts;

pub use fts::{build_match_expression, search_notes, SearchError, SearchQuery, SearchResult};
