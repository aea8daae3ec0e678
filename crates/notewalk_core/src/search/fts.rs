//! FTS5 query shaping over a [`NoteStore`].
//!
//! # Invariants
//! - Blank queries and a zero limit return an empty list without touching
//!   the store.
//! - Store syntax errors surface as `InvalidQuery` with the store message.

use crate::model::Note;
use crate::store::{NoteStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Default result cap, matching the desktop search page.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    /// Query text rejected by the FTS parser.
    InvalidQuery { query: String, message: String },
    Store(StoreError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SearchError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidQuery { query, message } => Self::InvalidQuery { query, message },
            other => Self::Store(other),
        }
    }
}

/// Search options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Maximum number of hits.
    pub limit: u32,
    /// Pass text to the store as a raw FTS5 expression.
    ///
    /// Default is `true`: the interactive `s` command accepts FTS syntax
    /// (`title:foo`, `"exact phrase"`, `term*`). When `false`, each
    /// whitespace-separated term is quoted and the terms are AND-joined.
    pub raw_fts_syntax: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            raw_fts_syntax: true,
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            raw_fts_syntax: false,
            ..Self::new(text)
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Runs `query` against `store` and returns notes in store order.
///
/// An empty result is not an error.
pub fn search_notes<S: NoteStore + ?Sized>(store: &S, query: &SearchQuery) -> SearchResult<Vec<Note>> {
    let Some(match_expr) = build_match_expression(query) else {
        return Ok(Vec::new());
    };
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let started_at = Instant::now();
    match store.search_notes(&match_expr, query.limit) {
        Ok(notes) => {
            info!(
                "event=search module=search status=ok hits={} raw={} duration_ms={}",
                notes.len(),
                query.raw_fts_syntax,
                started_at.elapsed().as_millis()
            );
            Ok(notes)
        }
        Err(err) => {
            let err = SearchError::from(err);
            warn!(
                "event=search module=search status=error invalid_query={} error={err}",
                matches!(err, SearchError::InvalidQuery { .. })
            );
            Err(err)
        }
    }
}

/// Builds the store match expression, `None` for blank input.
pub fn build_match_expression(query: &SearchQuery) -> Option<String> {
    let text = query.text.trim();
    if text.is_empty() {
        return None;
    }
    if query.raw_fts_syntax {
        return Some(text.to_string());
    }

    let terms = text
        .split_whitespace()
        .map(escape_fts_term)
        .collect::<Vec<_>>();
    if terms.is_empty() {
        return None;
    }
    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::{build_match_expression, search_notes, SearchError, SearchQuery};
    use crate::model::Note;
    use crate::store::MemoryNoteStore;

    #[test]
    fn literal_query_quotes_and_joins_terms() {
        let query = SearchQuery::literal("rust \"fts\"");
        assert_eq!(
            build_match_expression(&query).as_deref(),
            Some("\"rust\" AND \"\"\"fts\"\"\"")
        );
    }

    #[test]
    fn blank_query_returns_empty_without_store_call() {
        let store = MemoryNoteStore::new();
        store.insert_note(Note::new("n1", "f", "Hello", "Hello"));
        assert!(search_notes(&store, &SearchQuery::new("   ")).unwrap().is_empty());
    }

    #[test]
    fn zero_limit_returns_empty() {
        let store = MemoryNoteStore::new();
        store.insert_note(Note::new("n1", "f", "Hello", "Hello"));
        let query = SearchQuery::new("hello").with_limit(0);
        assert!(search_notes(&store, &query).unwrap().is_empty());
    }

    #[test]
    fn store_syntax_error_maps_to_invalid_query() {
        let store = MemoryNoteStore::new();
        let err = search_notes(&store, &SearchQuery::new("\"open")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery { .. }));
    }
}
