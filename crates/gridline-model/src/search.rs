//! Search parameters and results.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 1000;
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Matching semantics of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchMode {
    #[default]
    Contains,
    Exact,
    Prefix,
    Regex,
}

/// Search parameters.
///
/// Hashable so the whole options struct can take part in a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchOptions {
    /// Restrict matching to these columns; `None` searches every column.
    pub columns: Option<Vec<String>>,
    pub mode: SearchMode,
    pub case_sensitive: bool,
    /// Match whole words only (`Contains` mode).
    pub whole_word: bool,
    /// Cap on returned indices; the total match count is still exact.
    pub max_results: usize,
    pub timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            columns: None,
            mode: SearchMode::default(),
            case_sensitive: false,
            whole_word: false,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

/// Result of a completed search, retained on the grid state for caller
/// inspection and reused through the search cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matching row indices in original row order, capped at
    /// `max_results`.
    pub indices: Vec<usize>,
    /// Total matches found; may exceed `indices.len()` when capped.
    pub total_matches: usize,
    pub term: String,
    pub mode: SearchMode,
    pub elapsed: Duration,
}

impl SearchResult {
    /// Whether the result cap dropped any matching indices.
    pub fn truncated(&self) -> bool {
        self.total_matches > self.indices.len()
    }
}
