//! The query engine.
//!
//! Stateless with respect to grid data: every operation takes a
//! `GridState` and publishes its result back into it. The engine owns
//! only derived artifacts - the bounded result caches and the
//! version-stamped search indexes - so tests can construct one per case
//! and inspect cache behavior directly.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use sha2::{Digest, Sha256};

use gridline_model::{
    FilterExpression, GridState, LogicalOperator, SearchOptions, SearchResult,
};

use crate::cache::{CacheStats, FilterCache, FilterKey, SearchCache, SearchKey};
use crate::error::{QueryError, Result};
use crate::index::{HashIndex, MIN_TRIGRAM_TERM, TrigramIndex};
use crate::matcher::TermMatcher;
use crate::scan::{deadline_exceeded, row_matches, scan_parallel, scan_serial, timeout_error};
use crate::sort::{SortKey, sort_state};
use crate::strategy::{
    DEFAULT_INDEX_THRESHOLD, DEFAULT_PARALLEL_THRESHOLD, SearchStrategy, select,
};
use crate::versioned::Versioned;
use crate::predicate;

/// Tuning knobs for the query engine.
///
/// The defaults implement the documented strategy table; tests shrink
/// the thresholds to exercise every strategy on small datasets.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Entries retained per result cache.
    pub cache_capacity: usize,
    /// Row count at which scans fan out across workers.
    pub parallel_threshold: usize,
    /// Row count at which prebuilt indexes are used.
    pub index_threshold: usize,
    /// Rows per worker chunk in parallel scans.
    pub scan_chunk_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            index_threshold: DEFAULT_INDEX_THRESHOLD,
            scan_chunk_size: 2_048,
        }
    }
}

pub struct QueryEngine {
    config: QueryConfig,
    search_cache: SearchCache,
    filter_cache: FilterCache,
    hash_index: Mutex<Option<Versioned<HashIndex>>>,
    trigram_index: Mutex<Option<Versioned<TrigramIndex>>>,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    pub fn with_config(config: QueryConfig) -> Self {
        Self {
            search_cache: SearchCache::new(config.cache_capacity),
            filter_cache: FilterCache::new(config.cache_capacity),
            hash_index: Mutex::new(None),
            trigram_index: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Hit/miss counters of the search cache.
    pub fn search_cache_stats(&self) -> CacheStats {
        self.search_cache.stats()
    }

    /// Hit/miss counters of the filter cache.
    pub fn filter_cache_stats(&self) -> CacheStats {
        self.filter_cache.stats()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Search the grid for `term` and publish the result into the state.
    ///
    /// On a timeout the previously published `search_result` is left
    /// untouched. A cache hit (same term, options, and state version)
    /// short-circuits strategy selection entirely.
    pub fn search(
        &self,
        state: &mut GridState,
        term: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        if term.is_empty() {
            return Err(QueryError::EmptyTerm);
        }

        let key = SearchKey {
            term: term.to_string(),
            options: options.clone(),
            version: state.version(),
        };
        if let Some(hit) = self.search_cache.get(&key) {
            tracing::debug!(term, version = state.version(), "search cache hit");
            let result = (*hit).clone();
            state.set_search_result(result.clone());
            return Ok(result);
        }

        let targets = resolve_targets(state, options)?;
        let matcher = TermMatcher::compile(term, options)?;
        let start = Instant::now();
        let deadline = start.checked_add(options.timeout);
        let strategy = select(
            state.row_count(),
            options.mode,
            self.config.parallel_threshold,
            self.config.index_threshold,
        );

        let all_matches = match strategy {
            SearchStrategy::LinearScan => scan_serial(
                state.rows(),
                &targets,
                &matcher,
                start,
                deadline,
                options.timeout,
            )?,
            SearchStrategy::ParallelScan | SearchStrategy::RegexScan => scan_parallel(
                state.rows(),
                &targets,
                &matcher,
                self.config.scan_chunk_size,
                start,
                deadline,
                options.timeout,
            )?,
            SearchStrategy::HashLookup => {
                self.hash_lookup(state, &targets, term, options, &matcher, start, deadline)?
            }
            SearchStrategy::SubstringIndex => self.substring_lookup(
                state, &targets, term, options, &matcher, start, deadline,
            )?,
        };

        let total_matches = all_matches.len();
        let mut indices = all_matches;
        indices.truncate(options.max_results);

        let result = SearchResult {
            indices,
            total_matches,
            term: term.to_string(),
            mode: options.mode,
            elapsed: start.elapsed(),
        };
        tracing::debug!(
            term,
            strategy = strategy.as_str(),
            rows = state.row_count(),
            matches = result.total_matches,
            elapsed_us = result.elapsed.as_micros() as u64,
            "search complete"
        );

        state.set_search_result(result.clone());
        self.search_cache.put(key, Arc::new(result.clone()));
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn hash_lookup(
        &self,
        state: &GridState,
        targets: &[String],
        term: &str,
        options: &SearchOptions,
        matcher: &TermMatcher,
        start: Instant,
        deadline: Option<std::time::Instant>,
    ) -> Result<Vec<usize>> {
        if deadline_exceeded(deadline) {
            return Err(timeout_error("search", start, options.timeout));
        }
        let folded = term.to_lowercase();
        let candidates = {
            let mut guard = self
                .hash_index
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let versioned = guard
                .get_or_insert_with(|| Versioned::new(HashIndex::build(state), state.version()));
            if !versioned.is_current(state.version()) {
                *versioned = Versioned::new(HashIndex::build(state), state.version());
            }
            versioned.data.lookup(targets, &folded)
        };
        if deadline_exceeded(deadline) {
            return Err(timeout_error("search", start, options.timeout));
        }
        // Folded candidates are a superset for case-sensitive queries;
        // verify against the compiled matcher either way.
        Ok(verify_candidates(state, candidates, targets, matcher))
    }

    #[allow(clippy::too_many_arguments)]
    fn substring_lookup(
        &self,
        state: &GridState,
        targets: &[String],
        term: &str,
        options: &SearchOptions,
        matcher: &TermMatcher,
        start: Instant,
        deadline: Option<std::time::Instant>,
    ) -> Result<Vec<usize>> {
        let folded = term.to_lowercase();
        if folded.chars().count() < MIN_TRIGRAM_TERM {
            // Too short for trigram lookup; scan instead.
            return scan_parallel(
                state.rows(),
                targets,
                matcher,
                self.config.scan_chunk_size,
                start,
                deadline,
                options.timeout,
            );
        }
        if deadline_exceeded(deadline) {
            return Err(timeout_error("search", start, options.timeout));
        }
        let candidates = {
            let mut guard = self
                .trigram_index
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let versioned = guard.get_or_insert_with(|| {
                Versioned::new(TrigramIndex::build(state), state.version())
            });
            if !versioned.is_current(state.version()) {
                *versioned = Versioned::new(TrigramIndex::build(state), state.version());
            }
            versioned.data.candidates(targets, &folded)
        };
        if deadline_exceeded(deadline) {
            return Err(timeout_error("search", start, options.timeout));
        }
        match candidates {
            Some(candidates) => Ok(verify_candidates(state, candidates, targets, matcher)),
            None => scan_parallel(
                state.rows(),
                targets,
                matcher,
                self.config.scan_chunk_size,
                start,
                deadline,
                options.timeout,
            ),
        }
    }

    // ========================================================================
    // Filter
    // ========================================================================

    /// Compile the filter set, evaluate it over all rows, and publish
    /// `filtered_indices` into the state. Returns whether any row
    /// matched. An empty filter list clears filtering.
    pub fn apply_filters(
        &self,
        state: &mut GridState,
        filters: &[FilterExpression],
        connective: LogicalOperator,
    ) -> Result<bool> {
        if filters.is_empty() {
            state.set_filtered_indices(None)?;
            return Ok(true);
        }

        let key = FilterKey {
            digest: filter_digest(filters, connective),
            version: state.version(),
        };
        if let Some(hit) = self.filter_cache.get(&key) {
            tracing::debug!(version = state.version(), "filter cache hit");
            let matched = !hit.is_empty();
            state.set_filtered_indices(Some((*hit).clone()))?;
            return Ok(matched);
        }

        let predicate = predicate::compile(state.columns(), filters, connective)?;
        let indices = predicate::evaluate(state.rows(), &predicate, self.config.parallel_threshold);
        let matched = !indices.is_empty();
        tracing::debug!(
            filters = filters.len(),
            ?connective,
            rows = state.row_count(),
            matched = indices.len(),
            "filter applied"
        );

        self.filter_cache.put(key, Arc::new(indices.clone()));
        state.set_filtered_indices(Some(indices))?;
        Ok(matched)
    }

    // ========================================================================
    // Sort
    // ========================================================================

    /// Stable multi-key sort of the rows, or of the filtered view when a
    /// filter is active.
    pub fn sort(&self, state: &mut GridState, keys: &[SortKey]) -> Result<()> {
        sort_state(state, keys)
    }
}

/// Run a search on an owned snapshot as a background computation, raced
/// against the configured timeout.
///
/// The published-state side effect stays with the caller: republish the
/// returned result via `GridState::set_search_result` if the live state
/// is still at the snapshot's version.
pub async fn search_background(
    engine: Arc<QueryEngine>,
    mut snapshot: GridState,
    term: String,
    options: SearchOptions,
) -> Result<SearchResult> {
    let limit = options.timeout;
    let task =
        tokio::task::spawn_blocking(move || engine.search(&mut snapshot, &term, &options));
    match tokio::time::timeout(limit, task).await {
        Ok(joined) => joined.map_err(|join_error| QueryError::Worker(join_error.to_string()))?,
        Err(_) => Err(QueryError::Timeout {
            operation: "search",
            elapsed: limit,
            limit,
        }),
    }
}

fn resolve_targets(state: &GridState, options: &SearchOptions) -> Result<Vec<String>> {
    match &options.columns {
        Some(columns) => {
            for name in columns {
                if state.column(name).is_none() {
                    return Err(gridline_model::GridError::UnknownColumn {
                        name: name.clone(),
                    }
                    .into());
                }
            }
            Ok(columns.clone())
        }
        None => Ok(state
            .column_names()
            .into_iter()
            .map(String::from)
            .collect()),
    }
}

fn verify_candidates(
    state: &GridState,
    candidates: Vec<usize>,
    targets: &[String],
    matcher: &TermMatcher,
) -> Vec<usize> {
    candidates
        .into_iter()
        .filter(|&index| {
            state
                .row(index)
                .is_some_and(|row| row_matches(row, targets, matcher))
        })
        .collect()
}

/// Canonical digest of a filter set, used as the filter cache key.
fn filter_digest(filters: &[FilterExpression], connective: LogicalOperator) -> String {
    let mut hasher = Sha256::new();
    hasher.update(match connective {
        LogicalOperator::And => b"and",
        LogicalOperator::Or => b"or!",
    });
    for filter in filters {
        hasher.update(filter.column.as_bytes());
        hasher.update([0u8]);
        hasher.update(filter.operator.as_str().as_bytes());
        hasher.update([0u8]);
        hash_value(&mut hasher, &filter.value);
        if let Some(upper) = &filter.upper {
            hash_value(&mut hasher, upper);
        }
        for value in &filter.set {
            hash_value(&mut hasher, value);
        }
        hasher.update([0xff]);
    }
    hex::encode(hasher.finalize())
}

fn hash_value(hasher: &mut Sha256, value: &gridline_model::CellValue) {
    use gridline_model::CellValue;
    match value {
        CellValue::Text(text) => {
            hasher.update([1u8]);
            hasher.update(text.as_bytes());
        }
        CellValue::Int(number) => {
            hasher.update([2u8]);
            hasher.update(number.to_be_bytes());
        }
        CellValue::Float(number) => {
            hasher.update([3u8]);
            hasher.update(number.to_bits().to_be_bytes());
        }
        CellValue::Bool(flag) => hasher.update([4u8, u8::from(*flag)]),
        CellValue::Date(date) => {
            hasher.update([5u8]);
            hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
        }
        CellValue::Missing => hasher.update([6u8]),
    }
}
