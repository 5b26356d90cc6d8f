//! Search strategy selection.
//!
//! Deterministic: depends only on the row count and the search mode.
//! Small datasets scan serially; medium ones scan in parallel; large
//! ones go through a prebuilt index where the mode allows one.

use gridline_model::SearchMode;

/// Row count at and above which scans fan out across workers.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1_000;
/// Row count at and above which prebuilt indexes pay for themselves.
pub const DEFAULT_INDEX_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Serial scan of every row.
    LinearScan,
    /// Worker-partitioned scan.
    ParallelScan,
    /// Exact-match lookup in a prebuilt hash index.
    HashLookup,
    /// Candidate lookup in a prebuilt trigram index, then verification.
    SubstringIndex,
    /// Worker-partitioned scan with a precompiled pattern.
    RegexScan,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::LinearScan => "linear-scan",
            SearchStrategy::ParallelScan => "parallel-scan",
            SearchStrategy::HashLookup => "hash-lookup",
            SearchStrategy::SubstringIndex => "substring-index",
            SearchStrategy::RegexScan => "regex-scan",
        }
    }
}

pub(crate) fn select(
    row_count: usize,
    mode: SearchMode,
    parallel_threshold: usize,
    index_threshold: usize,
) -> SearchStrategy {
    if row_count < parallel_threshold {
        return SearchStrategy::LinearScan;
    }
    if row_count < index_threshold {
        return SearchStrategy::ParallelScan;
    }
    match mode {
        SearchMode::Exact => SearchStrategy::HashLookup,
        SearchMode::Contains | SearchMode::Prefix => SearchStrategy::SubstringIndex,
        SearchMode::Regex => SearchStrategy::RegexScan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_follows_the_size_table() {
        let select = |rows, mode| {
            super::select(rows, mode, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_INDEX_THRESHOLD)
        };

        assert_eq!(
            select(999, SearchMode::Exact),
            SearchStrategy::LinearScan
        );
        assert_eq!(
            select(1_000, SearchMode::Regex),
            SearchStrategy::ParallelScan
        );
        assert_eq!(
            select(9_999, SearchMode::Contains),
            SearchStrategy::ParallelScan
        );
        assert_eq!(
            select(10_000, SearchMode::Exact),
            SearchStrategy::HashLookup
        );
        assert_eq!(
            select(10_000, SearchMode::Contains),
            SearchStrategy::SubstringIndex
        );
        assert_eq!(
            select(10_000, SearchMode::Prefix),
            SearchStrategy::SubstringIndex
        );
        assert_eq!(select(10_000, SearchMode::Regex), SearchStrategy::RegexScan);
    }
}
