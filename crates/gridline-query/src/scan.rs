//! Row scans with deadline enforcement.
//!
//! Both scan shapes check the deadline at chunk granularity: past the
//! deadline no further chunk is started, and the whole scan surfaces a
//! timeout. An already-started chunk runs to completion; its result is
//! discarded with the rest of the failed scan.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use gridline_model::Row;

use crate::error::{QueryError, Result};
use crate::matcher::TermMatcher;

/// Rows between deadline checks on the serial path.
const DEADLINE_CHECK_INTERVAL: usize = 256;

#[inline]
pub(crate) fn deadline_exceeded(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

pub(crate) fn timeout_error(
    operation: &'static str,
    start: Instant,
    limit: Duration,
) -> QueryError {
    QueryError::Timeout {
        operation,
        elapsed: start.elapsed(),
        limit,
    }
}

pub(crate) fn row_matches(row: &Row, targets: &[String], matcher: &TermMatcher) -> bool {
    targets
        .iter()
        .any(|column| matcher.matches(&row.value(column).display_text()))
}

/// Serial scan. Returns all matching indices in row order.
pub(crate) fn scan_serial(
    rows: &[Row],
    targets: &[String],
    matcher: &TermMatcher,
    start: Instant,
    deadline: Option<Instant>,
    limit: Duration,
) -> Result<Vec<usize>> {
    let mut matches = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if index % DEADLINE_CHECK_INTERVAL == 0 && deadline_exceeded(deadline) {
            return Err(timeout_error("search", start, limit));
        }
        if row_matches(row, targets, matcher) {
            matches.push(index);
        }
    }
    Ok(matches)
}

/// Worker-partitioned scan. Chunk order is preserved, so the flattened
/// result is in row order.
pub(crate) fn scan_parallel(
    rows: &[Row],
    targets: &[String],
    matcher: &TermMatcher,
    chunk_size: usize,
    start: Instant,
    deadline: Option<Instant>,
    limit: Duration,
) -> Result<Vec<usize>> {
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<(usize, &[Row])> = rows
        .chunks(chunk_size)
        .enumerate()
        .map(|(chunk, slice)| (chunk * chunk_size, slice))
        .collect();

    let per_chunk: Vec<Vec<usize>> = chunks
        .par_iter()
        .map(|&(base, slice)| {
            if deadline_exceeded(deadline) {
                return Err(timeout_error("search", start, limit));
            }
            Ok(slice
                .iter()
                .enumerate()
                .filter(|(_, row)| row_matches(row, targets, matcher))
                .map(|(offset, _)| base + offset)
                .collect())
        })
        .collect::<Result<_>>()?;

    Ok(per_chunk.into_iter().flatten().collect())
}
