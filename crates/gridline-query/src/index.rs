//! Prebuilt search indexes for large datasets.
//!
//! Both indexes store case-folded cell text per column, so a single
//! build serves case-sensitive and case-insensitive queries: folded
//! lookups yield a candidate superset and the caller verifies candidates
//! against the compiled matcher.

use std::collections::{BTreeSet, HashMap};

use gridline_model::GridState;

/// Shortest term the trigram index can answer; shorter terms fall back
/// to a scan.
pub(crate) const MIN_TRIGRAM_TERM: usize = 3;

type Postings = HashMap<String, Vec<usize>>;

/// Exact-match index: folded cell text -> row indices, per column.
pub(crate) struct HashIndex {
    columns: HashMap<String, Postings>,
}

impl HashIndex {
    pub fn build(state: &GridState) -> Self {
        let mut columns = HashMap::new();
        for name in state.column_names() {
            let mut postings: Postings = HashMap::new();
            for (index, row) in state.rows().iter().enumerate() {
                let text = row.value(name).display_text().to_lowercase();
                postings.entry(text).or_default().push(index);
            }
            columns.insert(name.to_string(), postings);
        }
        Self { columns }
    }

    /// Candidate rows whose folded text equals `folded_term` in any
    /// target column, in ascending row order.
    pub fn lookup(&self, targets: &[String], folded_term: &str) -> Vec<usize> {
        let mut rows = BTreeSet::new();
        for target in targets {
            if let Some(list) = self
                .columns
                .get(target)
                .and_then(|postings| postings.get(folded_term))
            {
                rows.extend(list.iter().copied());
            }
        }
        rows.into_iter().collect()
    }
}

/// Substring index: folded trigram -> row indices, per column.
///
/// A row containing the term necessarily contains every trigram of the
/// term, so intersecting the posting lists yields a candidate superset.
pub(crate) struct TrigramIndex {
    columns: HashMap<String, Postings>,
}

impl TrigramIndex {
    pub fn build(state: &GridState) -> Self {
        let mut columns = HashMap::new();
        for name in state.column_names() {
            let mut postings: Postings = HashMap::new();
            for (index, row) in state.rows().iter().enumerate() {
                let text = row.value(name).display_text().to_lowercase();
                for gram in trigrams(&text) {
                    postings.entry(gram).or_default().push(index);
                }
            }
            columns.insert(name.to_string(), postings);
        }
        Self { columns }
    }

    /// Candidate rows for a contains/prefix query, in ascending row
    /// order. `None` when the term is too short for trigram lookup.
    pub fn candidates(&self, targets: &[String], folded_term: &str) -> Option<Vec<usize>> {
        let grams = trigrams(folded_term);
        if grams.is_empty() {
            return None;
        }

        let mut rows = BTreeSet::new();
        'columns: for target in targets {
            let Some(postings) = self.columns.get(target) else {
                continue;
            };
            let mut grams_iter = grams.iter();
            let Some(first) = grams_iter.next() else {
                continue;
            };
            let mut acc: BTreeSet<usize> = match postings.get(first) {
                Some(list) => list.iter().copied().collect(),
                None => continue 'columns,
            };
            for gram in grams_iter {
                let Some(list) = postings.get(gram) else {
                    continue 'columns;
                };
                let other: BTreeSet<usize> = list.iter().copied().collect();
                acc = acc.intersection(&other).copied().collect();
                if acc.is_empty() {
                    continue 'columns;
                }
            }
            rows.extend(acc);
        }
        Some(rows.into_iter().collect())
    }
}

fn trigrams(text: &str) -> BTreeSet<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < MIN_TRIGRAM_TERM {
        return BTreeSet::new();
    }
    chars
        .windows(MIN_TRIGRAM_TERM)
        .map(|window| window.iter().collect())
        .collect()
}
