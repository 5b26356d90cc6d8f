//! Cross-column rules.
//!
//! Declared at grid/configuration level, not per column: each rule
//! relates named columns within a single row. Rules only judge rows
//! where the related values are actually present - presence itself is
//! the column layer's concern.

use std::fmt;
use std::sync::Arc;

use gridline_model::{CellValue, Row, Severity, ValidationFinding};

type CrossCheck = Arc<dyn Fn(&Row) -> bool + Send + Sync>;

pub struct CrossColumnRule {
    name: String,
    message: String,
    severity: Severity,
    columns: Vec<String>,
    check: CrossCheck,
}

impl CrossColumnRule {
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        columns: Vec<String>,
        check: impl Fn(&Row) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            severity: Severity::Error,
            columns,
            check: Arc::new(check),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// `start` must not be after `end` when both cells hold dates.
    pub fn date_ordering(start: &str, end: &str) -> Self {
        let (start_column, end_column) = (start.to_string(), end.to_string());
        Self::new(
            "date-ordering",
            format!("{start} must not be after {end}"),
            vec![start.to_string(), end.to_string()],
            move |row| match (row.value(&start_column), row.value(&end_column)) {
                (CellValue::Date(start), CellValue::Date(end)) => start <= end,
                _ => true,
            },
        )
    }

    /// Both cells must hold the same value when both are present.
    pub fn fields_equal(left: &str, right: &str) -> Self {
        let (left_column, right_column) = (left.to_string(), right.to_string());
        Self::new(
            "fields-equal",
            format!("{left} must equal {right}"),
            vec![left.to_string(), right.to_string()],
            move |row| {
                let (a, b) = (row.value(&left_column), row.value(&right_column));
                a.is_missing()
                    || b.is_missing()
                    || a.compare(b) == std::cmp::Ordering::Equal
            },
        )
    }

    /// When `leader` is populated, `follower` must be populated too.
    pub fn requires_together(leader: &str, follower: &str) -> Self {
        let (leader_column, follower_column) = (leader.to_string(), follower.to_string());
        Self::new(
            "requires-together",
            format!("{follower} is required when {leader} is set"),
            vec![leader.to_string(), follower.to_string()],
            move |row| {
                row.value(&leader_column).is_missing()
                    || !row.value(&follower_column).is_missing()
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn evaluate(&self, row: &Row, row_index: usize) -> Option<ValidationFinding> {
        if (self.check)(row) {
            None
        } else {
            Some(ValidationFinding::new(
                row_index,
                None,
                self.name.clone(),
                self.message.clone(),
                self.severity,
            ))
        }
    }
}

impl fmt::Debug for CrossColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossColumnRule")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}
