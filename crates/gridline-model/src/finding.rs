//! Validation findings and the aggregate report.

use serde::{Deserialize, Serialize};

/// Finding severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must fix.
    Error,
    /// Should review.
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// A single validation outcome attached to a specific cell or row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Row the finding applies to (reporting context).
    pub row_index: usize,
    /// Column the finding applies to; `None` for row-level rules.
    pub column: Option<String>,
    /// Name of the rule that produced the finding.
    pub rule: String,
    /// Human-readable message.
    pub message: String,
    pub severity: Severity,
}

impl ValidationFinding {
    pub fn new(
        row_index: usize,
        column: Option<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            row_index,
            column,
            rule: rule.into(),
            message: message.into(),
            severity,
        }
    }

    /// Findings are deduplicated by `(column, message)`.
    pub fn dedup_key(&self) -> (Option<&str>, &str) {
        (self.column.as_deref(), &self.message)
    }
}

/// Drop findings that repeat an earlier `(column, message)` pair,
/// preserving first-occurrence order.
pub fn dedup_findings(findings: Vec<ValidationFinding>) -> Vec<ValidationFinding> {
    let mut seen: std::collections::BTreeSet<(Option<String>, String)> =
        std::collections::BTreeSet::new();
    findings
        .into_iter()
        .filter(|finding| {
            seen.insert((finding.column.clone(), finding.message.clone()))
        })
        .collect()
}

/// Aggregate result of a validate-all pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Rows actually processed (equals the row count on a full pass).
    pub rows_processed: usize,
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn findings_for_row(&self, row_index: usize) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(move |finding| finding.row_index == row_index)
    }
}
