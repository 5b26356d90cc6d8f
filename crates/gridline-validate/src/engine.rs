//! The validation engine.
//!
//! Stateless with respect to grid data: single-row validation runs
//! against a live state, validate-all runs batched against an owned
//! snapshot. The engine owns the fingerprint-keyed result cache, the
//! configured rule sets, and the bounded admission gate that keeps a
//! validate-all on a huge dataset from starving interactive work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use gridline_model::{
    ColumnDefinition, GridError, GridState, ProgressSink, Row, ValidationFinding,
    ValidationReport, dedup_findings,
};

use crate::cache::{CacheStats, ValidationCache};
use crate::error::{Result, ValidateError};
use crate::fingerprint::Fingerprint;
use crate::rules::{CrossColumnRule, CustomRule, column};

/// Default validation cache expiry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Tuning knobs for the validation engine.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Entries retained in the result cache.
    pub cache_capacity: usize,
    /// Expiry for cached findings; bounds staleness under continuous
    /// re-validation.
    pub cache_ttl: Duration,
    /// Permits on the admission gate.
    pub max_concurrency: usize,
    /// Rows per validate-all batch.
    pub batch_size: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_concurrency: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4),
            batch_size: 256,
        }
    }
}

pub struct ValidationEngine {
    config: ValidationConfig,
    cache: ValidationCache,
    gate: Arc<Semaphore>,
    cross_rules: Vec<CrossColumnRule>,
    custom_rules: Vec<CustomRule>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            cache: ValidationCache::new(config.cache_capacity, config.cache_ttl),
            gate: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            cross_rules: Vec::new(),
            custom_rules: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Register a cross-column rule. Rules run in registration order.
    pub fn add_cross_rule(&mut self, rule: CrossColumnRule) {
        self.cross_rules.push(rule);
    }

    /// Register a custom business rule. Rules run in registration order,
    /// after the cross-column layer.
    pub fn add_custom_rule(&mut self, rule: CustomRule) {
        self.custom_rules.push(rule);
    }

    /// Hit/miss counters of the result cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ========================================================================
    // Single row
    // ========================================================================

    /// Validate one row: column rules, cross-column rules, custom rules.
    ///
    /// Findings are deduplicated by `(column, message)`. Unchanged rows
    /// hit the fingerprint cache and skip rule execution entirely until
    /// the entry expires.
    pub fn validate_row(
        &self,
        state: &GridState,
        row_index: usize,
    ) -> Result<Vec<ValidationFinding>> {
        let row = state.row(row_index).ok_or(GridError::RowOutOfRange {
            index: row_index,
            len: state.row_count(),
        })?;
        Ok(self.validate_row_inner(state.columns(), row, row_index))
    }

    /// Validate one row and attach the findings to it.
    pub fn validate_row_mut(
        &self,
        state: &mut GridState,
        row_index: usize,
    ) -> Result<Vec<ValidationFinding>> {
        let findings = self.validate_row(&*state, row_index)?;
        state.set_row_findings(row_index, findings.clone())?;
        Ok(findings)
    }

    fn validate_row_inner(
        &self,
        columns: &[ColumnDefinition],
        row: &Row,
        row_index: usize,
    ) -> Vec<ValidationFinding> {
        let fingerprint = Fingerprint::of_row(row);
        if let Some(cached) = self.cache.get(row_index, fingerprint) {
            return cached;
        }

        let mut findings = column::validate_columns(columns, row, row_index);
        for rule in &self.cross_rules {
            findings.extend(rule.evaluate(row, row_index));
        }
        for rule in &self.custom_rules {
            findings.extend(rule.evaluate(row, row_index));
        }
        let findings = dedup_findings(findings);

        self.cache.put(row_index, fingerprint, findings.clone());
        findings
    }

    // ========================================================================
    // All rows
    // ========================================================================

    /// Validate every row of an owned snapshot, batched across blocking
    /// workers.
    ///
    /// Each batch is admitted through the bounded gate; past the
    /// deadline no new batch starts, in-flight batches are abandoned,
    /// and a timeout error is returned. Progress is reported after each
    /// completed batch with a monotonically increasing processed count.
    /// Individual row failures are findings in the report, never errors.
    pub async fn validate_all(
        self: &Arc<Self>,
        snapshot: Arc<GridState>,
        progress: Arc<dyn ProgressSink>,
        timeout: Option<Duration>,
    ) -> Result<ValidationReport> {
        let total = snapshot.row_count();
        let start = std::time::Instant::now();
        let deadline = timeout.map(|limit| tokio::time::Instant::now() + limit);
        let limit = timeout.unwrap_or(Duration::MAX);

        let mut tasks: JoinSet<(usize, Vec<ValidationFinding>)> = JoinSet::new();
        let mut begin = 0usize;
        while begin < total {
            if deadline.is_some_and(|deadline| tokio::time::Instant::now() >= deadline) {
                tasks.abort_all();
                return Err(ValidateError::Timeout {
                    elapsed: start.elapsed(),
                    limit,
                });
            }
            let end = (begin + self.config.batch_size.max(1)).min(total);
            let permit = Arc::clone(&self.gate)
                .acquire_owned()
                .await
                .map_err(|closed| ValidateError::Worker(closed.to_string()))?;
            let engine = Arc::clone(self);
            let snapshot = Arc::clone(&snapshot);
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let mut findings = Vec::new();
                for index in begin..end {
                    if let Some(row) = snapshot.row(index) {
                        findings.extend(engine.validate_row_inner(
                            snapshot.columns(),
                            row,
                            index,
                        ));
                    }
                }
                (end - begin, findings)
            });
            begin = end;
        }

        let mut report = ValidationReport::default();
        loop {
            let joined = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            tasks.abort_all();
                            return Err(ValidateError::Timeout {
                                elapsed: start.elapsed(),
                                limit,
                            });
                        }
                    }
                }
                None => tasks.join_next().await,
            };
            let Some(result) = joined else { break };
            let (count, findings) =
                result.map_err(|join_error| ValidateError::Worker(join_error.to_string()))?;
            report.rows_processed += count;
            report.findings.extend(findings);
            progress.report(report.rows_processed, total, "validate-all");
        }

        tracing::debug!(
            rows = report.rows_processed,
            findings = report.findings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "validate-all complete"
        );
        Ok(report)
    }

    /// Serial validate-all against a live state, reporting progress per
    /// batch. The synchronous twin of [`validate_all`](Self::validate_all)
    /// for callers without a runtime.
    pub fn validate_all_sync(
        &self,
        state: &GridState,
        progress: &dyn ProgressSink,
    ) -> ValidationReport {
        let total = state.row_count();
        let batch = self.config.batch_size.max(1);
        let mut report = ValidationReport::default();
        for (index, row) in state.rows().iter().enumerate() {
            report
                .findings
                .extend(self.validate_row_inner(state.columns(), row, index));
            report.rows_processed = index + 1;
            if report.rows_processed % batch == 0 || report.rows_processed == total {
                progress.report(report.rows_processed, total, "validate-all");
            }
        }
        report
    }
}

/// Write a validate-all report's findings back into a live state.
///
/// Only meaningful when the state is still at the version the report was
/// computed against; rows beyond the current row count are skipped.
pub fn apply_report(state: &mut GridState, report: &ValidationReport) -> Result<()> {
    let mut by_row: std::collections::BTreeMap<usize, Vec<ValidationFinding>> =
        std::collections::BTreeMap::new();
    for finding in &report.findings {
        by_row
            .entry(finding.row_index)
            .or_default()
            .push(finding.clone());
    }
    let rows = state.row_count().min(report.rows_processed);
    for index in 0..rows {
        state.set_row_findings(index, by_row.remove(&index).unwrap_or_default())?;
    }
    Ok(())
}
