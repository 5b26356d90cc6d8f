//! Custom business rules.
//!
//! Externally supplied predicates over whole rows. A rule that returns
//! an error is converted into a rule-failed finding on that row, so one
//! broken rule cannot abort validation of the rest of the row.

use std::fmt;
use std::sync::Arc;

use gridline_model::{Row, Severity, ValidationFinding};

type CustomCheck = Arc<dyn Fn(&Row) -> anyhow::Result<bool> + Send + Sync>;

pub struct CustomRule {
    name: String,
    message: String,
    severity: Severity,
    check: CustomCheck,
}

impl CustomRule {
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&Row) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            severity: Severity::Error,
            check: Arc::new(check),
        }
    }

    pub fn warning(
        name: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&Row) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(name, message, check)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn evaluate(&self, row: &Row, row_index: usize) -> Option<ValidationFinding> {
        match (self.check)(row) {
            Ok(true) => None,
            Ok(false) => Some(ValidationFinding::new(
                row_index,
                None,
                self.name.clone(),
                self.message.clone(),
                self.severity,
            )),
            Err(error) => {
                tracing::warn!(rule = %self.name, %error, "custom rule failed to execute");
                Some(ValidationFinding::new(
                    row_index,
                    None,
                    "rule-failed",
                    format!("rule '{}' failed: {error:#}", self.name),
                    Severity::Error,
                ))
            }
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}
