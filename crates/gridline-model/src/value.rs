//! Cell values.
//!
//! A row holds heterogeneous, schema-declared values without a per-type
//! row struct: `CellValue` is a tagged union over the supported primitive
//! kinds plus `Missing`. Conversions to a column's declared type live on
//! [`DataType`](crate::column::DataType), not here.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Missing,
}

impl CellValue {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Text rendering used for search matching and display.
    ///
    /// `Missing` renders as the empty string.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Int(n) => Cow::Owned(n.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            CellValue::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
            CellValue::Missing => Cow::Borrowed(""),
        }
    }

    /// Total order used by sort and the ordering filter operators.
    ///
    /// `Missing` sorts before everything; `Int` and `Float` compare
    /// numerically across variants; mixed kinds fall back to a fixed
    /// kind order (bool, number, date, text).
    pub fn compare(&self, other: &CellValue) -> Ordering {
        use CellValue::{Bool, Date, Float, Int, Missing, Text};

        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Missing, _) => Ordering::Less,
            (_, Missing) => Ordering::Greater,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            CellValue::Missing => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::Date(_) => 3,
            CellValue::Text(_) => 4,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sorts_first() {
        assert_eq!(
            CellValue::Missing.compare(&CellValue::Int(0)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Text(String::new()).compare(&CellValue::Missing),
            Ordering::Greater
        );
    }

    #[test]
    fn numbers_compare_across_variants() {
        assert_eq!(
            CellValue::Int(2).compare(&CellValue::Float(2.0)),
            Ordering::Equal
        );
        assert_eq!(
            CellValue::Float(1.5).compare(&CellValue::Int(2)),
            Ordering::Less
        );
    }

    #[test]
    fn display_text_renders_all_kinds() {
        assert_eq!(CellValue::Int(42).display_text(), "42");
        assert_eq!(CellValue::Bool(false).display_text(), "false");
        assert_eq!(CellValue::Missing.display_text(), "");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&CellValue::Int(7)).expect("serialize");
        assert_eq!(json, r#"{"kind":"Int","value":7}"#);

        let round: CellValue =
            serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round, CellValue::Int(7));
    }
}
