//! Row content fingerprints.
//!
//! The validation cache keys on a SHA-256 digest over the canonical byte
//! rendering of a row's values. Any cell mutation changes the digest, so
//! stale cache entries stop being addressable without explicit
//! invalidation.

use std::fmt;

use sha2::{Digest, Sha256};

use gridline_model::{CellValue, Row};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of_row(row: &Row) -> Self {
        let mut hasher = Sha256::new();
        for (name, value) in row.values() {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hash_value(&mut hasher, value);
        }
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..8])
    }
}

/// Canonical, collision-resistant byte rendering per value kind.
fn hash_value(hasher: &mut Sha256, value: &CellValue) {
    match value {
        CellValue::Text(text) => {
            hasher.update([1u8]);
            hasher.update((text.len() as u64).to_be_bytes());
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
