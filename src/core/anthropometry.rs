use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Youngest age covered by the standard table.
pub const MIN_AGE: u8 = 1;
/// Oldest age covered by the standard table.
pub const MAX_AGE: u8 = 5;

/// Neck and head measurements of a child of a given age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnthropometricRecord {
    /// Neck circumference (mm).
    pub neck_circumference_mm: f64,
    /// Neck height (mm).
    pub neck_height_mm: f64,
    /// Vertebral strength range `[low, high]` (MPa).
    pub vertebral_strength_mpa: (f64, f64),
    /// Head mass (kg).
    pub head_mass_kg: f64,
}

/// Immutable age → measurements table.
///
/// Built once and shared by reference; batch runs read it concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct AnthropometricTable {
    records: [AnthropometricRecord; (MAX_AGE - MIN_AGE + 1) as usize],
}

const fn rec(circ: f64, height: f64, low: f64, high: f64, head: f64) -> AnthropometricRecord {
    AnthropometricRecord {
        neck_circumference_mm: circ,
        neck_height_mm: height,
        vertebral_strength_mpa: (low, high),
        head_mass_kg: head,
    }
}

static STANDARD: AnthropometricTable = AnthropometricTable {
    records: [
        rec(200.0, 45.0, 4.0, 8.0, 3.0),
        rec(210.0, 50.0, 4.5, 8.5, 3.2),
        rec(225.0, 60.0, 5.0, 9.0, 3.5),
        rec(235.0, 65.0, 5.0, 9.5, 3.7),
        rec(245.0, 70.0, 5.0, 10.0, 4.0),
    ],
};

impl AnthropometricTable {
    /// Reference measurements for ages 1 to 5.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Look up the record for `age`.
    ///
    /// Errors:
    /// - `Error::UnknownAge` when `age` is outside 1..=5.
    pub fn get(&self, age: u8) -> Result<&AnthropometricRecord> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(Error::UnknownAge(age));
        }
        Ok(&self.records[(age - MIN_AGE) as usize])
    }

    /// Ages covered by the table, ascending.
    pub fn ages(&self) -> impl Iterator<Item = u8> {
        MIN_AGE..=MAX_AGE
    }
}
