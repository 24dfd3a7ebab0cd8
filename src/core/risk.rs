//! Injury risk classification against regulatory bands and vertebral strength.

use crate::config::{Band, ThresholdsConfig};
use crate::core::anthropometry::AnthropometricTable;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal likelihood of an injury mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Improbable,
    Possible,
    Probable,
    TresProbable,
}

impl RiskLevel {
    /// Display name shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            RiskLevel::Improbable => "Improbable",
            RiskLevel::Possible => "Possible",
            RiskLevel::Probable => "Probable",
            RiskLevel::TresProbable => "Très probable",
        }
    }

    /// 1-based rank (Improbable = 1).
    pub fn rank(&self) -> u8 {
        *self as u8 + 1
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The three injury modes the engine reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryMode {
    Decapitation,
    CervicalFracture,
    Concussion,
}

/// Neck-stress rule shared by decapitation and cervical fracture.
///
/// Below the band: improbable. Inside the closed band the age-specific vertebral
/// strength `(low, high)` decides. Above the band: très probable.
pub fn classify_neck_stress(pressure_mpa: f64, band: Band, strength: (f64, f64)) -> RiskLevel {
    if pressure_mpa < band.min {
        RiskLevel::Improbable
    } else if band.contains(pressure_mpa) {
        let (low, high) = strength;
        if pressure_mpa < low {
            RiskLevel::Improbable
        } else if pressure_mpa <= high {
            RiskLevel::Possible
        } else {
            RiskLevel::Probable
        }
    } else {
        RiskLevel::TresProbable
    }
}

/// Concussion rule: below 80% of the threshold improbable, below it possible,
/// otherwise probable. Both values in g.
pub fn classify_concussion(acceleration_g: f64, threshold_g: f64) -> RiskLevel {
    if acceleration_g < 0.8 * threshold_g {
        RiskLevel::Improbable
    } else if acceleration_g < threshold_g {
        RiskLevel::Possible
    } else {
        RiskLevel::Probable
    }
}

/// Overall safety verdict: HIC and acceleration within every regulatory limit.
///
/// A negative HIC is the "could not evaluate" sentinel and is never safe.
pub fn is_safe(hic: f64, acceleration_ms2: f64, thresholds: &ThresholdsConfig) -> bool {
    hic >= 0.0
        && hic <= thresholds.hic_limit
        && acceleration_ms2 <= thresholds.concussion_ms2()
        && acceleration_ms2 <= thresholds.peak_acceleration_ms2()
}

/// Risk levels for all three injury modes plus the safety verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub decapitation: RiskLevel,
    pub cervical_fracture: RiskLevel,
    pub concussion: RiskLevel,
    pub is_safe: bool,
}

impl RiskAssessment {
    pub fn level(&self, mode: InjuryMode) -> RiskLevel {
        match mode {
            InjuryMode::Decapitation => self.decapitation,
            InjuryMode::CervicalFracture => self.cervical_fracture,
            InjuryMode::Concussion => self.concussion,
        }
    }

    /// Highest level across the three modes.
    pub fn worst(&self) -> RiskLevel {
        self.decapitation
            .max(self.cervical_fracture)
            .max(self.concussion)
    }
}

/// Classify one impact for a child of `age`.
///
/// Errors:
/// - `Error::UnknownAge` when the table has no record for `age`.
pub fn assess(
    table: &AnthropometricTable,
    age: u8,
    pressure_mpa: f64,
    acceleration_ms2: f64,
    hic: f64,
    thresholds: &ThresholdsConfig,
) -> Result<RiskAssessment> {
    let strength = table.get(age)?.vertebral_strength_mpa;
    Ok(RiskAssessment {
        decapitation: classify_neck_stress(pressure_mpa, thresholds.decapitation_mpa, strength),
        cervical_fracture: classify_neck_stress(
            pressure_mpa,
            thresholds.cervical_fracture_mpa,
            strength,
        ),
        concussion: classify_concussion(
            acceleration_ms2 / thresholds.gravity,
            thresholds.concussion_g,
        ),
        is_safe: is_safe(hic, acceleration_ms2, thresholds),
    })
}
