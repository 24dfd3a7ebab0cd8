//! Impact mechanics: force, neck contact surface, pressure and head acceleration.

use crate::core::anthropometry::AnthropometricTable;
use crate::core::diagnostic::{Checked, Diagnostic};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

/// Contact width assumed for a concentrated (lateral) impact (mm).
pub const CONCENTRATED_WIDTH_MM: f64 = 20.0;

/// Sampling step of the synthetic impact pulse (s).
pub const PULSE_STEP_S: f64 = 0.001;

/// How the seat edge meets the neck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactType {
    /// Full frontal contact across the neck diameter.
    Frontal,
    /// Narrow edge contact (fixed 20 mm width).
    Concentrated,
}

/// Impulse-momentum force estimate: `mass · velocity / collision_time` (N).
#[inline]
pub fn impact_force(velocity: f64, mass: f64, collision_time: f64) -> f64 {
    mass * velocity / collision_time
}

/// `m1·m2/(m1+m2)`; falls back to `m1` when the masses sum to zero.
#[inline]
pub fn reduced_mass(m1: f64, m2: f64) -> f64 {
    let total = m1 + m2;
    if total == 0.0 {
        m1
    } else {
        m1 * m2 / total
    }
}

/// Closing speed of two swings moving toward each other: `|v1| + |v2|`.
#[inline]
pub fn relative_velocity(v1: f64, v2: f64) -> f64 {
    v1.abs() + v2.abs()
}

/// Effective neck contact surface (cm²) for a child of `age`.
///
/// Errors:
/// - `Error::UnknownAge` when the table has no record for `age`.
pub fn impact_surface(table: &AnthropometricTable, age: u8, impact: ImpactType) -> Result<f64> {
    let rec = table.get(age)?;
    let neck_diameter_mm = rec.neck_circumference_mm / PI;
    let impact_height_mm = rec.neck_height_mm * (2.0 / 3.0);
    let surface_mm2 = match impact {
        ImpactType::Frontal => neck_diameter_mm * impact_height_mm,
        ImpactType::Concentrated => CONCENTRATED_WIDTH_MM * impact_height_mm,
    };
    Ok(surface_mm2 / 100.0)
}

/// Contact pressure in MPa (N/mm²) from a force in N and a surface in cm².
///
/// Errors:
/// - `Error::InvalidSurface` when `surface_cm2 <= 0`.
pub fn pressure(force: f64, surface_cm2: f64) -> Result<f64> {
    if surface_cm2.is_nan() || surface_cm2 <= 0.0 {
        return Err(Error::InvalidSurface(surface_cm2));
    }
    Ok(force / (surface_cm2 * 100.0))
}

/// Head acceleration (m/s²) from the impact force.
///
/// Degenerate inputs are data-quality issues, not failures: a non-positive head mass
/// yields 0 and a negative force uses its magnitude. Both are flagged and logged.
pub fn acceleration(force: f64, head_mass_kg: f64) -> Checked {
    if head_mass_kg <= 0.0 {
        let d = Diagnostic::NonPositiveHeadMass { head_mass_kg };
        warn!(diagnostic = %d, "degenerate acceleration input");
        return Checked::flagged(0.0, d);
    }
    if force < 0.0 {
        let d = Diagnostic::NegativeForce { force_n: force };
        warn!(diagnostic = %d, "degenerate acceleration input");
        return Checked::flagged(force.abs() / head_mass_kg, d);
    }
    Checked::clean(force / head_mass_kg)
}

/// Constant-acceleration pulse over the collision duration, sampled every millisecond.
///
/// The last sample lands exactly on `duration`.
pub fn impact_pulse(acceleration: f64, duration: f64) -> Vec<(f64, f64)> {
    if !(duration > 0.0) {
        return vec![(0.0, acceleration)];
    }
    // Guard against 0.01 / 0.001 landing a hair above an integer.
    let steps = (duration / PULSE_STEP_S - 1e-9).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|k| {
            let t = (k as f64 * PULSE_STEP_S).min(duration);
            (t, acceleration)
        })
        .collect()
}
