//! Batch sweeps: many isolated runs over sampled parameter sets, executed in parallel.

use crate::config::EngineConfig;
use crate::core::anthropometry::{MAX_AGE, MIN_AGE};
use crate::core::biomech::ImpactType;
use crate::core::sim::{CollisionOutcome, SimParams, SwingSimulation};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Column names of [`outcome_row`], in order.
pub const ROW_COLUMNS: [&str; 11] = [
    "age",
    "max_height_m",
    "mass1_lbs",
    "mass2_lbs",
    "time_s",
    "relative_velocity",
    "pressure_mpa",
    "peak_acceleration_ms2",
    "hic",
    "worst_risk_rank",
    "is_safe",
];

/// Inclusive sampling ranges for [`sample_params`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepBounds {
    pub age: (u8, u8),
    pub max_height_m: (f64, f64),
    /// Shared by both swings; each mass is drawn independently.
    pub mass_lbs: (f64, f64),
    pub v_init: (f64, f64),
}

impl Default for SweepBounds {
    fn default() -> Self {
        Self {
            age: (MIN_AGE, MAX_AGE),
            max_height_m: (0.25, 2.25),
            mass_lbs: (20.0, 200.0),
            v_init: (0.0, 2.0),
        }
    }
}

impl SweepBounds {
    pub fn validate(&self) -> Result<()> {
        let (a0, a1) = self.age;
        if a0 > a1 || a0 < MIN_AGE || a1 > MAX_AGE {
            return Err(Error::InvalidParameter(format!(
                "age range must lie within {MIN_AGE}..={MAX_AGE}, got {a0}..={a1}"
            )));
        }
        check_range("max height", self.max_height_m, f64::MIN_POSITIVE)?;
        check_range("mass", self.mass_lbs, f64::MIN_POSITIVE)?;
        check_range("initial velocity", self.v_init, 0.0)?;
        Ok(())
    }
}

fn check_range(name: &str, (lo, hi): (f64, f64), floor: f64) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi || lo < floor {
        return Err(Error::InvalidParameter(format!(
            "{name} range [{lo}, {hi}] is invalid"
        )));
    }
    Ok(())
}

/// Draw `n` parameter sets uniformly within `bounds`.
///
/// `seed = None` draws a fresh seed from the thread RNG.
pub fn sample_params(n: usize, bounds: &SweepBounds, seed: Option<u64>) -> Result<Vec<SimParams>> {
    bounds.validate()?;
    let mut rng: StdRng = match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    };
    let out = (0..n)
        .map(|_| SimParams {
            age: rng.random_range(bounds.age.0..=bounds.age.1),
            max_height_m: rng.random_range(bounds.max_height_m.0..=bounds.max_height_m.1),
            mass1_lbs: rng.random_range(bounds.mass_lbs.0..=bounds.mass_lbs.1),
            mass2_lbs: rng.random_range(bounds.mass_lbs.0..=bounds.mass_lbs.1),
            v_init1: rng.random_range(bounds.v_init.0..=bounds.v_init.1),
            v_init2: rng.random_range(bounds.v_init.0..=bounds.v_init.1),
            impact_type: if rng.random::<bool>() {
                ImpactType::Frontal
            } else {
                ImpactType::Concentrated
            },
        })
        .collect();
    Ok(out)
}

/// Run every parameter set to its first collision (or the configured time cap).
///
/// Runs are independent: a failing parameter set yields its own `Err` and does not
/// affect the others. Results keep the input order.
pub fn run_batch(
    params: &[SimParams],
    config: &EngineConfig,
) -> Vec<Result<Option<CollisionOutcome>>> {
    info!(runs = params.len(), "starting batch sweep");
    params
        .par_iter()
        .map(|p| {
            let mut sim = SwingSimulation::new(*p, config.clone())?;
            sim.run_to_collision(None)
        })
        .inspect(|r| {
            if let Err(e) = r {
                warn!(error = %e, "sweep run failed");
            }
        })
        .collect()
}

/// Flatten one run into the numeric row described by [`ROW_COLUMNS`].
///
/// Outcome columns are NaN when the run ended without a collision.
pub fn outcome_row(params: &SimParams, outcome: Option<&CollisionOutcome>) -> [f64; 11] {
    let mut row = [f64::NAN; 11];
    row[0] = params.age as f64;
    row[1] = params.max_height_m;
    row[2] = params.mass1_lbs;
    row[3] = params.mass2_lbs;
    if let Some(o) = outcome {
        row[4] = o.time_s;
        row[5] = o.relative_velocity;
        row[6] = o.pressure_mpa;
        row[7] = o.peak_acceleration_ms2;
        row[8] = o.hic;
        row[9] = o.risk.worst().rank() as f64;
        row[10] = if o.is_safe() { 1.0 } else { 0.0 };
    }
    row
}
