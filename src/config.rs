//! Engine configuration: swing geometry, integration constants and injury thresholds.
//!
//! Every tunable number of the engine lives here instead of being scattered as
//! magic constants. The defaults reproduce the CSA Z614-20 playground values.
//!
//! ```rust
//! use swingsim::config::{EngineConfig, ThresholdsConfig};
//!
//! let config = EngineConfig::default();
//! assert!((config.swing.length_m - 2.25).abs() < 1e-12);
//!
//! let pediatric = ThresholdsConfig::pediatric();
//! assert!(pediatric.concussion_g < config.thresholds.concussion_g);
//! ```
//!
//! ## Environment Variables
//!
//! - `SWINGSIM_THRESHOLD_PROFILE`: threshold preset (`pediatric`, `csa`, default)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Pounds to kilograms.
pub const LBS_TO_KG: f64 = 0.453592;

/// Default integration step: one animation frame at 60 Hz.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Environment variable selecting a thresholds preset.
pub const THRESHOLD_PROFILE_ENV: &str = "SWINGSIM_THRESHOLD_PROFILE";

/// Closed regulatory band `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `value` lies in the closed interval.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn check(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(Error::Config(format!(
                "{name} band must be finite with min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Swing geometry and integration constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingConfig {
    /// Rope length from pivot to platform centre (m). Pivots hang at this height.
    pub length_m: f64,
    /// Pivots sit at x = -half_span and x = +half_span (m).
    pub pivot_half_span_m: f64,
    /// Half of the platform (seat) width (m).
    pub platform_half_width_m: f64,
    /// Endpoint distance below which two platforms count as touching (m).
    pub contact_tolerance_m: f64,
    /// Linear angular damping coefficient.
    pub damping: f64,
    /// Coefficient of restitution used by the collision resolver.
    pub restitution: f64,
    /// Fixed integration step (s).
    pub dt_s: f64,
    /// Time cap for [`crate::core::SwingSimulation::run_to_collision`] (s).
    pub max_run_time_s: f64,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            length_m: 2.25,
            pivot_half_span_m: 2.0,
            platform_half_width_m: 0.5,
            contact_tolerance_m: 0.01,
            damping: 0.02,
            restitution: 0.5,
            dt_s: DEFAULT_DT,
            max_run_time_s: 10.0,
        }
    }
}

impl SwingConfig {
    /// Pivot height above the ground reference (equal to the rope length).
    #[inline]
    pub fn pivot_height_m(&self) -> f64 {
        self.length_m
    }

    /// Validate geometric and numeric invariants.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("length_m", self.length_m),
            ("pivot_half_span_m", self.pivot_half_span_m),
            ("platform_half_width_m", self.platform_half_width_m),
            ("contact_tolerance_m", self.contact_tolerance_m),
            ("dt_s", self.dt_s),
            ("max_run_time_s", self.max_run_time_s),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::Config(format!("{name} must be finite and > 0, got {v}")));
            }
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(Error::Config(format!(
                "damping must be finite and >= 0, got {}",
                self.damping
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(Error::Config(format!(
                "restitution must lie in [0, 1], got {}",
                self.restitution
            )));
        }
        Ok(())
    }
}

/// Regulatory and biomechanical thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    /// Assumed collision duration for the impulse-momentum force estimate (s).
    pub collision_time_s: f64,
    /// Neck stress band for decapitation (MPa).
    pub decapitation_mpa: Band,
    /// Neck stress band for cervical fracture (MPa).
    pub cervical_fracture_mpa: Band,
    /// Head acceleration causing concussion risk (g).
    pub concussion_g: f64,
    /// Maximum admissible Head Injury Criterion.
    pub hic_limit: f64,
    /// Maximum admissible peak head acceleration (g).
    pub peak_acceleration_g: f64,
    /// HIC sliding window (ms); 15 gives HIC15.
    pub hic_window_ms: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self::csa_z614()
    }
}

impl ThresholdsConfig {
    /// CSA Z614-20 values with the fixed 80 g concussion threshold.
    pub fn csa_z614() -> Self {
        Self {
            gravity: 9.81,
            collision_time_s: 0.01,
            decapitation_mpa: Band::new(5.0, 10.0),
            cervical_fracture_mpa: Band::new(3.0, 6.0),
            concussion_g: 80.0,
            hic_limit: 1000.0,
            peak_acceleration_g: 200.0,
            hic_window_ms: 15.0,
        }
    }

    /// Child-specific concussion threshold (50 g) on top of the CSA values.
    pub fn pediatric() -> Self {
        Self {
            concussion_g: 50.0,
            ..Self::csa_z614()
        }
    }

    /// Load from `SWINGSIM_THRESHOLD_PROFILE` or use the default.
    pub fn from_env_or_default() -> Self {
        match env::var(THRESHOLD_PROFILE_ENV)
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "pediatric" | "child" => Self::pediatric(),
            _ => Self::default(),
        }
    }

    /// Concussion threshold expressed in m/s².
    #[inline]
    pub fn concussion_ms2(&self) -> f64 {
        self.concussion_g * self.gravity
    }

    /// Peak acceleration threshold expressed in m/s².
    #[inline]
    pub fn peak_acceleration_ms2(&self) -> f64 {
        self.peak_acceleration_g * self.gravity
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("gravity", self.gravity),
            ("collision_time_s", self.collision_time_s),
            ("concussion_g", self.concussion_g),
            ("hic_limit", self.hic_limit),
            ("peak_acceleration_g", self.peak_acceleration_g),
            ("hic_window_ms", self.hic_window_ms),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::Config(format!("{name} must be finite and > 0, got {v}")));
            }
        }
        self.decapitation_mpa.check("decapitation")?;
        self.cervical_fracture_mpa.check("cervical fracture")?;
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    pub swing: SwingConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

impl EngineConfig {
    /// Default geometry with thresholds picked from the environment.
    pub fn from_env_or_default() -> Self {
        Self {
            swing: SwingConfig::default(),
            thresholds: ThresholdsConfig::from_env_or_default(),
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.swing.validate()?;
        self.thresholds.validate()
    }
}
