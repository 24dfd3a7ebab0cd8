use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-quality condition recovered locally instead of aborting a run.
///
/// Every diagnostic is logged at warn level where it is raised and attached to the
/// value it affected, so the caller always sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Head mass was not positive; acceleration reported as 0.
    NonPositiveHeadMass { head_mass_kg: f64 },
    /// Force was negative; its magnitude was used.
    NegativeForce { force_n: f64 },
    /// HIC needs at least two samples.
    HicTooFewSamples { count: usize },
    /// All HIC samples share one timestamp.
    HicIdenticalTimestamps,
    /// Resampling produced fewer than two points.
    HicResampleTooShort,
    /// No positive-average window; the whole profile was used as one window.
    HicWholeProfileFallback { span_s: f64 },
    /// No positive-average window and no usable fallback; HIC reported as 0.
    HicNoPositiveWindow,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NonPositiveHeadMass { head_mass_kg } => {
                write!(f, "head mass {head_mass_kg} kg is not positive; acceleration set to 0")
            }
            Diagnostic::NegativeForce { force_n } => {
                write!(f, "negative force {force_n} N; using its magnitude")
            }
            Diagnostic::HicTooFewSamples { count } => {
                write!(f, "HIC needs at least 2 samples, got {count}")
            }
            Diagnostic::HicIdenticalTimestamps => write!(f, "all HIC timestamps are identical"),
            Diagnostic::HicResampleTooShort => write!(f, "resampled HIC profile too short"),
            Diagnostic::HicWholeProfileFallback { span_s } => write!(
                f,
                "no positive HIC window; whole {span_s} s profile used as fallback"
            ),
            Diagnostic::HicNoPositiveWindow => {
                write!(f, "no positive-average HIC window; HIC reported as 0")
            }
        }
    }
}

/// A best-effort value with the diagnostic raised while computing it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checked {
    pub value: f64,
    pub diagnostic: Option<Diagnostic>,
}

impl Checked {
    #[inline]
    pub fn clean(value: f64) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    #[inline]
    pub fn flagged(value: f64, diagnostic: Diagnostic) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }
}
