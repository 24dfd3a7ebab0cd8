#![allow(missing_docs)]

//! Core simulation types for the swing collision engine.
//!
//! Pendulum integration, platform contact, impact biomechanics, HIC and risk
//! classification, plus the per-run context that chains them tick by tick.

pub mod anthropometry;
pub mod biomech;
pub mod collision;
pub mod diagnostic;
pub mod hic;
pub mod kinematics;
pub mod pendulum;
pub mod risk;
pub mod sim;
pub mod sweep;

pub use anthropometry::{AnthropometricRecord, AnthropometricTable};
pub use biomech::ImpactType;
pub use diagnostic::{Checked, Diagnostic};
pub use pendulum::{PendulumState, Phase};
pub use risk::{InjuryMode, RiskAssessment, RiskLevel};
pub use sim::{compute_max_angle, CollisionOutcome, SimParams, SwingSimulation};
pub use sweep::{run_batch, sample_params, SweepBounds};
