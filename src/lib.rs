//! Deterministic two-swing collision engine.
//!
//! Two damped pendulums carry rigid seat platforms toward each other. Each tick
//! integrates both swings, tests the platforms for contact, and on the first
//! contact resolves an inelastic collision and estimates the load on a child's
//! head and neck: impact force, contact pressure, head acceleration, HIC15 and
//! a risk level for decapitation, cervical fracture and concussion.
//!
//! ```rust
//! use swingsim::core::{SimParams, SwingSimulation};
//!
//! let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
//! if let Some(outcome) = sim.run_to_collision(None)? {
//!     println!("HIC {:.0}, worst risk {}", outcome.hic, outcome.risk.worst());
//! }
//! # Ok::<(), swingsim::error::Error>(())
//! ```
//!
//! Python bindings live behind the `python` feature.

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;
