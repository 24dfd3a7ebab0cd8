use crate::config::{EngineConfig, SwingConfig};
use crate::core::anthropometry::AnthropometricTable;
use crate::core::biomech::{self, ImpactType};
use crate::core::collision;
use crate::core::diagnostic::Diagnostic;
use crate::core::hic;
use crate::core::kinematics::{lbs_to_kg, max_angle_from_height, tangential_velocity};
use crate::core::pendulum::{PendulumState, Phase};
use crate::core::risk::{self, RiskAssessment};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Input parameters of one run, as entered in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Child age in years (1 to 5).
    pub age: u8,
    /// Height the platforms are drawn back to (m), in (0, swing length].
    pub max_height_m: f64,
    /// Mass on swing 1 (lbs).
    pub mass1_lbs: f64,
    /// Mass on swing 2 (lbs).
    pub mass2_lbs: f64,
    /// Extra push given to swing 1 toward the centre (m/s, >= 0).
    pub v_init1: f64,
    /// Extra push given to swing 2 toward the centre (m/s, >= 0).
    pub v_init2: f64,
    pub impact_type: ImpactType,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            age: 3,
            max_height_m: 1.5,
            mass1_lbs: 40.0,
            mass2_lbs: 40.0,
            v_init1: 0.0,
            v_init2: 0.0,
            impact_type: ImpactType::Concentrated,
        }
    }
}

impl SimParams {
    /// Input checks normally done by the form before a run starts.
    ///
    /// Errors:
    /// - `Error::UnknownAge` when the table has no record for `age`.
    /// - `Error::InvalidParameter` for any other out-of-range value.
    pub fn validate(&self, table: &AnthropometricTable, swing: &SwingConfig) -> Result<()> {
        table.get(self.age)?;
        if !self.max_height_m.is_finite() || self.max_height_m <= 0.0 {
            return Err(Error::InvalidParameter("max height must be finite and > 0".into()));
        }
        if self.max_height_m > swing.length_m {
            return Err(Error::InvalidParameter(format!(
                "max height {} m exceeds swing length {} m",
                self.max_height_m, swing.length_m
            )));
        }
        for (name, m) in [("mass1", self.mass1_lbs), ("mass2", self.mass2_lbs)] {
            if !m.is_finite() || m <= 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be finite and > 0 lbs, got {m}"
                )));
            }
        }
        for (name, v) in [("v_init1", self.v_init1), ("v_init2", self.v_init2)] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be finite and >= 0 m/s, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything known about the first platform collision of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionOutcome {
    /// Echoed input parameters.
    pub params: SimParams,
    pub mass1_kg: f64,
    pub mass2_kg: f64,
    /// Tick index (1-based) at which contact was detected.
    pub tick: u64,
    /// Simulated time of contact (s).
    pub time_s: f64,
    /// Swing angles at contact (degrees from vertical).
    pub angle1_deg: f64,
    pub angle2_deg: f64,
    /// Tangential velocities just before contact (m/s).
    pub velocity1: f64,
    pub velocity2: f64,
    /// Tangential velocities just after contact (m/s).
    pub velocity1_after: f64,
    pub velocity2_after: f64,
    pub relative_velocity: f64,
    pub reduced_mass_kg: f64,
    pub force_n: f64,
    pub surface_cm2: f64,
    pub pressure_mpa: f64,
    pub acceleration_ms2: f64,
    pub peak_acceleration_ms2: f64,
    /// Head Injury Criterion of the impact pulse (negative when it could not be evaluated).
    pub hic: f64,
    pub risk: RiskAssessment,
    /// Data-quality issues raised while building the outcome.
    pub diagnostics: Vec<Diagnostic>,
}

impl CollisionOutcome {
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.risk.is_safe
    }
}

/// Maximum swing angle (degrees) for `height` on the default swing.
///
/// Errors:
/// - `Error::InvalidParameter` if `height` exceeds the swing length.
pub fn compute_max_angle(height: f64) -> Result<f64> {
    max_angle_from_height(height, SwingConfig::default().length_m)
}

/// Per-run simulation context: both swings, the run phase and the collision latch.
///
/// The context is owned by whoever drives the ticks; nothing in it is shared.
#[derive(Debug, Clone)]
pub struct SwingSimulation {
    config: EngineConfig,
    table: &'static AnthropometricTable,
    params: SimParams,
    max_angle_deg: f64,
    swing1: PendulumState,
    swing2: PendulumState,
    phase: Phase,
    collision_occurred: bool,
    tick: u64,
    time_now: f64,
}

impl SwingSimulation {
    /// Create an idle run from `params` under `config`.
    ///
    /// Errors: configuration errors from `config.validate()` or `params.validate()`.
    pub fn new(params: SimParams, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let table = AnthropometricTable::standard();
        let (swing1, swing2, max_angle_deg) = initial_states(&params, table, &config.swing)?;
        Ok(Self {
            config,
            table,
            params,
            max_angle_deg,
            swing1,
            swing2,
            phase: Phase::Idle,
            collision_occurred: false,
            tick: 0,
            time_now: 0.0,
        })
    }

    /// Create an idle run with the default configuration.
    pub fn with_defaults(params: SimParams) -> Result<Self> {
        Self::new(params, EngineConfig::default())
    }

    /// Reinitialise both swings from `params` without integrating.
    ///
    /// Clears the collision latch and returns to `Idle`. On error the previous state is kept.
    pub fn reset_state(&mut self, params: SimParams) -> Result<(PendulumState, PendulumState)> {
        let (swing1, swing2, max_angle_deg) =
            initial_states(&params, self.table, &self.config.swing)?;
        self.params = params;
        self.max_angle_deg = max_angle_deg;
        self.swing1 = swing1;
        self.swing2 = swing2;
        self.phase = Phase::Idle;
        self.collision_occurred = false;
        self.tick = 0;
        self.time_now = 0.0;
        info!(
            age = params.age,
            max_height_m = params.max_height_m,
            max_angle_deg,
            "swings reset"
        );
        Ok((swing1, swing2))
    }

    /// Reset with the current parameters.
    pub fn reset(&mut self) -> Result<(PendulumState, PendulumState)> {
        self.reset_state(self.params)
    }

    /// Idle → Running. A run whose collision already happened stays idle until reset.
    pub fn start(&mut self) -> bool {
        if self.collision_occurred {
            debug!("start ignored: collision already resolved, reset first");
            return false;
        }
        if self.phase != Phase::Running {
            info!(tick = self.tick, "simulation started");
        }
        self.phase = Phase::Running;
        true
    }

    /// Running → Idle.
    pub fn stop(&mut self) {
        if self.phase == Phase::Running {
            info!(tick = self.tick, "simulation stopped");
        }
        self.phase = Phase::Idle;
    }

    /// Advance one tick.
    ///
    /// While idle the state is held and `Ok(None)` is returned. While running both
    /// swings are integrated; on the first tick where the platforms meet the
    /// collision is resolved, the run goes idle and the outcome is returned.
    ///
    /// Errors:
    /// - `Error::InvalidParameter` if `dt_override` is not finite and > 0.
    pub fn tick(&mut self, dt_override: Option<f64>) -> Result<Option<CollisionOutcome>> {
        let dt = match dt_override {
            None => self.config.swing.dt_s,
            Some(dt) if dt.is_finite() && dt > 0.0 => dt,
            Some(dt) => {
                return Err(Error::InvalidParameter(format!(
                    "tick dt must be finite and > 0, got {dt}"
                )))
            }
        };
        if self.phase != Phase::Running {
            return Ok(None);
        }

        let g = self.config.thresholds.gravity;
        let swing = &self.config.swing;
        self.swing1.step(dt, g, swing.length_m, swing.damping);
        self.swing2.step(dt, g, swing.length_m, swing.damping);
        self.tick += 1;
        self.time_now += dt;

        if self.collision_occurred
            || !collision::platforms_collide(self.swing1.theta, self.swing2.theta, swing)
        {
            return Ok(None);
        }

        let before = (self.swing1.omega, self.swing2.omega);
        let Some(after) = self.resolve_collision()? else {
            return Ok(None);
        };
        self.phase = Phase::Idle;
        let outcome = self.build_outcome(before, after)?;
        debug!(
            tick = outcome.tick,
            time_s = outcome.time_s,
            relative_velocity = outcome.relative_velocity,
            pressure_mpa = outcome.pressure_mpa,
            hic = outcome.hic,
            "platform collision resolved"
        );
        Ok(Some(outcome))
    }

    /// Apply the restitution law to the current angular velocities, once per run.
    ///
    /// Returns the new angular velocities, or `None` when the latch is already set.
    pub fn resolve_collision(&mut self) -> Result<Option<(f64, f64)>> {
        if self.collision_occurred {
            return Ok(None);
        }
        let (w1, w2) = collision::resolve(
            self.swing1.omega,
            self.swing2.omega,
            self.swing1.mass,
            self.swing2.mass,
            self.config.swing.restitution,
            self.config.swing.length_m,
        )?;
        self.swing1.omega = w1;
        self.swing2.omega = w2;
        self.collision_occurred = true;
        Ok(Some((w1, w2)))
    }

    /// Start and tick until the first collision or `max_time` seconds of simulated
    /// time (the configured cap when `None`).
    ///
    /// Errors:
    /// - `Error::InvalidParameter` if `max_time` is not finite and > 0.
    pub fn run_to_collision(&mut self, max_time: Option<f64>) -> Result<Option<CollisionOutcome>> {
        let cap = max_time.unwrap_or(self.config.swing.max_run_time_s);
        if !cap.is_finite() || cap <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "max run time must be finite and > 0, got {cap}"
            )));
        }
        if !self.start() {
            return Ok(None);
        }
        while self.time_now < cap {
            if let Some(outcome) = self.tick(None)? {
                return Ok(Some(outcome));
            }
        }
        self.stop();
        Ok(None)
    }

    /// Maximum swing angle (degrees) for `height` on this run's swing.
    pub fn compute_max_angle(&self, height: f64) -> Result<f64> {
        max_angle_from_height(height, self.config.swing.length_m)
    }

    #[inline]
    pub fn pendulums(&self) -> (PendulumState, PendulumState) {
        (self.swing1, self.swing2)
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    #[inline]
    pub fn collision_occurred(&self) -> bool {
        self.collision_occurred
    }

    /// Number of integration ticks since the last reset.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated time since the last reset (s).
    #[inline]
    pub fn time(&self) -> f64 {
        self.time_now
    }

    #[inline]
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Release angle (degrees) derived from the current max height.
    #[inline]
    pub fn max_angle_deg(&self) -> f64 {
        self.max_angle_deg
    }

    // ============ Internal helpers ============

    fn build_outcome(&self, before: (f64, f64), after: (f64, f64)) -> Result<CollisionOutcome> {
        let t = &self.config.thresholds;
        let length = self.config.swing.length_m;
        let (m1, m2) = (self.swing1.mass, self.swing2.mass);
        let (v1, v2) = (
            tangential_velocity(before.0, length),
            tangential_velocity(before.1, length),
        );

        let relative_velocity = biomech::relative_velocity(v1, v2);
        let reduced_mass_kg = biomech::reduced_mass(m1, m2);
        let force_n = biomech::impact_force(relative_velocity, reduced_mass_kg, t.collision_time_s);
        let surface_cm2 = biomech::impact_surface(self.table, self.params.age, self.params.impact_type)?;
        let pressure_mpa = biomech::pressure(force_n, surface_cm2)?;
        let head_mass = self.table.get(self.params.age)?.head_mass_kg;

        let mut diagnostics = Vec::new();
        let accel = biomech::acceleration(force_n, head_mass);
        diagnostics.extend(accel.diagnostic);

        let pulse = biomech::impact_pulse(accel.value, t.collision_time_s);
        let peak_acceleration_ms2 = pulse.iter().map(|&(_, a)| a).fold(0.0, f64::max);
        let hic = hic::head_injury_criterion(&pulse, t.hic_window_ms, t.gravity, t.collision_time_s)?;
        diagnostics.extend(hic.diagnostic);

        let risk = risk::assess(
            self.table,
            self.params.age,
            pressure_mpa,
            peak_acceleration_ms2,
            hic.value,
            t,
        )?;

        Ok(CollisionOutcome {
            params: self.params,
            mass1_kg: m1,
            mass2_kg: m2,
            tick: self.tick,
            time_s: self.time_now,
            angle1_deg: self.swing1.theta.to_degrees(),
            angle2_deg: self.swing2.theta.to_degrees(),
            velocity1: v1,
            velocity2: v2,
            velocity1_after: tangential_velocity(after.0, length),
            velocity2_after: tangential_velocity(after.1, length),
            relative_velocity,
            reduced_mass_kg,
            force_n,
            surface_cm2,
            pressure_mpa,
            acceleration_ms2: accel.value,
            peak_acceleration_ms2,
            hic: hic.value,
            risk,
            diagnostics,
        })
    }
}

/// Mirror-image release: swing 1 drawn back to −θmax, swing 2 to +θmax, initial
/// pushes directed toward the centre.
fn initial_states(
    params: &SimParams,
    table: &AnthropometricTable,
    swing: &SwingConfig,
) -> Result<(PendulumState, PendulumState, f64)> {
    params.validate(table, swing)?;
    let max_angle_deg = max_angle_from_height(params.max_height_m, swing.length_m)?;
    let theta = max_angle_deg.to_radians();
    let length = swing.length_m;
    let swing1 = PendulumState::new(
        -theta,
        params.v_init1 / length,
        lbs_to_kg(params.mass1_lbs),
        -swing.pivot_half_span_m,
    )?;
    let swing2 = PendulumState::new(
        theta,
        -params.v_init2 / length,
        lbs_to_kg(params.mass2_lbs),
        swing.pivot_half_span_m,
    )?;
    Ok((swing1, swing2, max_angle_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::risk::RiskLevel;

    #[test]
    fn new_run_is_idle_at_release() -> Result<()> {
        let sim = SwingSimulation::with_defaults(SimParams::default())?;
        let (a, b) = sim.pendulums();
        assert_eq!(sim.phase(), Phase::Idle);
        assert!(!sim.collision_occurred());
        assert_eq!(a.theta, -b.theta);
        assert!(a.theta < 0.0);
        assert_eq!(a.pivot_x, -2.0);
        assert_eq!(b.pivot_x, 2.0);
        assert!((a.mass - 40.0 * crate::config::LBS_TO_KG).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn idle_tick_holds_state() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        let before = sim.pendulums();
        assert!(sim.tick(None)?.is_none());
        assert_eq!(sim.pendulums(), before);
        assert_eq!(sim.tick_count(), 0);
        Ok(())
    }

    #[test]
    fn running_tick_advances() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        let before = sim.pendulums();
        assert!(sim.start());
        sim.tick(None)?;
        let after = sim.pendulums();
        assert!(after.0.theta > before.0.theta);
        assert!(after.1.theta < before.1.theta);
        assert_eq!(sim.tick_count(), 1);
        sim.stop();
        let held = sim.pendulums();
        sim.tick(None)?;
        assert_eq!(sim.pendulums(), held);
        Ok(())
    }

    #[test]
    fn invalid_dt_override_rejected() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        assert!(matches!(sim.tick(Some(0.0)), Err(Error::InvalidParameter(_))));
        assert!(matches!(sim.tick(Some(f64::NAN)), Err(Error::InvalidParameter(_))));
        Ok(())
    }

    #[test]
    fn dt_override_is_used() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        sim.start();
        sim.tick(Some(0.005))?;
        assert!((sim.time() - 0.005).abs() < 1e-15);
        Ok(())
    }

    #[test]
    fn resolver_runs_once() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        sim.swing1.omega = 1.5;
        sim.swing2.omega = -1.5;
        let first = sim.resolve_collision()?;
        assert!(first.is_some());
        let latched = sim.pendulums();
        assert!(sim.resolve_collision()?.is_none());
        assert_eq!(sim.pendulums(), latched);
        Ok(())
    }

    #[test]
    fn collision_stops_run_and_blocks_restart() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        let outcome = sim.run_to_collision(None)?.expect("default swings collide");
        assert_eq!(sim.phase(), Phase::Idle);
        assert!(sim.collision_occurred());
        assert!(outcome.tick > 0);
        assert!(!sim.start());
        assert!(sim.tick(None)?.is_none());
        sim.reset()?;
        assert!(!sim.collision_occurred());
        assert!(sim.start());
        Ok(())
    }

    #[test]
    fn default_run_outcome_is_consistent() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        let o = sim.run_to_collision(None)?.expect("default swings collide");
        assert!(o.velocity1 > 0.0 && o.velocity2 < 0.0);
        assert!((o.relative_velocity - (o.velocity1.abs() + o.velocity2.abs())).abs() < 1e-12);
        assert!((o.surface_cm2 - 8.0).abs() < 1e-12);
        assert!((o.pressure_mpa - o.force_n / 800.0).abs() < 1e-9);
        assert!((o.acceleration_ms2 - o.force_n / 3.5).abs() < 1e-9);
        assert_eq!(o.peak_acceleration_ms2, o.acceleration_ms2);
        assert!(o.hic > 0.0);
        assert!(o.diagnostics.is_empty());
        // A head-on meeting of two 40 lbs swings at these speeds exceeds 6 MPa.
        assert_eq!(o.risk.cervical_fracture, RiskLevel::TresProbable);
        assert!(!o.is_safe());
        Ok(())
    }

    #[test]
    fn reset_rejects_bad_params_and_keeps_state() -> Result<()> {
        let mut sim = SwingSimulation::with_defaults(SimParams::default())?;
        let before = sim.pendulums();
        let bad = SimParams {
            max_height_m: 3.0,
            ..SimParams::default()
        };
        assert!(matches!(sim.reset_state(bad), Err(Error::InvalidParameter(_))));
        assert_eq!(sim.pendulums(), before);
        let bad_age = SimParams {
            age: 9,
            ..SimParams::default()
        };
        assert!(matches!(sim.reset_state(bad_age), Err(Error::UnknownAge(9))));
        Ok(())
    }

    #[test]
    fn params_validation() {
        let table = AnthropometricTable::standard();
        let swing = SwingConfig::default();
        assert!(SimParams::default().validate(table, &swing).is_ok());
        let neg_v = SimParams {
            v_init2: -1.0,
            ..SimParams::default()
        };
        assert!(neg_v.validate(table, &swing).is_err());
        let zero_mass = SimParams {
            mass1_lbs: 0.0,
            ..SimParams::default()
        };
        assert!(zero_mass.validate(table, &swing).is_err());
        let zero_height = SimParams {
            max_height_m: 0.0,
            ..SimParams::default()
        };
        assert!(zero_height.validate(table, &swing).is_err());
    }

    #[test]
    fn initial_push_points_to_centre() -> Result<()> {
        let params = SimParams {
            v_init1: 1.0,
            v_init2: 2.0,
            ..SimParams::default()
        };
        let sim = SwingSimulation::with_defaults(params)?;
        let (a, b) = sim.pendulums();
        assert!((a.omega - 1.0 / 2.25).abs() < 1e-12);
        assert!((b.omega + 2.0 / 2.25).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn compute_max_angle_default_length() -> Result<()> {
        assert_eq!(compute_max_angle(0.0)?, 0.0);
        assert!(compute_max_angle(2.3).is_err());
        Ok(())
    }
}
