use crate::core::kinematics::tangential_velocity;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Run state shared by both swings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Parameters set; angles and velocities held constant.
    #[default]
    Idle,
    /// Advancing once per tick.
    Running,
}

/// Angular state of one swing.
///
/// Fields:
/// - `theta`: angle from vertical rest (rad)
/// - `omega`: angular velocity (rad/s)
/// - `mass`: swing plus rider mass (kg, > 0)
/// - `pivot_x`: horizontal position of the suspension point (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    pub theta: f64,
    pub omega: f64,
    pub mass: f64,
    pub pivot_x: f64,
}

impl PendulumState {
    /// Create a new pendulum state after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParameter` if `mass` is non-positive or any value is NaN/inf.
    pub fn new(theta: f64, omega: f64, mass: f64, pivot_x: f64) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParameter("mass must be finite and > 0".into()));
        }
        if !theta.is_finite() || !omega.is_finite() {
            return Err(Error::InvalidParameter(
                "angle and angular velocity must be finite".into(),
            ));
        }
        if !pivot_x.is_finite() {
            return Err(Error::InvalidParameter("pivot offset must be finite".into()));
        }
        Ok(Self {
            theta,
            omega,
            mass,
            pivot_x,
        })
    }

    /// Angular acceleration under gravity and linear angular damping.
    #[inline]
    pub fn angular_acceleration(&self, gravity: f64, length: f64, damping: f64) -> f64 {
        -(gravity / length) * self.theta.sin() - (damping / self.mass) * self.omega
    }

    /// Advance one step of semi-implicit Euler: velocity first, then angle.
    #[inline]
    pub fn step(&mut self, dt: f64, gravity: f64, length: f64, damping: f64) {
        let alpha = self.angular_acceleration(gravity, length, damping);
        self.omega += alpha * dt;
        self.theta += self.omega * dt;
    }

    /// Mechanical energy relative to the rest position: kinetic + potential (J).
    pub fn energy(&self, gravity: f64, length: f64) -> f64 {
        let v = tangential_velocity(self.omega, length);
        0.5 * self.mass * v * v + self.mass * gravity * length * (1.0 - self.theta.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;
    const L: f64 = 2.25;
    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn new_pendulum_ok() -> Result<()> {
        let p = PendulumState::new(0.3, -0.1, 18.0, -2.0)?;
        assert_eq!(p.theta, 0.3);
        assert_eq!(p.omega, -0.1);
        assert_eq!(p.mass, 18.0);
        assert_eq!(p.pivot_x, -2.0);
        Ok(())
    }

    #[test]
    fn invalid_mass_rejected() {
        let err = PendulumState::new(0.0, 0.0, 0.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("mass"));
        assert!(PendulumState::new(0.0, 0.0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rest_position_is_equilibrium() -> Result<()> {
        let mut p = PendulumState::new(0.0, 0.0, 10.0, 0.0)?;
        for _ in 0..600 {
            p.step(DT, G, L, 0.02);
        }
        assert_eq!(p.theta, 0.0);
        assert_eq!(p.omega, 0.0);
        Ok(())
    }

    #[test]
    fn single_step_matches_formula() -> Result<()> {
        let mut p = PendulumState::new(0.5, 0.2, 2.0, 0.0)?;
        let alpha = -(G / L) * 0.5f64.sin() - (0.02 / 2.0) * 0.2;
        let omega = 0.2 + alpha * DT;
        let theta = 0.5 + omega * DT;
        p.step(DT, G, L, 0.02);
        assert_eq!(p.omega, omega);
        assert_eq!(p.theta, theta);
        Ok(())
    }

    #[test]
    fn stepping_is_reproducible() -> Result<()> {
        let mut a = PendulumState::new(1.2, 0.0, 18.1, -2.0)?;
        let mut b = a;
        for _ in 0..1000 {
            a.step(DT, G, L, 0.02);
            b.step(DT, G, L, 0.02);
        }
        assert_eq!(a.theta.to_bits(), b.theta.to_bits());
        assert_eq!(a.omega.to_bits(), b.omega.to_bits());
        Ok(())
    }

    /// Turning-point amplitudes `|θ|`, each refined by the parabola through the
    /// three samples around the sign change of `omega`.
    fn turning_amplitudes(mut p: PendulumState, ticks: usize) -> Vec<f64> {
        let mut peaks = Vec::new();
        let (mut t0, mut t1) = (p.theta, p.theta);
        let mut prev_omega = p.omega;
        for k in 0..ticks {
            p.step(DT, G, L, 0.02);
            let t2 = p.theta;
            if k >= 1 && prev_omega != 0.0 && p.omega.signum() != prev_omega.signum() {
                // t1 is the discrete extremum; fit t0, t1, t2.
                let curv = t2 - 2.0 * t1 + t0;
                let vertex = if curv != 0.0 {
                    t1 - (t2 - t0) * (t2 - t0) / (8.0 * curv)
                } else {
                    t1
                };
                peaks.push(vertex.abs());
            }
            prev_omega = p.omega;
            t0 = t1;
            t1 = t2;
        }
        peaks
    }

    #[test]
    fn damped_peaks_do_not_grow() -> Result<()> {
        // 40 lbs to 200 lbs riders, released from 0.5 rad up to the 1.5 m release angle.
        for mass in [18.14, 40.0, 90.7] {
            for theta0 in [0.5, 1.0, 1.23] {
                let p = PendulumState::new(theta0, 0.0, mass, 0.0)?;
                let peaks = turning_amplitudes(p, 60 * 60);
                assert!(peaks.len() >= 30, "expected many swings, got {}", peaks.len());
                // Same-side peaks, one full period apart.
                for (k, w) in peaks.windows(3).enumerate() {
                    assert!(
                        w[2] < w[0],
                        "mass {mass} theta0 {theta0}: peak {k} grew {} -> {}",
                        w[0],
                        w[2]
                    );
                }
                assert!(peaks[peaks.len() - 1] < theta0);
            }
        }
        Ok(())
    }

    #[test]
    fn turning_point_energy_decays() -> Result<()> {
        let mut p = PendulumState::new(1.0, 0.0, 90.7, 0.0)?;
        let e0 = p.energy(G, L);
        for _ in 0..(60 * 60) {
            p.step(DT, G, L, 0.02);
        }
        // Energy at the next turning point after a minute is pure potential.
        let amplitude = turning_amplitudes(p, 600)[0];
        let e1 = PendulumState::new(amplitude, 0.0, 90.7, 0.0)?.energy(G, L);
        assert!(e1 < e0, "energy grew: {e0} -> {e1}");
        Ok(())
    }

    #[test]
    fn energy_at_release_is_potential() -> Result<()> {
        let p = PendulumState::new(std::f64::consts::FRAC_PI_2, 0.0, 2.0, 0.0)?;
        assert!((p.energy(G, L) - 2.0 * G * L).abs() < 1e-9);
        Ok(())
    }
}
