//! Platform collision detection and inelastic velocity resolution.
//!
//! Detection is a discrete per-tick check: the two seat segments must either cross
//! or bring an endpoint pair within the contact tolerance. The tolerance catches
//! "kissing" contact that the fixed-step integrator would otherwise step over.

use crate::config::SwingConfig;
use crate::core::kinematics::tangential_velocity;
use crate::error::{Error, Result};

/// Spatial dimension of the swing plane.
pub const DIM: usize = 2;

/// A point in the swing plane (x to the right, y up).
pub type Point = [f64; DIM];

/// A platform modelled as a rigid segment centred on the pendulum bob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    /// Platform of a swing hanging from `pivot` at angle `theta`.
    pub fn platform(theta: f64, pivot: Point, length: f64, half_width: f64) -> Self {
        let (s, c) = theta.sin_cos();
        let bob = [pivot[0] + length * s, pivot[1] - length * c];
        Self {
            a: [bob[0] - half_width * c, bob[1] - half_width * s],
            b: [bob[0] + half_width * c, bob[1] + half_width * s],
        }
    }

    /// Strict segment crossing by orientation comparisons.
    pub fn intersects(&self, other: &Segment) -> bool {
        ccw(&self.a, &other.a, &other.b) != ccw(&self.b, &other.a, &other.b)
            && ccw(&self.a, &self.b, &other.a) != ccw(&self.a, &self.b, &other.b)
    }

    /// Smallest distance between an endpoint of `self` and an endpoint of `other`.
    pub fn min_endpoint_distance(&self, other: &Segment) -> f64 {
        [
            dist(&self.a, &other.a),
            dist(&self.a, &other.b),
            dist(&self.b, &other.a),
            dist(&self.b, &other.b),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }
}

/// Both platform segments for a snapshot of the two swings.
pub fn platforms(theta1: f64, theta2: f64, swing: &SwingConfig) -> (Segment, Segment) {
    let y = swing.pivot_height_m();
    let p1 = Segment::platform(
        theta1,
        [-swing.pivot_half_span_m, y],
        swing.length_m,
        swing.platform_half_width_m,
    );
    let p2 = Segment::platform(
        theta2,
        [swing.pivot_half_span_m, y],
        swing.length_m,
        swing.platform_half_width_m,
    );
    (p1, p2)
}

/// True when the platforms cross or touch within the contact tolerance.
pub fn platforms_collide(theta1: f64, theta2: f64, swing: &SwingConfig) -> bool {
    let (p1, p2) = platforms(theta1, theta2, swing);
    p1.intersects(&p2) || p1.min_endpoint_distance(&p2) < swing.contact_tolerance_m
}

/// Post-collision angular velocities.
///
/// Tangential velocities `v = ω·L` are combined with the 1-D restitution law
/// `v1' = (m1 v1 + m2 v2 − m2 e (v2 − v1)) / (m1 + m2)` and
/// `v2' = (m1 v1 + m2 v2 + m1 e (v2 − v1)) / (m1 + m2)`, then divided back by `L`.
///
/// Errors:
/// - `Error::InvalidParameter` if a mass is non-positive, `length` is non-positive,
///   or `restitution` is outside `[0, 1]`.
pub fn resolve(
    omega1: f64,
    omega2: f64,
    m1: f64,
    m2: f64,
    restitution: f64,
    length: f64,
) -> Result<(f64, f64)> {
    if !(m1 > 0.0 && m2 > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "collision masses must be > 0, got {m1} and {m2}"
        )));
    }
    if !length.is_finite() || length <= 0.0 {
        return Err(Error::InvalidParameter("swing length must be > 0".into()));
    }
    if !(0.0..=1.0).contains(&restitution) {
        return Err(Error::InvalidParameter(format!(
            "restitution must lie in [0, 1], got {restitution}"
        )));
    }
    let (v1, v2) = (tangential_velocity(omega1, length), tangential_velocity(omega2, length));
    let momentum = m1 * v1 + m2 * v2;
    let total = m1 + m2;
    let dv = v2 - v1;
    let v1p = (momentum - m2 * restitution * dv) / total;
    let v2p = (momentum + m1 * restitution * dv) / total;
    Ok((v1p / length, v2p / length))
}

// ============ Utility helpers ============

#[inline]
fn ccw(a: &Point, b: &Point, c: &Point) -> bool {
    (c[1] - a[1]) * (b[0] - a[0]) > (b[1] - a[1]) * (c[0] - a[0])
}

#[inline]
fn dist(a: &Point, b: &Point) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
