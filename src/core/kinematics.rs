use crate::config::LBS_TO_KG;
use crate::error::{Error, Result};

/// Maximum swing angle (degrees from vertical) reached when the platform rises `height`
/// above its lowest point on a rope of `length`.
///
/// Errors:
/// - `Error::InvalidParameter` if `height > length` (a swing cannot rise above its pivot),
///   if `height` is negative or non-finite, or if `length` is not strictly positive.
pub fn max_angle_from_height(height: f64, length: f64) -> Result<f64> {
    if !length.is_finite() || length <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "swing length must be finite and > 0, got {length}"
        )));
    }
    if !height.is_finite() || height < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "swing height must be finite and >= 0, got {height}"
        )));
    }
    if height > length {
        return Err(Error::InvalidParameter(format!(
            "swing height {height} m exceeds swing length {length} m"
        )));
    }
    let cos_theta = 1.0 - height / length;
    Ok(cos_theta.acos().to_degrees())
}

/// Linear speed at the bottom of a drop from angle `theta` (rad), plus an externally
/// imparted `initial_velocity`. The result may be negative; sign conventions belong
/// to the caller.
#[inline]
pub fn velocity_from_angle(theta: f64, length: f64, initial_velocity: f64, gravity: f64) -> f64 {
    let drop = length * (1.0 - theta.cos());
    (2.0 * gravity * drop).sqrt() + initial_velocity
}

/// Tangential (linear) velocity of a bob moving at `omega` rad/s on a rope of `length`.
#[inline]
pub fn tangential_velocity(omega: f64, length: f64) -> f64 {
    omega * length
}

#[inline]
pub fn lbs_to_kg(pounds: f64) -> f64 {
    pounds * LBS_TO_KG
}
