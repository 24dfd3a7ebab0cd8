//! Head Injury Criterion over an acceleration-time profile.
//!
//! `HIC = max over (t1, t2), t2 − t1 ≤ window, of (ā / g)^2.5 · (t2 − t1)` where ā is the
//! trapezoidal mean acceleration on `[t1, t2]`. The profile is first resampled onto a
//! uniform grid at half the window width.

use crate::core::diagnostic::{Checked, Diagnostic};
use crate::error::{Error, Result};
use ordered_float::NotNan;
use tracing::warn;

/// Value reported when the profile cannot be evaluated at all.
pub const HIC_SENTINEL: f64 = -1.0;

/// Default window for HIC15 (ms).
pub const DEFAULT_WINDOW_MS: f64 = 15.0;

/// Tolerance for time comparisons on the resampled grid.
const EPS_TIME: f64 = 1e-12;

/// Largest resampled grid accepted. At HIC15 (7.5 ms steps) this covers 750 s of profile.
pub const MAX_RESAMPLE_POINTS: usize = 100_000;

/// A single `(time s, acceleration m/s²)` sample with an orderable timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    t: NotNan<f64>,
    a: f64,
}

impl Sample {
    #[inline]
    fn time(&self) -> f64 {
        self.t.into_inner()
    }
}

/// Compute the HIC of `profile` (samples in any order).
///
/// Degenerate profiles are reported through the returned diagnostic (and a warning
/// log), with [`HIC_SENTINEL`] or 0 as value.
///
/// Errors:
/// - `Error::InvalidParameter` if a timestamp is NaN/inf, if `window_ms` or `gravity` is
///   not > 0, or if the profile would resample to more than [`MAX_RESAMPLE_POINTS`].
pub fn head_injury_criterion(
    profile: &[(f64, f64)],
    window_ms: f64,
    gravity: f64,
    collision_time: f64,
) -> Result<Checked> {
    if !window_ms.is_finite() || window_ms <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "HIC window must be finite and > 0 ms, got {window_ms}"
        )));
    }
    if !gravity.is_finite() || gravity <= 0.0 {
        return Err(Error::InvalidParameter("gravity must be finite and > 0".into()));
    }
    if profile.len() < 2 {
        return Ok(soft_fail(
            HIC_SENTINEL,
            Diagnostic::HicTooFewSamples {
                count: profile.len(),
            },
        ));
    }

    let mut sorted = Vec::with_capacity(profile.len());
    for &(t, a) in profile {
        if !t.is_finite() {
            return Err(Error::InvalidParameter("sample time must be finite".into()));
        }
        let t = NotNan::new(t)
            .map_err(|_| Error::InvalidParameter("sample time cannot be NaN".into()))?;
        sorted.push(Sample { t, a });
    }
    sorted.sort_by_key(|s| s.t);

    let (first, last) = (sorted[0].time(), sorted[sorted.len() - 1].time());
    if first == last {
        return Ok(soft_fail(HIC_SENTINEL, Diagnostic::HicIdenticalTimestamps));
    }

    let window = window_ms / 1000.0;
    let step = window / 2.0;
    let points = ((last - first) / step).floor() + 1.0;
    if points > MAX_RESAMPLE_POINTS as f64 {
        return Err(Error::InvalidParameter(format!(
            "profile span {} s needs {points} resampled points, limit is {MAX_RESAMPLE_POINTS}",
            last - first
        )));
    }
    let grid = resample(&sorted, first, last, step);
    if grid.len() < 2 {
        return Ok(soft_fail(HIC_SENTINEL, Diagnostic::HicResampleTooShort));
    }

    // Running trapezoidal integral: cum[k] = ∫ a dt over [grid[0], grid[k]].
    let mut cum = Vec::with_capacity(grid.len());
    cum.push(0.0);
    for w in grid.windows(2) {
        let dt = w[1].0 - w[0].0;
        let prev = cum[cum.len() - 1];
        cum.push(prev + 0.5 * (w[0].1 + w[1].1) * dt);
    }

    let mut best = 0.0_f64;
    for i in 0..grid.len() - 1 {
        for j in (i + 1)..grid.len() {
            let dt = grid[j].0 - grid[i].0;
            if dt > window + EPS_TIME {
                break;
            }
            if dt <= 0.0 {
                continue;
            }
            let avg = (cum[j] - cum[i]) / dt;
            if avg > 0.0 {
                best = best.max(hic_of(avg, dt, gravity));
            }
        }
    }
    if best > 0.0 {
        return Ok(Checked::clean(best));
    }

    // No positive window: treat the whole profile as one impact if it fits the
    // collision duration.
    let span = last - first;
    if span > 0.0 && span <= collision_time + EPS_TIME {
        let integral: f64 = sorted
            .windows(2)
            .map(|w| {
                let dt = w[1].time() - w[0].time();
                if dt > 0.0 {
                    0.5 * (w[0].a + w[1].a) * dt
                } else {
                    0.0
                }
            })
            .sum();
        let avg = integral / span;
        if avg > 0.0 {
            return Ok(soft_fail(
                hic_of(avg, span, gravity),
                Diagnostic::HicWholeProfileFallback { span_s: span },
            ));
        }
    }
    Ok(soft_fail(0.0, Diagnostic::HicNoPositiveWindow))
}

/// HIC15 with the default window.
pub fn hic15(profile: &[(f64, f64)], gravity: f64, collision_time: f64) -> Result<Checked> {
    head_injury_criterion(profile, DEFAULT_WINDOW_MS, gravity, collision_time)
}

// ============ Internal helpers ============

#[inline]
fn hic_of(avg_accel: f64, dt: f64, gravity: f64) -> f64 {
    (avg_accel / gravity).powf(2.5) * dt
}

fn soft_fail(value: f64, diagnostic: Diagnostic) -> Checked {
    warn!(diagnostic = %diagnostic, value = value, "degenerate HIC profile");
    Checked::flagged(value, diagnostic)
}

/// Uniform grid from `first` to `last` (inclusive when it lands exactly) at `step`.
fn resample(sorted: &[Sample], first: f64, last: f64, step: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    let mut k = 0usize;
    loop {
        let t = first + k as f64 * step;
        if t > last {
            break;
        }
        out.push((t, interpolate(sorted, t)));
        k += 1;
    }
    out
}

/// Linear interpolation; nearest boundary sample outside the sampled range.
fn interpolate(sorted: &[Sample], t: f64) -> f64 {
    let idx = sorted.partition_point(|s| s.time() <= t);
    if idx == 0 {
        return sorted[0].a;
    }
    if idx == sorted.len() {
        return sorted[sorted.len() - 1].a;
    }
    let (s0, s1) = (&sorted[idx - 1], &sorted[idx]);
    let (t0, t1) = (s0.time(), s1.time());
    let frac = (t - t0) / (t1 - t0);
    s0.a + frac * (s1.a - s0.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;
    const TC: f64 = 0.01;

    fn flat(a: f64, span: f64, n: usize) -> Vec<(f64, f64)> {
        (0..=n).map(|k| (span * k as f64 / n as f64, a)).collect()
    }

    #[test]
    fn constant_pulse_over_collision_time() -> Result<()> {
        let r = hic15(&flat(500.0, 0.01, 10), G, TC)?;
        // Grid points 0 and 7.5 ms only.
        let expected = (500.0 / G).powf(2.5) * 0.0075;
        assert!(r.diagnostic.is_none());
        assert!((r.value - expected).abs() < 1e-9 * expected);
        Ok(())
    }

    #[test]
    fn long_pulse_limited_to_window() -> Result<()> {
        let a = 300.0;
        let r = hic15(&flat(a, 0.03, 30), G, TC)?;
        let expected = (a / G).powf(2.5) * 0.015;
        assert!((r.value - expected).abs() < 1e-6 * expected);
        Ok(())
    }

    #[test]
    fn order_of_samples_does_not_matter() -> Result<()> {
        let mut profile = vec![(0.0, 0.0), (0.005, 800.0), (0.010, 1200.0), (0.02, 100.0)];
        let sorted = hic15(&profile, G, TC)?;
        profile.reverse();
        let shuffled = hic15(&profile, G, TC)?;
        assert_eq!(sorted.value, shuffled.value);
        assert!(sorted.value > 0.0);
        Ok(())
    }

    #[test]
    fn flat_zero_profile_is_zero() -> Result<()> {
        let r = hic15(&flat(0.0, 0.01, 10), G, TC)?;
        assert_eq!(r.value, 0.0);
        assert_eq!(r.diagnostic, Some(Diagnostic::HicNoPositiveWindow));
        Ok(())
    }

    #[test]
    fn profile_shorter_than_half_window_is_sentinel() -> Result<()> {
        let r = hic15(&flat(400.0, 0.005, 5), G, TC)?;
        assert_eq!(r.value, HIC_SENTINEL);
        assert_eq!(r.diagnostic, Some(Diagnostic::HicResampleTooShort));
        Ok(())
    }

    #[test]
    fn too_few_samples_is_sentinel() -> Result<()> {
        let r = hic15(&[(0.0, 100.0)], G, TC)?;
        assert_eq!(r.value, HIC_SENTINEL);
        assert_eq!(r.diagnostic, Some(Diagnostic::HicTooFewSamples { count: 1 }));
        Ok(())
    }

    #[test]
    fn identical_timestamps_is_sentinel() -> Result<()> {
        let r = hic15(&[(0.01, 100.0), (0.01, 200.0)], G, TC)?;
        assert_eq!(r.value, HIC_SENTINEL);
        assert_eq!(r.diagnostic, Some(Diagnostic::HicIdenticalTimestamps));
        Ok(())
    }

    #[test]
    fn negative_profile_falls_back_to_zero() -> Result<()> {
        let r = hic15(&flat(-50.0, 0.008, 8), G, TC)?;
        assert_eq!(r.value, 0.0);
        assert!(r.diagnostic.is_some());
        Ok(())
    }

    #[test]
    fn non_finite_time_rejected() {
        let err = hic15(&[(0.0, 1.0), (f64::NAN, 2.0)], G, TC).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn overlong_profile_rejected() {
        for span in [1e4, 1e9, f64::MAX] {
            let err = hic15(&[(0.0, 100.0), (span, 100.0)], G, TC).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "span {span}");
        }
    }

    #[test]
    fn profile_at_grid_limit_accepted() -> Result<()> {
        // 700 s at 7.5 ms steps stays below the cap.
        let r = hic15(&[(0.0, 100.0), (700.0, 100.0)], G, TC)?;
        assert!(r.value > 0.0);
        Ok(())
    }

    #[test]
    fn non_positive_window_rejected() {
        assert!(head_injury_criterion(&flat(1.0, 0.01, 2), 0.0, G, TC).is_err());
    }

    #[test]
    fn interpolation_clamps_outside_range() {
        let s = [
            Sample { t: NotNan::new(1.0).unwrap(), a: 10.0 },
            Sample { t: NotNan::new(2.0).unwrap(), a: 20.0 },
        ];
        assert_eq!(interpolate(&s, 0.0), 10.0);
        assert_eq!(interpolate(&s, 1.5), 15.0);
        assert_eq!(interpolate(&s, 3.0), 20.0);
    }
}
