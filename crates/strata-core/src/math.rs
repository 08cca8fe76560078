//! DSP math helpers.
//!
//! All functions are allocation-free and `no_std` (via `libm`).
//!
//! | Function | Use |
//! |----------|-----|
//! | [`db_to_linear`] / [`linear_to_db`] | Level conversion |
//! | [`soft_clip`], [`hard_clip`], [`foldback`] | Waveshaper transfer curves |
//! | [`wet_dry_mix`] | Linear crossfade |
//! | [`pan_gains`] | Equal-power pan law |
//! | [`flush_denormal`] | Feedback loop hygiene |

use libm::{cosf, expf, logf, sinf, tanhf};

/// Converts decibels to linear gain.
///
/// ```rust
/// use strata_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(6.0206) - 2.0).abs() < 0.001);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Converts linear gain to decibels, flooring at -200 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Hyperbolic tangent saturation, output in (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Clamps to `[-threshold, threshold]`.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// Folds the signal back at `threshold` instead of clipping.
///
/// Folding repeats until the value is inside `[-threshold, threshold]`.
#[inline]
pub fn foldback(x: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 0.0;
    }
    let period = 4.0 * threshold;
    // Triangle wave with peak `threshold`, phase-aligned so small inputs pass unchanged.
    let mut t = (x + threshold) % period;
    if t < 0.0 {
        t += period;
    }
    if t <= 2.0 * threshold {
        t - threshold
    } else {
        3.0 * threshold - t
    }
}

/// Replaces values below 1e-20 with zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// `dry + (wet - dry) * mix`.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Equal-power pan gains for `pan` in `[-1, 1]` (left to right).
///
/// ```rust
/// use strata_core::pan_gains;
///
/// let (l, r) = pan_gains(0.0);
/// assert!((l - r).abs() < 1e-6);
/// assert!((l * l + r * r - 1.0).abs() < 1e-5);
/// ```
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * core::f32::consts::FRAC_PI_4;
    (cosf(angle), sinf(angle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_linear_roundtrip() {
        let back = db_to_linear(linear_to_db(0.5));
        assert!((back - 0.5).abs() < 1e-5);
    }

    #[test]
    fn soft_clip_bounds() {
        assert!(soft_clip(3.0) < 1.0 && soft_clip(3.0) > 0.99);
        assert!(soft_clip(-3.0) > -1.0 && soft_clip(-3.0) < -0.99);
    }

    #[test]
    fn foldback_folds() {
        assert!((foldback(0.5, 0.8) - 0.5).abs() < 1e-6);
        assert!((foldback(0.8, 0.8) - 0.8).abs() < 1e-6);
        assert!((foldback(1.0, 0.8) - 0.6).abs() < 1e-6);
        assert!((foldback(-1.0, 0.8) + 0.6).abs() < 1e-6);
        assert!(foldback(100.0, 0.8).abs() <= 0.8 + 1e-6);
    }

    #[test]
    fn wet_dry_endpoints() {
        assert_eq!(wet_dry_mix(1.0, 0.5, 0.0), 1.0);
        assert_eq!(wet_dry_mix(1.0, 0.5, 1.0), 0.5);
    }

    #[test]
    fn pan_hard_left() {
        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn flush_denormal_threshold() {
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(1e-21), 0.0);
    }
}
