//! Second-order IIR filter with RBJ cookbook coefficient design.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf};

/// Response shape for [`BiquadCoefficients::design`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// 12 dB/oct low-pass.
    #[default]
    LowPass,
    /// 12 dB/oct high-pass.
    HighPass,
    /// Constant 0 dB peak gain band-pass.
    BandPass,
    /// Band-reject.
    Notch,
    /// Peaking bell using the gain argument.
    Peak,
}

impl FilterMode {
    /// All modes in integer-parameter order.
    pub const ALL: [FilterMode; 5] = [
        FilterMode::LowPass,
        FilterMode::HighPass,
        FilterMode::BandPass,
        FilterMode::Notch,
        FilterMode::Peak,
    ];

    /// Mode for an integer parameter value; out-of-range values clamp.
    pub fn from_index(index: i32) -> Self {
        let i = index.clamp(0, Self::ALL.len() as i32 - 1) as usize;
        Self::ALL[i]
    }
}

/// Normalised biquad coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl BiquadCoefficients {
    /// `y[n] = x[n]`.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Designs coefficients from the RBJ Audio EQ Cookbook.
    ///
    /// `frequency` is clamped below Nyquist and `q` to a small positive
    /// minimum, so any finite input yields a stable filter.
    pub fn design(mode: FilterMode, frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let frequency = frequency.clamp(10.0, sample_rate * 0.49);
        let q = q.max(0.05);
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_w = cosf(omega);
        let alpha = sinf(omega) / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match mode {
            FilterMode::LowPass => {
                let b1 = 1.0 - cos_w;
                (b1 / 2.0, b1, b1 / 2.0, 1.0 + alpha, -2.0 * cos_w, 1.0 - alpha)
            }
            FilterMode::HighPass => {
                let b1 = -(1.0 + cos_w);
                (-b1 / 2.0, b1, -b1 / 2.0, 1.0 + alpha, -2.0 * cos_w, 1.0 - alpha)
            }
            FilterMode::BandPass => (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w, 1.0 - alpha),
            FilterMode::Notch => (
                1.0,
                -2.0 * cos_w,
                1.0,
                1.0 + alpha,
                -2.0 * cos_w,
                1.0 - alpha,
            ),
            FilterMode::Peak => {
                let a = powf(10.0, gain_db / 40.0);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_w,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_w,
                    1.0 - alpha / a,
                )
            }
        };

        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }
}

/// Direct Form I biquad section.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Default for Biquad {
    fn default() -> Self {
        Self {
            coeffs: BiquadCoefficients::PASSTHROUGH,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }
}

impl Biquad {
    /// Replaces the coefficients, keeping the filter history.
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::math::flush_denormal(output);
        output
    }

    /// Clears the filter history.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(mode: FilterMode, freq: f32, input: impl Fn(usize) -> f32) -> f32 {
        let mut bq = Biquad::default();
        bq.set_coefficients(BiquadCoefficients::design(mode, freq, 0.707, 0.0, 48000.0));
        let mut peak = 0.0_f32;
        for n in 0..4800 {
            let y = bq.process(input(n));
            if n > 2400 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn passthrough_by_default() {
        let mut bq = Biquad::default();
        for i in 0..10 {
            let x = i as f32 * 0.1;
            assert!((bq.process(x) - x).abs() < 1e-6);
        }
    }

    #[test]
    fn lowpass_passes_dc() {
        let out = settle(FilterMode::LowPass, 1000.0, |_| 1.0);
        assert!((out - 1.0).abs() < 0.01, "got {out}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let out = settle(FilterMode::HighPass, 1000.0, |_| 1.0);
        assert!(out < 0.01, "got {out}");
    }

    #[test]
    fn lowpass_attenuates_high_tone() {
        let tone = |n: usize| sinf(2.0 * PI * 12000.0 * n as f32 / 48000.0);
        let out = settle(FilterMode::LowPass, 500.0, tone);
        assert!(out < 0.05, "got {out}");
    }

    #[test]
    fn extreme_inputs_stay_finite() {
        let c = BiquadCoefficients::design(FilterMode::Peak, 1e9, 0.0, 24.0, 44100.0);
        let mut bq = Biquad::default();
        bq.set_coefficients(c);
        for _ in 0..1000 {
            assert!(bq.process(1.0).is_finite());
        }
    }

    #[test]
    fn mode_from_index_clamps() {
        assert_eq!(FilterMode::from_index(-3), FilterMode::LowPass);
        assert_eq!(FilterMode::from_index(99), FilterMode::Peak);
    }
}
