//! Parameter smoothing for click-free changes.
//!
//! Two smoothing shapes are used by the rack:
//!
//! - [`BlockRamp`] - linear ramp across exactly one block. The chain uses it
//!   for per-slot mix and output level: whatever value the control thread last
//!   wrote becomes the block's end point, and the block starts from where the
//!   previous block ended.
//! - [`SmoothedParam`] - exponential (one-pole) smoothing for processor
//!   internals that need a longer glide, such as delay time.
//!
//! ```rust
//! use strata_core::{BLOCK_SIZE, BlockRamp};
//!
//! let mut mix = BlockRamp::new(0.0);
//! let ramp = mix.next_block(1.0);
//! assert_eq!(ramp[BLOCK_SIZE - 1], 1.0);
//! assert!(ramp[0] > 0.0 && ramp[0] < 0.1);
//! ```

use crate::block::{BLOCK_SIZE, BLOCK_SIZE_INV};
use libm::expf;

/// Linear ramp from the previous block's end value to a new target.
///
/// Sample `i` of a block receives `previous + (target - previous) * (i + 1) / BLOCK_SIZE`,
/// so the last sample of the block lands exactly on the target and the next
/// block continues from it. Torn or late writes to the target are harmless:
/// they only shift where the next ramp ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRamp {
    previous: f32,
}

impl BlockRamp {
    /// Creates a ramp resting at `initial`.
    pub const fn new(initial: f32) -> Self {
        Self { previous: initial }
    }

    /// Value the ramp ended on after the most recent block.
    #[inline]
    pub fn current(&self) -> f32 {
        self.previous
    }

    /// Jumps to `value` without ramping.
    #[inline]
    pub fn snap(&mut self, value: f32) {
        self.previous = value;
    }

    /// Returns `true` if ramping to `target` would produce a constant block.
    #[inline]
    pub fn is_flat(&self, target: f32) -> bool {
        self.previous == target
    }

    /// Produces the per-sample values for one block ending at `target`.
    #[inline]
    pub fn next_block(&mut self, target: f32) -> [f32; BLOCK_SIZE] {
        let start = self.previous;
        let step = (target - start) * BLOCK_SIZE_INV;
        let mut out = [target; BLOCK_SIZE];
        for (i, v) in out.iter_mut().enumerate().take(BLOCK_SIZE - 1) {
            *v = start + step * (i + 1) as f32;
        }
        self.previous = target;
        out
    }

    /// Largest step between two adjacent samples when ramping to `target`.
    #[inline]
    pub fn step_size(&self, target: f32) -> f32 {
        ((target - self.previous) * BLOCK_SIZE_INV).abs()
    }
}

impl Default for BlockRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A parameter with one-pole exponential smoothing.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    // 0 = frozen, 1 = instant
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Creates a parameter with smoothing configured for `sample_rate`.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate,
            smoothing_time_ms,
        };
        param.recalculate_coeff();
        param
    }

    /// Sets the value the parameter glides towards.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Sets target and current value together (no glide).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Changes the sample rate and recomputes the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Advances one sample and returns the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current smoothed value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// `coeff = 1 - exp(-1 / (tau * fs))`; a zero time constant is instant.
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}
