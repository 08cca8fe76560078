//! 2x oversampling wrapper for block processors.
//!
//! Nonlinear processors generate harmonics above Nyquist that alias back into
//! the audible band. [`Oversampled`] runs the wrapped processor at twice the
//! base rate:
//!
//! ```text
//! block (16) -> linear interpolation (32) -> inner processor, two half-rate blocks -> FIR lowpass -> decimate (16)
//! ```
//!
//! The wrapper shares the wrapped type's code and parameter layout; the
//! registry chooses it when a chain is configured as oversampled.

use crate::block::BLOCK_SIZE;
use crate::description::ProcessorControlDescription;
use crate::memory_pool::PoolBlock;
use crate::processor::{BlockContext, Capabilities, Processor};

/// Oversampling factor applied by [`Oversampled`].
pub const OVERSAMPLE_FACTOR: usize = 2;

const FILTER_TAPS: usize = 16;

/// Half-band lowpass, cutoff at 0.4 x oversampled Nyquist.
///
/// Windowed sinc (Kaiser, beta ~5.6); every other tap is zero except the
/// centre. Coefficients sum to 1.0 for unity DC gain.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_2X: [f32; FILTER_TAPS] = [
    -0.00152541,  0.00000000,  0.01309369,  0.00000000,
    -0.05738920,  0.00000000,  0.29581875,  0.50000434,
     0.29581875,  0.00000000, -0.05738920,  0.00000000,
     0.01309369,  0.00000000, -0.00152541,  0.00000000,
];

/// Per-channel interpolation and decimation state.
#[derive(Debug, Clone, Default)]
struct ChannelResampler {
    prev_sample: f32,
    history: [f32; FILTER_TAPS],
    pos: usize,
}

impl ChannelResampler {
    /// Expands one block into two blocks at twice the rate.
    fn upsample(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        first: &mut [f32; BLOCK_SIZE],
        second: &mut [f32; BLOCK_SIZE],
    ) {
        for (i, &x) in input.iter().enumerate() {
            let mid = 0.5 * (self.prev_sample + x);
            let (half, offset) = if i < BLOCK_SIZE / 2 {
                (&mut *first, 2 * i)
            } else {
                (&mut *second, 2 * i - BLOCK_SIZE)
            };
            half[offset] = mid;
            half[offset + 1] = x;
            self.prev_sample = x;
        }
    }

    #[inline]
    fn push(&mut self, x: f32) {
        self.pos = (self.pos + FILTER_TAPS - 1) % FILTER_TAPS;
        self.history[self.pos] = x;
    }

    #[inline]
    fn filtered(&self) -> f32 {
        let mut acc = 0.0;
        for (j, &c) in COEFFS_2X.iter().enumerate() {
            acc += self.history[(self.pos + j) % FILTER_TAPS] * c;
        }
        acc
    }

    /// Filters two rate-doubled blocks and keeps every second sample.
    fn downsample(
        &mut self,
        first: &[f32; BLOCK_SIZE],
        second: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
    ) {
        for (k, out) in output.iter_mut().enumerate() {
            let (half, offset) = if k < BLOCK_SIZE / 2 {
                (first, 2 * k)
            } else {
                (second, 2 * k - BLOCK_SIZE)
            };
            self.push(half[offset]);
            self.push(half[offset + 1]);
            *out = self.filtered();
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Runs a processor at twice the base sample rate.
///
/// The inner processor must have been spawned at the oversampled rate.
#[derive(Debug)]
pub struct Oversampled<P> {
    inner: P,
    resamplers: [ChannelResampler; 2],
}

impl<P: Processor> Oversampled<P> {
    /// Wraps a processor already running at `base_rate * OVERSAMPLE_FACTOR`.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            resamplers: [ChannelResampler::default(), ChannelResampler::default()],
        }
    }

    /// The wrapped processor.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Mutable access to the wrapped processor.
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }
}

impl<P: Processor> Processor for Oversampled<P> {
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        let mut up = [[0.0; BLOCK_SIZE]; 2];
        let mut wet = [[0.0; BLOCK_SIZE]; 2];
        let [up_a, up_b] = &mut up;
        self.resamplers[0].upsample(input, up_a, up_b);
        for (src, dst) in up.iter().zip(wet.iter_mut()) {
            self.inner.process_mono(src, dst, ctx);
        }
        self.resamplers[0].downsample(&wet[0], &wet[1], output);
    }

    fn process_mono_to_stereo(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        left: &mut [f32; BLOCK_SIZE],
        right: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        let mut up = [[0.0; BLOCK_SIZE]; 2];
        let mut wet_l = [[0.0; BLOCK_SIZE]; 2];
        let mut wet_r = [[0.0; BLOCK_SIZE]; 2];
        let [up_a, up_b] = &mut up;
        self.resamplers[0].upsample(input, up_a, up_b);
        for h in 0..2 {
            self.inner
                .process_mono_to_stereo(&up[h], &mut wet_l[h], &mut wet_r[h], ctx);
        }
        self.resamplers[0].downsample(&wet_l[0], &wet_l[1], left);
        self.resamplers[1].downsample(&wet_r[0], &wet_r[1], right);
    }

    fn process_stereo(
        &mut self,
        in_left: &[f32; BLOCK_SIZE],
        in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        let mut up_l = [[0.0; BLOCK_SIZE]; 2];
        let mut up_r = [[0.0; BLOCK_SIZE]; 2];
        let mut wet_l = [[0.0; BLOCK_SIZE]; 2];
        let mut wet_r = [[0.0; BLOCK_SIZE]; 2];
        {
            let [a, b] = &mut up_l;
            self.resamplers[0].upsample(in_left, a, b);
            let [a, b] = &mut up_r;
            self.resamplers[1].upsample(in_right, a, b);
        }
        for h in 0..2 {
            let (wl, wr) = (&mut wet_l[h], &mut wet_r[h]);
            self.inner.process_stereo(&up_l[h], &up_r[h], wl, wr, ctx);
        }
        self.resamplers[0].downsample(&wet_l[0], &wet_l[1], out_left);
        self.resamplers[1].downsample(&wet_r[0], &wet_r[1], out_right);
    }

    fn reset(&mut self) {
        for r in &mut self.resamplers {
            r.reset();
        }
        self.inner.reset();
    }

    fn control_description(&self) -> ProcessorControlDescription {
        self.inner.control_description()
    }

    fn attach_scratch(&mut self, block: PoolBlock) -> Option<PoolBlock> {
        self.inner.attach_scratch(block)
    }

    fn detach_scratch(&mut self) -> Option<PoolBlock> {
        self.inner.detach_scratch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Processor for Gain {
        fn capabilities(&self) -> Capabilities {
            Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO)
        }

        fn process_mono(
            &mut self,
            input: &[f32; BLOCK_SIZE],
            output: &mut [f32; BLOCK_SIZE],
            _ctx: &BlockContext,
        ) {
            for (o, i) in output.iter_mut().zip(input.iter()) {
                *o = *i * self.0;
            }
        }

        fn process_stereo(
            &mut self,
            in_left: &[f32; BLOCK_SIZE],
            in_right: &[f32; BLOCK_SIZE],
            out_left: &mut [f32; BLOCK_SIZE],
            out_right: &mut [f32; BLOCK_SIZE],
            ctx: &BlockContext,
        ) {
            self.process_mono(in_left, out_left, ctx);
            self.process_mono(in_right, out_right, ctx);
        }

        fn reset(&mut self) {}

        fn control_description(&self) -> ProcessorControlDescription {
            ProcessorControlDescription::empty("Gain")
        }
    }

    fn settle_mono(os: &mut Oversampled<Gain>, value: f32) -> [f32; BLOCK_SIZE] {
        let ctx = BlockContext::default();
        let input = [value; BLOCK_SIZE];
        let mut out = [0.0; BLOCK_SIZE];
        for _ in 0..8 {
            os.process_mono(&input, &mut out, &ctx);
        }
        out
    }

    #[test]
    fn dc_passes_at_unity() {
        let mut os = Oversampled::new(Gain(1.0));
        let out = settle_mono(&mut os, 1.0);
        for s in out {
            assert!((s - 1.0).abs() < 0.01, "expected ~1.0, got {s}");
        }
    }

    #[test]
    fn inner_gain_preserved() {
        let mut os = Oversampled::new(Gain(0.5));
        let out = settle_mono(&mut os, 1.0);
        assert!((out[BLOCK_SIZE - 1] - 0.5).abs() < 0.01);
    }

    #[test]
    fn stereo_channels_independent() {
        let mut os = Oversampled::new(Gain(1.0));
        let ctx = BlockContext::default();
        let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        for _ in 0..8 {
            os.process_stereo(&[1.0; BLOCK_SIZE], &[-1.0; BLOCK_SIZE], &mut l, &mut r, &ctx);
        }
        assert!((l[0] - 1.0).abs() < 0.01);
        assert!((r[0] + 1.0).abs() < 0.01);
    }

    #[test]
    fn reset_clears_history() {
        let mut os = Oversampled::new(Gain(1.0));
        settle_mono(&mut os, 1.0);
        os.reset();
        let ctx = BlockContext::default();
        let mut out = [1.0; BLOCK_SIZE];
        os.process_mono(&[0.0; BLOCK_SIZE], &mut out, &ctx);
        assert!(out.iter().all(|s| s.abs() < 1e-9));
    }

    #[test]
    fn capabilities_forwarded() {
        let os = Oversampled::new(Gain(1.0));
        assert!(os.capabilities().contains(Capabilities::STEREO_TO_STEREO));
        assert!(!os.capabilities().contains(Capabilities::MONO_TO_STEREO));
    }
}
