//! Noise source that replaces its input.
//!
//! White noise from a linear congruential generator (Numerical Recipes
//! constants), optionally darkened by a one-pole lowpass. `color = 0` is white;
//! `color = 1` puts the pole at roughly 200 Hz.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, BlockRamp, Capabilities, LiveStorage, ParamDescriptor, Processor,
    ProcessorControlDescription, ProcessorType, SpawnContext, db_to_linear, flush_denormal,
};

const LEVEL: ParamDescriptor = ParamDescriptor::gain_db("Level", "Level", -60.0, 0.0, -12.0);
const COLOR: ParamDescriptor = ParamDescriptor::percent("Color", "Color", 0.0);

const DARKEST_HZ: f32 = 200.0;

#[derive(Debug, Clone, Copy)]
struct NoiseChannel {
    seed: u32,
    lp: f32,
}

impl NoiseChannel {
    const fn new(seed: u32) -> Self {
        Self { seed, lp: 0.0 }
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.seed >> 8) as f32 / (1u32 << 23) as f32 - 1.0
    }

    #[inline]
    fn next(&mut self, coeff: f32) -> f32 {
        let w = self.white();
        self.lp = flush_denormal(self.lp + coeff * (w - self.lp));
        self.lp
    }
}

const SEEDS: [u32; 2] = [0x1234_5678, 0x9abc_def1];

/// Noise generator.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Level | -60 to 0 dB | -12 dB |
/// | float 1 | Color | 0 (white) to 100% (dark) | 0% |
#[derive(Debug)]
pub struct NoiseGenerator {
    storage: Arc<LiveStorage>,
    sample_rate: f32,
    level: BlockRamp,
    channels: [NoiseChannel; 2],
}

impl NoiseGenerator {
    /// Level ramp and lowpass coefficient for this block.
    fn prepare(&mut self) -> ([f32; BLOCK_SIZE], f32) {
        let level = db_to_linear(float_param(&self.storage, 0, &LEVEL));
        let color = float_param(&self.storage, 1, &COLOR);
        let darkest = 1.0 - libm::expf(-core::f32::consts::TAU * DARKEST_HZ / self.sample_rate);
        let coeff = 1.0 + color * (darkest - 1.0);
        (self.level.next_block(level), coeff)
    }
}

impl Processor for NoiseGenerator {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono(
        &mut self,
        _input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let (level, coeff) = self.prepare();
        for (o, g) in output.iter_mut().zip(level) {
            *o = self.channels[0].next(coeff) * g;
        }
    }

    fn process_stereo(
        &mut self,
        _in_left: &[f32; BLOCK_SIZE],
        _in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let (level, coeff) = self.prepare();
        let [cl, cr] = &mut self.channels;
        for n in 0..BLOCK_SIZE {
            out_left[n] = cl.next(coeff) * level[n];
            out_right[n] = cr.next(coeff) * level[n];
        }
    }

    fn reset(&mut self) {
        self.channels = [NoiseChannel::new(SEEDS[0]), NoiseChannel::new(SEEDS[1])];
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[LEVEL, COLOR], &[])
    }
}

impl ProcessorType for NoiseGenerator {
    const NAME: &'static str = "Noise";
    const STREAMING_NAME: &'static str = "noise";
    const DISPLAY_GROUP: &'static str = "Generators";
    const FLOAT_PARAM_COUNT: usize = 2;
    const INT_PARAM_COUNT: usize = 0;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        Self {
            level: BlockRamp::new(db_to_linear(float_param(&ctx.storage, 0, &LEVEL))),
            storage: ctx.storage,
            sample_rate: ctx.sample_rate,
            channels: [NoiseChannel::new(SEEDS[0]), NoiseChannel::new(SEEDS[1])],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::spawn;

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn ignores_input() {
        let (mut a, _sa) = spawn::<NoiseGenerator>();
        let (mut b, _sb) = spawn::<NoiseGenerator>();
        let ctx = BlockContext::default();
        let (mut x, mut y) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        a.process_mono(&[0.0; BLOCK_SIZE], &mut x, &ctx);
        b.process_mono(&[0.9; BLOCK_SIZE], &mut y, &ctx);
        assert_eq!(x, y);
    }

    #[test]
    fn white_noise_is_bounded_and_nonzero() {
        let (mut n, storage) = spawn::<NoiseGenerator>();
        storage.set_float(0, 0.0);
        let ctx = BlockContext::default();
        let mut all = Vec::new();
        for _ in 0..100 {
            let mut out = [0.0; BLOCK_SIZE];
            n.process_mono(&[0.0; BLOCK_SIZE], &mut out, &ctx);
            assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
            all.extend_from_slice(&out);
        }
        // uniform [-1, 1] has rms 1/sqrt(3)
        assert!((rms(&all) - 0.577).abs() < 0.05, "rms {}", rms(&all));
    }

    #[test]
    fn color_darkens() {
        let ctx = BlockContext::default();
        let measure = |color: f32| {
            let (mut n, storage) = spawn::<NoiseGenerator>();
            storage.set_float(0, 0.0);
            storage.set_float(1, color);
            let mut all = Vec::new();
            for _ in 0..100 {
                let mut out = [0.0; BLOCK_SIZE];
                n.process_mono(&[0.0; BLOCK_SIZE], &mut out, &ctx);
                all.extend_from_slice(&out);
            }
            rms(&all)
        };
        assert!(measure(1.0) < measure(0.0) * 0.5);
    }

    #[test]
    fn channels_differ() {
        let (mut n, _storage) = spawn::<NoiseGenerator>();
        let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        let silent = [0.0; BLOCK_SIZE];
        n.process_stereo(&silent, &silent, &mut l, &mut r, &BlockContext::default());
        assert_ne!(l, r);
    }
}
