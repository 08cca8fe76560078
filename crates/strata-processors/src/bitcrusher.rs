//! Bit depth and sample rate reduction.
//!
//! # Theory
//!
//! **Quantization.** With `B` bits the amplitude axis is divided into `2^B`
//! steps and each sample is rounded to the nearest one:
//!
//! ```text
//! levels = 2^(B - 1)
//! y = round(x * levels) / levels
//! ```
//!
//! Fractional bit depths are allowed so the parameter sweeps smoothly.
//!
//! **Rate reduction.** A zero-order hold latches one input sample and repeats
//! it for `factor` samples; fractional factors alternate between the two
//! neighbouring hold lengths. The staircase folds high frequencies back into the audible band.
//!
//! Reference: Zolzer, "DAFX: Digital Audio Effects" 2nd ed., Chapter 7.

use crate::{Arc, float_param};
use libm::{exp2f, roundf};
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, LiveStorage, ParamDescriptor, ParamUnit, Processor,
    ProcessorControlDescription, ProcessorType, SpawnContext,
};

const BITS: ParamDescriptor =
    ParamDescriptor::custom("Bit Depth", "Bits", 1.0, 16.0, 8.0).with_unit(ParamUnit::Bits);
const DOWNSAMPLE: ParamDescriptor =
    ParamDescriptor::custom("Downsample", "Down", 1.0, 64.0, 1.0).with_step(1.0);

/// Hold state for one channel.
#[derive(Debug, Clone, Copy, Default)]
struct Hold {
    value: f32,
    counter: f32,
}

impl Hold {
    #[inline]
    fn next(&mut self, x: f32, factor: f32) -> f32 {
        if self.counter <= 0.0 {
            self.value = x;
            self.counter += factor;
        }
        self.counter -= 1.0;
        self.value
    }
}

/// Lo-fi bitcrusher.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Bit Depth | 1 to 16 | 8 |
/// | float 1 | Downsample | 1 to 64 | 1 |
#[derive(Debug)]
pub struct Bitcrusher {
    storage: Arc<LiveStorage>,
    holds: [Hold; 2],
}

impl Bitcrusher {
    fn settings(&self) -> (f32, f32) {
        let bits = float_param(&self.storage, 0, &BITS);
        let levels = exp2f(bits - 1.0);
        (levels, float_param(&self.storage, 1, &DOWNSAMPLE))
    }

    #[inline]
    fn crush(hold: &mut Hold, x: f32, levels: f32, factor: f32) -> f32 {
        let held = hold.next(x, factor);
        (roundf(held * levels) / levels).clamp(-1.0, 1.0)
    }
}

impl Processor for Bitcrusher {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let (levels, factor) = self.settings();
        for (o, i) in output.iter_mut().zip(input) {
            *o = Self::crush(&mut self.holds[0], *i, levels, factor);
        }
    }

    fn process_stereo(
        &mut self,
        in_left: &[f32; BLOCK_SIZE],
        in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let (levels, factor) = self.settings();
        let [hl, hr] = &mut self.holds;
        for n in 0..BLOCK_SIZE {
            out_left[n] = Self::crush(hl, in_left[n], levels, factor);
            out_right[n] = Self::crush(hr, in_right[n], levels, factor);
        }
    }

    fn reset(&mut self) {
        self.holds = [Hold::default(); 2];
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[BITS, DOWNSAMPLE], &[])
    }
}

impl ProcessorType for Bitcrusher {
    const NAME: &'static str = "Bitcrusher";
    const STREAMING_NAME: &'static str = "bitcrusher";
    const DISPLAY_GROUP: &'static str = "Distortion";
    const FLOAT_PARAM_COUNT: usize = 2;
    const INT_PARAM_COUNT: usize = 0;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        Self {
            storage: ctx.storage,
            holds: [Hold::default(); 2],
        }
    }
}
