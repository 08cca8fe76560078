//! Ring modulator.
//!
//! Ring modulation multiplies the input by a bipolar carrier, producing sum
//! and difference frequencies while suppressing the input's own partials:
//!
//! ```text
//! y = x * (1 - depth + depth * carrier)
//! ```
//!
//! For `x = sin(2 pi f_in t)` and a sine carrier at `f_c`, full depth gives
//! `1/2 [cos(2 pi (f_in - f_c) t) - cos(2 pi (f_in + f_c) t)]`.
//!
//! Reference: Zolzer, "DAFX: Digital Audio Effects" (2011), Ch. 2.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, IntParamDescriptor, Lfo, LfoWaveform, LiveStorage,
    ParamDescriptor, ParamFlags, Processor, ProcessorControlDescription, ProcessorType,
    SpawnContext,
};

const FREQUENCY: ParamDescriptor =
    ParamDescriptor::frequency("Frequency", "Freq", 20.0, 5000.0, 220.0)
        .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::KEYTRACKABLE));
const DEPTH: ParamDescriptor = ParamDescriptor::percent("Depth", "Depth", 1.0);
const WAVEFORM: IntParamDescriptor =
    IntParamDescriptor::choice("Waveform", &["Sine", "Triangle", "Square"], 0);
const KEYTRACK: IntParamDescriptor = IntParamDescriptor::toggle("Keytrack", false);

/// Ring modulator with a sine, triangle or square carrier.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Frequency | 20 Hz to 5 kHz | 220 Hz |
/// | float 1 | Depth | 0 to 100% | 100% |
/// | int 0 | Waveform | Sine / Triangle / Square | Sine |
/// | int 1 | Keytrack | off / on | off |
///
/// Both channels share one carrier.
#[derive(Debug)]
pub struct RingModulator {
    storage: Arc<LiveStorage>,
    carrier: Lfo,
}

impl RingModulator {
    /// Configures the carrier for this block and returns the depth.
    fn prepare(&mut self, ctx: &BlockContext) -> f32 {
        let s = &self.storage;
        let mut freq = float_param(s, 0, &FREQUENCY);
        if KEYTRACK.clamp(s.int(1)) != 0 {
            freq *= ctx.pitch_ratio();
        }
        let waveform = match WAVEFORM.clamp(s.int(0)) {
            0 => LfoWaveform::Sine,
            1 => LfoWaveform::Triangle,
            _ => LfoWaveform::Square,
        };
        self.carrier.set_frequency(freq);
        self.carrier.set_waveform(waveform);
        float_param(s, 1, &DEPTH)
    }
}

impl Processor for RingModulator {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        let depth = self.prepare(ctx);
        for (o, i) in output.iter_mut().zip(input) {
            let c = self.carrier.next();
            *o = *i * (1.0 - depth + depth * c);
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
        let depth = self.prepare(ctx);
        for n in 0..BLOCK_SIZE {
            let g = 1.0 - depth + depth * self.carrier.next();
            out_left[n] = in_left[n] * g;
            out_right[n] = in_right[n] * g;
        }
    }

    fn reset(&mut self) {
        self.carrier.reset();
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[FREQUENCY, DEPTH], &[WAVEFORM, KEYTRACK])
            .with_keytrack()
    }
}

impl ProcessorType for RingModulator {
    const NAME: &'static str = "Ring Modulator";
    const STREAMING_NAME: &'static str = "ring-modulator";
    const DISPLAY_GROUP: &'static str = "Modulation";
    const FLOAT_PARAM_COUNT: usize = 2;
    const INT_PARAM_COUNT: usize = 2;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        Self {
            carrier: Lfo::new(ctx.sample_rate, FREQUENCY.default),
            storage: ctx.storage,
        }
    }
}
