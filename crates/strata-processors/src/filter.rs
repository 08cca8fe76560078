//! Multi-mode biquad filter with keytracked cutoff.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, Biquad, BiquadCoefficients, Capabilities, FilterMode,
    IntParamDescriptor, LiveStorage, ParamDescriptor, ParamFlags, ParamScale, Processor,
    ProcessorControlDescription, ProcessorType, SpawnContext,
};

const CUTOFF: ParamDescriptor = ParamDescriptor::frequency("Cutoff", "Cutoff", 20.0, 20000.0, 1000.0)
    .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::KEYTRACKABLE));
const RESONANCE: ParamDescriptor = ParamDescriptor::custom("Resonance", "Reso", 0.1, 12.0, 0.707)
    .with_scale(ParamScale::Logarithmic);
const GAIN: ParamDescriptor = ParamDescriptor::gain_db("Gain", "Gain", -24.0, 24.0, 0.0);
const MODE: IntParamDescriptor = IntParamDescriptor::choice(
    "Mode",
    &["Low Pass", "High Pass", "Band Pass", "Notch", "Peak"],
    0,
);
const KEYTRACK: IntParamDescriptor = IntParamDescriptor::toggle("Keytrack", false);

/// RBJ biquad in five modes.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Cutoff | 20 Hz to 20 kHz | 1 kHz |
/// | float 1 | Resonance (Q) | 0.1 to 12 | 0.707 |
/// | float 2 | Gain (peak mode) | -24 to +24 dB | 0 dB |
/// | int 0 | Mode | LP / HP / BP / Notch / Peak | LP |
/// | int 1 | Keytrack | off / on | off |
///
/// With keytrack on, the cutoff is multiplied by the voice pitch ratio
/// relative to the reference note. Coefficients are recomputed once per
/// block, only when an input to the design changed.
#[derive(Debug)]
pub struct BiquadFilter {
    storage: Arc<LiveStorage>,
    sample_rate: f32,
    filters: [Biquad; 2],
    // (mode, cutoff, q, gain) the coefficients were designed for
    designed: Option<(FilterMode, f32, f32, f32)>,
}

impl BiquadFilter {
    fn update(&mut self, ctx: &BlockContext) {
        let s = &self.storage;
        let mode = FilterMode::from_index(MODE.clamp(s.int(0)));
        let mut cutoff = float_param(s, 0, &CUTOFF);
        if KEYTRACK.clamp(s.int(1)) != 0 {
            cutoff *= ctx.pitch_ratio();
        }
        let q = float_param(s, 1, &RESONANCE);
        let gain = float_param(s, 2, &GAIN);
        let key = (mode, cutoff, q, gain);
        if self.designed != Some(key) {
            let coeffs = BiquadCoefficients::design(mode, cutoff, q, gain, self.sample_rate);
            for f in &mut self.filters {
                f.set_coefficients(coeffs);
            }
            self.designed = Some(key);
        }
    }
}

impl Processor for BiquadFilter {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        self.update(ctx);
        for (o, i) in output.iter_mut().zip(input) {
            *o = self.filters[0].process(*i);
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
        self.update(ctx);
        let [fl, fr] = &mut self.filters;
        for n in 0..BLOCK_SIZE {
            out_left[n] = fl.process(in_left[n]);
            out_right[n] = fr.process(in_right[n]);
        }
    }

    fn reset(&mut self) {
        for f in &mut self.filters {
            f.clear();
        }
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[CUTOFF, RESONANCE, GAIN], &[MODE, KEYTRACK])
            .with_keytrack()
    }
}

impl ProcessorType for BiquadFilter {
    const NAME: &'static str = "Biquad Filter";
    const STREAMING_NAME: &'static str = "biquad-filter";
    const DISPLAY_GROUP: &'static str = "Filters";
    const FLOAT_PARAM_COUNT: usize = 3;
    const INT_PARAM_COUNT: usize = 2;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        Self {
            storage: ctx.storage,
            sample_rate: ctx.sample_rate,
            filters: [Biquad::default(), Biquad::default()],
            designed: None,
        }
    }
}
