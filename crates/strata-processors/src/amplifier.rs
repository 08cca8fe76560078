//! Plain gain stage.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, BlockRamp, Capabilities, LiveStorage, ParamDescriptor, Processor,
    ProcessorControlDescription, ProcessorType, SpawnContext, db_to_linear,
};

const GAIN: ParamDescriptor = ParamDescriptor::gain_db("Gain", "Gain", -48.0, 24.0, 0.0);

/// Gain in dB, ramped per block.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Gain | -48 to +24 dB | 0 dB |
#[derive(Debug)]
pub struct Amplifier {
    storage: Arc<LiveStorage>,
    gain: BlockRamp,
}

impl Amplifier {
    fn gain_ramp(&mut self) -> [f32; BLOCK_SIZE] {
        let target = db_to_linear(float_param(&self.storage, 0, &GAIN));
        self.gain.next_block(target)
    }
}

impl Processor for Amplifier {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let gain = self.gain_ramp();
        for ((o, i), g) in output.iter_mut().zip(input).zip(gain) {
            *o = *i * g;
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
        let gain = self.gain_ramp();
        for n in 0..BLOCK_SIZE {
            out_left[n] = in_left[n] * gain[n];
            out_right[n] = in_right[n] * gain[n];
        }
    }

    fn reset(&mut self) {
        self.gain
            .snap(db_to_linear(float_param(&self.storage, 0, &GAIN)));
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[GAIN], &[])
    }
}

impl ProcessorType for Amplifier {
    const NAME: &'static str = "Amplifier";
    const STREAMING_NAME: &'static str = "amplifier";
    const DISPLAY_GROUP: &'static str = "Utility";
    const FLOAT_PARAM_COUNT: usize = 1;
    const INT_PARAM_COUNT: usize = 0;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        let gain = db_to_linear(float_param(&ctx.storage, 0, &GAIN));
        Self {
            storage: ctx.storage,
            gain: BlockRamp::new(gain),
        }
    }
}
