//! Volume and pan.
//!
//! On a mono branch the pan position places the signal with an equal-power
//! law, which makes this the usual way to turn a mono voice stereo. On a
//! stereo branch the same law acts as a balance control.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, BlockRamp, Capabilities, LiveStorage, ParamDescriptor, Processor,
    ProcessorControlDescription, ProcessorType, SpawnContext, db_to_linear, pan_gains,
};

const VOLUME: ParamDescriptor = ParamDescriptor::gain_db("Volume", "Vol", -48.0, 12.0, 0.0);
const PAN: ParamDescriptor = ParamDescriptor::custom("Pan", "Pan", -1.0, 1.0, 0.0);

/// Equal-power panner with volume.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Volume | -48 to +12 dB | 0 dB |
/// | float 1 | Pan | -1 (left) to +1 (right) | 0 |
///
/// Centre pan applies -3 dB to each side on a mono input.
#[derive(Debug)]
pub struct VolumePan {
    storage: Arc<LiveStorage>,
    left_gain: BlockRamp,
    right_gain: BlockRamp,
}

impl VolumePan {
    fn targets(storage: &LiveStorage, stereo: bool) -> (f32, f32) {
        let volume = db_to_linear(float_param(storage, 0, &VOLUME));
        let pan = float_param(storage, 1, &PAN);
        if stereo {
            // Balance: the louder side stays at unity.
            let (l, r) = pan_gains(pan);
            let norm = core::f32::consts::SQRT_2;
            (volume * (l * norm).min(1.0), volume * (r * norm).min(1.0))
        } else {
            let (l, r) = pan_gains(pan);
            (volume * l, volume * r)
        }
    }

    fn ramps(&mut self, stereo: bool) -> ([f32; BLOCK_SIZE], [f32; BLOCK_SIZE]) {
        let (l, r) = Self::targets(&self.storage, stereo);
        (self.left_gain.next_block(l), self.right_gain.next_block(r))
    }
}

impl Processor for VolumePan {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono_to_stereo(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        left: &mut [f32; BLOCK_SIZE],
        right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let (gl, gr) = self.ramps(false);
        for n in 0..BLOCK_SIZE {
            left[n] = input[n] * gl[n];
            right[n] = input[n] * gr[n];
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
        let (gl, gr) = self.ramps(true);
        for n in 0..BLOCK_SIZE {
            out_left[n] = in_left[n] * gl[n];
            out_right[n] = in_right[n] * gr[n];
        }
    }

    fn reset(&mut self) {
        let (l, r) = Self::targets(&self.storage, false);
        self.left_gain.snap(l);
        self.right_gain.snap(r);
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[VOLUME, PAN], &[])
    }
}

impl ProcessorType for VolumePan {
    const NAME: &'static str = "Volume & Pan";
    const STREAMING_NAME: &'static str = "volume-pan";
    const DISPLAY_GROUP: &'static str = "Utility";
    const FLOAT_PARAM_COUNT: usize = 2;
    const INT_PARAM_COUNT: usize = 0;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_STEREO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        let mut p = Self {
            storage: ctx.storage,
            left_gain: BlockRamp::default(),
            right_gain: BlockRamp::default(),
        };
        p.reset();
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::spawn;

    #[test]
    fn centre_pan_is_equal_power() {
        let (mut vp, _storage) = spawn::<VolumePan>();
        vp.reset();
        let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        vp.process_mono_to_stereo(&[1.0; BLOCK_SIZE], &mut l, &mut r, &BlockContext::default());
        assert!((l[0] - r[0]).abs() < 1e-6);
        assert!((l[0] * l[0] + r[0] * r[0] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn hard_right_silences_left() {
        let (mut vp, storage) = spawn::<VolumePan>();
        storage.set_float(1, 1.0);
        vp.reset();
        let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        vp.process_mono_to_stereo(&[1.0; BLOCK_SIZE], &mut l, &mut r, &BlockContext::default());
        assert!(l.iter().all(|s| s.abs() < 1e-6));
        assert!((r[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn centred_balance_is_transparent() {
        let (mut vp, _storage) = spawn::<VolumePan>();
        let ctx = BlockContext::default();
        let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        // first block ramps from the mono law to the balance law
        vp.process_stereo(&[0.5; BLOCK_SIZE], &[-0.5; BLOCK_SIZE], &mut l, &mut r, &ctx);
        vp.process_stereo(&[0.5; BLOCK_SIZE], &[-0.5; BLOCK_SIZE], &mut l, &mut r, &ctx);
        assert!((l[0] - 0.5).abs() < 1e-5);
        assert!((r[0] + 0.5).abs() < 1e-5);
    }
}
