//! Tremolo with stereo spread and tempo sync.
//!
//! Classic amplitude modulation: `gain = 1 - depth * (1 - lfo)` with a
//! unipolar LFO, so full depth swings between silence and unity. The right
//! channel's LFO runs `spread` cycles ahead of the left one; any spread turns
//! a mono input into an auto-panner.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, IntParamDescriptor, Lfo, LfoWaveform, LiveStorage,
    ParamDescriptor, ParamFlags, Processor, ProcessorControlDescription, ProcessorType,
    SpawnContext,
};

const RATE: ParamDescriptor = ParamDescriptor::custom("Rate", "Rate", 0.1, 20.0, 5.0)
    .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::TEMPOSYNCABLE));
const DEPTH: ParamDescriptor = ParamDescriptor::percent("Depth", "Depth", 0.5);
const SPREAD: ParamDescriptor = ParamDescriptor::custom("Spread", "Spread", 0.0, 1.0, 0.0);
const WAVEFORM: IntParamDescriptor = IntParamDescriptor::choice("Waveform", &LfoWaveform::LABELS, 0);

/// Stereo tremolo.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Rate | 0.1 to 20 Hz, or beats per cycle when temposynced | 5 |
/// | float 1 | Depth | 0 to 100% | 50% |
/// | float 2 | Spread | 0 to 1 cycle right-channel offset | 0 |
/// | int 0 | Waveform | Sine / Triangle / Saw / Square | Sine |
#[derive(Debug)]
pub struct Tremolo {
    storage: Arc<LiveStorage>,
    lfos: [Lfo; 2],
    spread: f32,
}

impl Tremolo {
    /// Updates both LFOs and returns the depth for this block.
    fn prepare(&mut self, ctx: &BlockContext) -> f32 {
        let s = &self.storage;
        let rate = float_param(s, 0, &RATE);
        let hz = if s.is_temposync() {
            ctx.beats_to_hz(rate)
        } else {
            rate
        };
        let waveform = LfoWaveform::from_index(WAVEFORM.clamp(s.int(0)));
        let spread = float_param(s, 2, &SPREAD);
        if spread != self.spread {
            let phase = self.lfos[0].phase() + spread;
            self.lfos[1].set_phase(phase);
            self.spread = spread;
        }
        for lfo in &mut self.lfos {
            lfo.set_frequency(hz);
            lfo.set_waveform(waveform);
        }
        float_param(s, 1, &DEPTH)
    }

    #[inline]
    fn gain(lfo: &mut Lfo, depth: f32) -> f32 {
        1.0 - depth * (1.0 - lfo.next_unipolar())
    }
}

impl Processor for Tremolo {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono_to_stereo(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        left: &mut [f32; BLOCK_SIZE],
        right: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        self.process_stereo(input, input, left, right, ctx);
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
        let [ll, lr] = &mut self.lfos;
        for n in 0..BLOCK_SIZE {
            out_left[n] = in_left[n] * Self::gain(ll, depth);
            out_right[n] = in_right[n] * Self::gain(lr, depth);
        }
    }

    fn reset(&mut self) {
        self.lfos[0].reset();
        self.lfos[1].set_phase(self.spread);
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[RATE, DEPTH, SPREAD], &[WAVEFORM])
            .with_temposync()
    }
}

impl ProcessorType for Tremolo {
    const NAME: &'static str = "Tremolo";
    const STREAMING_NAME: &'static str = "tremolo";
    const DISPLAY_GROUP: &'static str = "Modulation";
    const FLOAT_PARAM_COUNT: usize = 3;
    const INT_PARAM_COUNT: usize = 1;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_STEREO.union(Capabilities::STEREO_TO_STEREO);

    fn spawn(ctx: SpawnContext) -> Self {
        let lfo = Lfo::new(ctx.sample_rate, RATE.default);
        Self {
            storage: ctx.storage,
            lfos: [lfo.clone(), lfo],
            spread: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::spawn;

    fn run(t: &mut Tremolo, blocks: usize, ctx: &BlockContext) -> (f32, f32, f32) {
        let (mut min, mut max, mut max_diff) = (f32::MAX, f32::MIN, 0.0_f32);
        for _ in 0..blocks {
            let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
            t.process_mono_to_stereo(&[1.0; BLOCK_SIZE], &mut l, &mut r, ctx);
            for n in 0..BLOCK_SIZE {
                min = min.min(l[n]);
                max = max.max(l[n]);
                max_diff = max_diff.max((l[n] - r[n]).abs());
            }
        }
        (min, max, max_diff)
    }

    #[test]
    fn full_depth_reaches_silence() {
        let (mut t, storage) = spawn::<Tremolo>();
        storage.set_float(1, 1.0);
        let (min, max, _) = run(&mut t, 3000, &BlockContext::default());
        assert!(min < 0.01, "min {min}");
        assert!(max > 0.99, "max {max}");
    }

    #[test]
    fn zero_spread_keeps_channels_identical() {
        let (mut t, _storage) = spawn::<Tremolo>();
        let (_, _, diff) = run(&mut t, 100, &BlockContext::default());
        assert!(diff < 1e-6);
    }

    #[test]
    fn spread_decorrelates_channels() {
        let (mut t, storage) = spawn::<Tremolo>();
        storage.set_float(2, 0.5);
        let (_, _, diff) = run(&mut t, 100, &BlockContext::default());
        assert!(diff > 0.1);
    }

    #[test]
    fn temposync_uses_tempo() {
        let (mut t, storage) = spawn::<Tremolo>();
        storage.set_temposync(true);
        storage.set_float(0, 1.0);
        let ctx = BlockContext {
            tempo_bpm: 60.0,
            ..BlockContext::default()
        };
        t.prepare(&ctx);
        // one beat at 60 bpm = 1 Hz; 3000 samples advance phase by 1/16 cycle
        for _ in 0..3000 {
            t.lfos[0].next();
        }
        assert!((t.lfos[0].phase() - 0.0625).abs() < 1e-3);
    }
}
