//! Static waveshaper with drive, bias and trim.
//!
//! ```text
//! y = trim * (shape(drive * x + bias) - shape(bias))
//! ```
//!
//! Subtracting `shape(bias)` removes the DC offset the bias would otherwise
//! leave behind, so bias only changes the harmonic balance (even harmonics
//! grow as the curve becomes asymmetric around the operating point).
//!
//! ## Streaming versions
//!
//! Version 1 stored drive as a linear multiplier and had no bias:
//! `floats = [drive_linear, trim_db]`. Version 2 stores
//! `floats = [drive_db, bias, trim_db]`; [`remap`] upgrades the old layout.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, BlockRamp, Capabilities, IntParamDescriptor, LiveStorage,
    MAX_FLOAT_PARAMS, MAX_INT_PARAMS, ParamDescriptor, ParamFlags, Processor,
    ProcessorControlDescription, ProcessorType, RemapFn, SpawnContext, db_to_linear, foldback,
    hard_clip, linear_to_db, soft_clip,
};

const DRIVE: ParamDescriptor = ParamDescriptor::gain_db("Drive", "Drive", -12.0, 48.0, 0.0);
const BIAS: ParamDescriptor = ParamDescriptor::custom("Bias", "Bias", -1.0, 1.0, 0.0)
    .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::DEACTIVATABLE));
const TRIM: ParamDescriptor = ParamDescriptor::gain_db("Trim", "Trim", -24.0, 12.0, 0.0);
const SHAPE: IntParamDescriptor = IntParamDescriptor::choice("Shape", &["Soft", "Hard", "Fold"], 0);

/// Transfer curve selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// `tanh`, smooth and odd-harmonic.
    #[default]
    Soft,
    /// Clamp at +-1.
    Hard,
    /// Triangle foldback at +-1.
    Fold,
}

impl Shape {
    fn from_index(index: i32) -> Self {
        match index {
            1 => Shape::Hard,
            2 => Shape::Fold,
            _ => Shape::Soft,
        }
    }

    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            Shape::Soft => soft_clip(x),
            Shape::Hard => hard_clip(x, 1.0),
            Shape::Fold => foldback(x, 1.0),
        }
    }
}

/// Rewrites version-1 parameter arrays into the version-2 layout.
///
/// ```rust
/// use strata_processors::waveshaper::remap;
///
/// let mut floats = [10.0, -6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// let mut ints = [2, 0, 0, 0];
/// remap(1, &mut floats, &mut ints);
/// assert!((floats[0] - 20.0).abs() < 1e-4);
/// assert_eq!(floats[1], 0.0);
/// assert_eq!(floats[2], -6.0);
/// assert_eq!(ints[0], 2);
/// ```
pub fn remap(from_version: u16, floats: &mut [f32; MAX_FLOAT_PARAMS], _ints: &mut [i32; MAX_INT_PARAMS]) {
    if from_version < 2 {
        let trim = floats[1];
        floats[0] = linear_to_db(floats[0].max(1e-3));
        floats[1] = 0.0;
        floats[2] = trim;
    }
}

/// Waveshaping distortion.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Drive | -12 to +48 dB | 0 dB |
/// | float 1 | Bias | -1 to +1 (deactivatable) | 0 |
/// | float 2 | Trim | -24 to +12 dB | 0 dB |
/// | int 0 | Shape | Soft / Hard / Fold | Soft |
#[derive(Debug)]
pub struct Waveshaper {
    storage: Arc<LiveStorage>,
    drive: BlockRamp,
    bias: BlockRamp,
    trim: BlockRamp,
}

struct Curves {
    drive: [f32; BLOCK_SIZE],
    bias: [f32; BLOCK_SIZE],
    trim: [f32; BLOCK_SIZE],
    shape: Shape,
}

impl Waveshaper {
    fn bias_target(storage: &LiveStorage) -> f32 {
        if storage.is_deactivated(1) {
            0.0
        } else {
            float_param(storage, 1, &BIAS)
        }
    }

    fn curves(&mut self) -> Curves {
        let s = &self.storage;
        Curves {
            drive: self.drive.next_block(db_to_linear(float_param(s, 0, &DRIVE))),
            bias: self.bias.next_block(Self::bias_target(s)),
            trim: self.trim.next_block(db_to_linear(float_param(s, 2, &TRIM))),
            shape: Shape::from_index(SHAPE.clamp(s.int(0))),
        }
    }

    #[inline]
    fn shape_channel(c: &Curves, input: &[f32; BLOCK_SIZE], output: &mut [f32; BLOCK_SIZE]) {
        for n in 0..BLOCK_SIZE {
            let b = c.bias[n];
            let y = c.shape.apply(c.drive[n] * input[n] + b) - c.shape.apply(b);
            output[n] = y * c.trim[n];
        }
    }
}

impl Processor for Waveshaper {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let curves = self.curves();
        Self::shape_channel(&curves, input, output);
    }

    fn process_stereo(
        &mut self,
        in_left: &[f32; BLOCK_SIZE],
        in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let curves = self.curves();
        Self::shape_channel(&curves, in_left, out_left);
        Self::shape_channel(&curves, in_right, out_right);
    }

    fn reset(&mut self) {
        let s = &self.storage;
        self.drive.snap(db_to_linear(float_param(s, 0, &DRIVE)));
        self.bias.snap(Self::bias_target(s));
        self.trim.snap(db_to_linear(float_param(s, 2, &TRIM)));
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[DRIVE, BIAS, TRIM], &[SHAPE])
    }
}

impl ProcessorType for Waveshaper {
    const NAME: &'static str = "Waveshaper";
    const STREAMING_NAME: &'static str = "waveshaper";
    const DISPLAY_GROUP: &'static str = "Distortion";
    const FLOAT_PARAM_COUNT: usize = 3;
    const INT_PARAM_COUNT: usize = 1;
    const CAPABILITIES: Capabilities =
        Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);
    const STREAMING_VERSION: u16 = 2;
    const REMAP: Option<RemapFn> = Some(remap);

    fn spawn(ctx: SpawnContext) -> Self {
        let mut p = Self {
            storage: ctx.storage,
            drive: BlockRamp::new(1.0),
            bias: BlockRamp::new(0.0),
            trim: BlockRamp::new(1.0),
        };
        p.reset();
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::spawn;

    fn render(ws: &mut Waveshaper, x: f32) -> [f32; BLOCK_SIZE] {
        let mut out = [0.0; BLOCK_SIZE];
        ws.process_mono(&[x; BLOCK_SIZE], &mut out, &BlockContext::default());
        out
    }

    #[test]
    fn silence_stays_silent_with_bias() {
        let (mut ws, storage) = spawn::<Waveshaper>();
        storage.set_float(1, 0.7);
        ws.reset();
        assert!(render(&mut ws, 0.0).iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn soft_shape_is_bounded() {
        let (mut ws, storage) = spawn::<Waveshaper>();
        storage.set_float(0, 48.0);
        ws.reset();
        assert!(render(&mut ws, 0.9).iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn deactivated_bias_is_ignored() {
        let (mut a, sa) = spawn::<Waveshaper>();
        let (mut b, sb) = spawn::<Waveshaper>();
        for s in [&sa, &sb] {
            s.set_float(0, 12.0);
            s.set_float(1, 0.5);
        }
        sb.set_deactivated(1, true);
        a.reset();
        b.reset();
        let with_bias = render(&mut a, 0.3);
        let without = render(&mut b, 0.3);
        assert!((with_bias[0] - without[0]).abs() > 1e-3);
        assert!((without[0] - soft_clip(db_to_linear(12.0) * 0.3)).abs() < 1e-5);
    }

    #[test]
    fn hard_shape_clips() {
        let (mut ws, storage) = spawn::<Waveshaper>();
        storage.set_int(0, 1);
        storage.set_float(0, 24.0);
        ws.reset();
        assert!(render(&mut ws, 0.5).iter().all(|s| (s - 1.0).abs() < 1e-6));
    }

    #[test]
    fn remap_is_noop_for_current_version() {
        let mut floats = [6.0, 0.2, -3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let before = floats;
        remap(2, &mut floats, &mut [0; MAX_INT_PARAMS]);
        assert_eq!(floats, before);
    }
}
