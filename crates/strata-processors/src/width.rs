//! Mid/side stereo width.
//!
//! ```text
//! mid  = (L + R) / 2
//! side = (L - R) / 2 * width
//! L' = mid + side,  R' = mid - side
//! ```
//!
//! Stereo only: a mono branch reaching this processor is widened first by
//! duplicating its channel, after which width has nothing to scale until
//! something upstream decorrelates the sides.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, BlockRamp, Capabilities, LiveStorage, ParamDescriptor, Processor,
    ProcessorControlDescription, ProcessorType, SpawnContext,
};

const WIDTH: ParamDescriptor = ParamDescriptor::custom("Width", "Width", 0.0, 2.0, 1.0);

/// Stereo width control. 0 collapses to mono, 1 is unchanged, 2 doubles the side signal.
#[derive(Debug)]
pub struct StereoWidth {
    storage: Arc<LiveStorage>,
    width: BlockRamp,
}

impl Processor for StereoWidth {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_stereo(
        &mut self,
        in_left: &[f32; BLOCK_SIZE],
        in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        let width = self
            .width
            .next_block(float_param(&self.storage, 0, &WIDTH));
        for n in 0..BLOCK_SIZE {
            let mid = 0.5 * (in_left[n] + in_right[n]);
            let side = 0.5 * (in_left[n] - in_right[n]) * width[n];
            out_left[n] = mid + side;
            out_right[n] = mid - side;
        }
    }

    fn reset(&mut self) {
        self.width.snap(float_param(&self.storage, 0, &WIDTH));
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[WIDTH], &[])
    }
}

impl ProcessorType for StereoWidth {
    const NAME: &'static str = "Stereo Width";
    const STREAMING_NAME: &'static str = "stereo-width";
    const DISPLAY_GROUP: &'static str = "Utility";
    const FLOAT_PARAM_COUNT: usize = 1;
    const INT_PARAM_COUNT: usize = 0;
    const CAPABILITIES: Capabilities = Capabilities::STEREO_TO_STEREO;

    fn spawn(ctx: SpawnContext) -> Self {
        let width = float_param(&ctx.storage, 0, &WIDTH);
        Self {
            storage: ctx.storage,
            width: BlockRamp::new(width),
        }
    }
}
