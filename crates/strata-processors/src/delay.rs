//! Stereo feedback delay with ping-pong crossfeed.
//!
//! The delay lines do not live inside the processor: they are a single
//! [`PoolBlock`] drawn from the shared memory pool when the processor is
//! spawned, split into a left and a right half. Until a block is attached the
//! processor outputs silence.
//!
//! ## Signal Flow
//!
//! ```text
//! in_L ──(+)──> [line L] ──┬──> out_L
//!         ^                │
//!         └─ fb*((1-pp)*L + pp*R)
//! ```
//!
//! and symmetrically for the right side. Delay time is glided with a one-pole
//! smoother and read with linear interpolation, so time changes pitch-bend
//! instead of clicking.

use crate::{Arc, float_param};
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, LiveStorage, ParamDescriptor, ParamFlags, PoolBlock,
    Processor, ProcessorControlDescription, ProcessorType, SmoothedParam, SpawnContext,
    flush_denormal,
};

/// Longest delay time in seconds (or beats when temposynced).
pub const MAX_DELAY_SECONDS: f32 = 2.0;

const TIME: ParamDescriptor =
    ParamDescriptor::seconds("Time", "Time", 0.001, MAX_DELAY_SECONDS, 0.25)
        .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::TEMPOSYNCABLE));
const FEEDBACK: ParamDescriptor = ParamDescriptor::custom("Feedback", "Fdbk", 0.0, 0.95, 0.35);
const PING_PONG: ParamDescriptor = ParamDescriptor::percent("Ping-Pong", "PngPng", 0.0);

const TIME_SMOOTHING_MS: f32 = 50.0;

/// Stereo delay drawing its lines from the memory pool.
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | float 0 | Time | 1 ms to 2 s, or beats when temposynced | 250 ms |
/// | float 1 | Feedback | 0 to 0.95 | 0.35 |
/// | float 2 | Ping-Pong | 0 to 100% crossfeed | 0% |
///
/// Group-only, default mix 30%.
#[derive(Debug)]
pub struct SimpleDelay {
    storage: Arc<LiveStorage>,
    sample_rate: f32,
    lines: Option<PoolBlock>,
    write: usize,
    time: SmoothedParam,
}

impl SimpleDelay {
    fn target_seconds(&self, ctx: &BlockContext) -> f32 {
        let t = float_param(&self.storage, 0, &TIME);
        if self.storage.is_temposync() {
            ctx.beats_to_seconds(t)
        } else {
            t
        }
    }

    #[inline]
    fn read(line: &[f32], pos: f32) -> f32 {
        let len = line.len();
        let i0 = pos as usize % len;
        let i1 = (i0 + 1) % len;
        let frac = pos - libm::floorf(pos);
        line[i0] + (line[i1] - line[i0]) * frac
    }
}

impl Processor for SimpleDelay {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn process_stereo(
        &mut self,
        in_left: &[f32; BLOCK_SIZE],
        in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        ctx: &BlockContext,
    ) {
        let target = self.target_seconds(ctx) * self.sample_rate;
        let feedback = float_param(&self.storage, 1, &FEEDBACK);
        let pp = float_param(&self.storage, 2, &PING_PONG);

        let Some(lines) = self.lines.as_mut() else {
            out_left.fill(0.0);
            out_right.fill(0.0);
            return;
        };
        let len = lines.len() / 2;
        let (line_l, line_r) = lines.as_mut_slice().split_at_mut(len);
        self.time.set_target(target.clamp(1.0, (len - 2) as f32));

        for n in 0..BLOCK_SIZE {
            let delay = self.time.advance();
            let pos = (self.write + len) as f32 - delay;
            let yl = Self::read(line_l, pos);
            let yr = Self::read(line_r, pos);
            let fl = (1.0 - pp) * yl + pp * yr;
            let fr = (1.0 - pp) * yr + pp * yl;
            line_l[self.write] = flush_denormal(in_left[n] + feedback * fl);
            line_r[self.write] = flush_denormal(in_right[n] + feedback * fr);
            out_left[n] = yl;
            out_right[n] = yr;
            self.write = (self.write + 1) % len;
        }
    }

    fn reset(&mut self) {
        if let Some(lines) = self.lines.as_mut() {
            lines.clear();
        }
        self.write = 0;
        self.time.set_immediate(self.time.target());
    }

    fn control_description(&self) -> ProcessorControlDescription {
        ProcessorControlDescription::new(Self::NAME, &[TIME, FEEDBACK, PING_PONG], &[])
            .with_temposync()
    }

    fn attach_scratch(&mut self, block: PoolBlock) -> Option<PoolBlock> {
        if self.lines.is_some() || block.len() < 8 {
            return Some(block);
        }
        self.lines = Some(block);
        self.write = 0;
        None
    }

    fn detach_scratch(&mut self) -> Option<PoolBlock> {
        self.lines.take()
    }
}

impl ProcessorType for SimpleDelay {
    const NAME: &'static str = "Simple Delay";
    const STREAMING_NAME: &'static str = "simple-delay";
    const DISPLAY_GROUP: &'static str = "Delay";
    const FLOAT_PARAM_COUNT: usize = 3;
    const INT_PARAM_COUNT: usize = 0;
    const CAPABILITIES: Capabilities = Capabilities::STEREO_TO_STEREO;
    const DEFAULT_MIX: f32 = 0.3;
    const GROUP_ONLY: bool = true;

    fn scratch_len(sample_rate: f32) -> usize {
        2 * (libm::ceilf(MAX_DELAY_SECONDS * sample_rate) as usize + 2)
    }

    fn spawn(ctx: SpawnContext) -> Self {
        let seconds = float_param(&ctx.storage, 0, &TIME);
        Self {
            time: SmoothedParam::with_config(
                seconds * ctx.sample_rate,
                ctx.sample_rate,
                TIME_SMOOTHING_MS,
            ),
            storage: ctx.storage,
            sample_rate: ctx.sample_rate,
            lines: None,
            write: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{SAMPLE_RATE, spawn};
    use strata_core::MemoryPool;

    fn with_lines() -> (SimpleDelay, Arc<LiveStorage>) {
        let (mut d, storage) = spawn::<SimpleDelay>();
        let mut pool = MemoryPool::new();
        pool.preallocate(SimpleDelay::scratch_len(SAMPLE_RATE), 1);
        let block = pool.checkout(SimpleDelay::scratch_len(SAMPLE_RATE)).unwrap();
        assert!(d.attach_scratch(block).is_none());
        (d, storage)
    }

    #[test]
    fn silent_without_memory() {
        let (mut d, _storage) = spawn::<SimpleDelay>();
        let (mut l, mut r) = ([1.0; BLOCK_SIZE], [1.0; BLOCK_SIZE]);
        let input = [1.0; BLOCK_SIZE];
        d.process_stereo(&input, &input, &mut l, &mut r, &BlockContext::default());
        assert_eq!(l, [0.0; BLOCK_SIZE]);
        assert_eq!(r, [0.0; BLOCK_SIZE]);
    }

    #[test]
    fn impulse_returns_after_delay_time() {
        let (mut d, storage) = with_lines();
        storage.set_float(0, 0.01);
        storage.set_float(1, 0.0);
        // restart the glide at the new time
        let mut fresh = SimpleDelay::spawn(SpawnContext {
            storage: Arc::clone(&storage),
            sample_rate: SAMPLE_RATE,
            needs_metadata: false,
        });
        assert!(fresh.attach_scratch(d.detach_scratch().unwrap()).is_none());
        let ctx = BlockContext::default();
        let expected = (0.01 * SAMPLE_RATE) as usize;
        let mut found = None;
        for b in 0..60 {
            let mut input = [0.0; BLOCK_SIZE];
            if b == 0 {
                input[0] = 1.0;
            }
            let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
            fresh.process_stereo(&input, &input, &mut l, &mut r, &ctx);
            if let Some(n) = l.iter().position(|s| s.abs() > 0.5) {
                found.get_or_insert(b * BLOCK_SIZE + n);
            }
        }
        assert_eq!(found, Some(expected));
    }

    #[test]
    fn detach_returns_block_once() {
        let (mut d, _storage) = with_lines();
        assert!(d.detach_scratch().is_some());
        assert!(d.detach_scratch().is_none());
    }

    #[test]
    fn declines_second_block() {
        let (mut d, _storage) = with_lines();
        let mut pool = MemoryPool::new();
        pool.preallocate(64, 1);
        let extra = pool.checkout(64).unwrap();
        assert!(d.attach_scratch(extra).is_some());
    }
}
