//! The processor capability trait and per-type static metadata.
//!
//! A processor is a DSP unit that implements some subset of three channel
//! capabilities:
//!
//! | Capability           | Method                                     |
//! |----------------------|--------------------------------------------|
//! | mono to mono         | [`Processor::process_mono`]                |
//! | mono to stereo       | [`Processor::process_mono_to_stereo`]      |
//! | stereo to stereo     | [`Processor::process_stereo`]              |
//!
//! The subset is declared once through [`Capabilities`]. The chain reads it
//! when the processor is spawned and picks the right entry point from the
//! branch's channel shape; unimplemented entry points are never called (their
//! defaults assert in debug builds and pass audio through in release).
//!
//! Static facts about a concrete type (name, parameter counts, default mix,
//! streaming version, remap hook) live on [`ProcessorType`] as associated
//! constants, so the registry can answer questions about a type without
//! constructing one.

use crate::block::BLOCK_SIZE;
use crate::description::ProcessorControlDescription;
use crate::memory_pool::PoolBlock;
use crate::storage::{LiveStorage, MAX_FLOAT_PARAMS, MAX_INT_PARAMS};

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

/// Set of channel configurations a processor implements.
///
/// ```rust
/// use strata_core::Capabilities;
///
/// let caps = Capabilities::MONO_TO_STEREO.union(Capabilities::STEREO_TO_STEREO);
/// assert!(caps.contains(Capabilities::STEREO_TO_STEREO));
/// assert!(!caps.contains(Capabilities::MONO_TO_MONO));
/// assert!(caps.accepts_mono());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capability; such a processor can only pass audio through.
    pub const NONE: Self = Self(0);
    /// Mono input, mono output.
    pub const MONO_TO_MONO: Self = Self(1 << 0);
    /// Mono input, stereo output.
    pub const MONO_TO_STEREO: Self = Self(1 << 1);
    /// Stereo input, stereo output.
    pub const STEREO_TO_STEREO: Self = Self(1 << 2);
    /// All three configurations.
    pub const ALL: Self = Self(0b111);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two capability sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if a mono branch can be fed directly.
    #[inline]
    pub const fn accepts_mono(self) -> bool {
        self.0 & (Self::MONO_TO_MONO.0 | Self::MONO_TO_STEREO.0) != 0
    }
}

/// Per-block context shared by every processor in a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockContext {
    /// Voice pitch in semitones relative to the keytrack reference note.
    pub pitch: f32,
    /// Host tempo in beats per minute.
    pub tempo_bpm: f32,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            tempo_bpm: 120.0,
        }
    }
}

impl BlockContext {
    /// Frequency multiplier for keytracked parameters: `2^(pitch / 12)`.
    #[inline]
    pub fn pitch_ratio(&self) -> f32 {
        libm::exp2f(self.pitch / 12.0)
    }

    /// Duration of `beats` at the current tempo, in seconds.
    #[inline]
    pub fn beats_to_seconds(&self, beats: f32) -> f32 {
        beats * 60.0 / self.tempo_bpm.max(1.0)
    }

    /// Rate of a cycle lasting `beats` at the current tempo, in Hz.
    #[inline]
    pub fn beats_to_hz(&self, beats: f32) -> f32 {
        self.tempo_bpm.max(1.0) / (60.0 * beats.max(1.0 / 64.0))
    }
}

/// Rewrites parameter arrays written by an older streaming version into the
/// current layout.
///
/// Arguments are the version the arrays were stored with, then the float and
/// integer arrays to update in place.
pub type RemapFn = fn(u16, &mut [f32; MAX_FLOAT_PARAMS], &mut [i32; MAX_INT_PARAMS]);

/// Everything a processor receives at construction.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    /// Bound parameter storage, read every block.
    pub storage: Arc<LiveStorage>,
    /// Sample rate the processor runs at (already multiplied when oversampled).
    pub sample_rate: f32,
    /// Constructed only to read metadata; will never process audio.
    pub needs_metadata: bool,
}

/// A block-based DSP unit.
///
/// Implementations must not allocate, lock, or block in any `process_*`
/// method. Parameters are read from the bound [`LiveStorage`] at block rate.
pub trait Processor {
    /// Channel configurations this processor implements.
    fn capabilities(&self) -> Capabilities;

    /// Processes one mono block.
    fn process_mono(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        output: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        debug_assert!(false, "process_mono called on a processor without MONO_TO_MONO");
        *output = *input;
    }

    /// Processes one mono block into two channels.
    fn process_mono_to_stereo(
        &mut self,
        input: &[f32; BLOCK_SIZE],
        left: &mut [f32; BLOCK_SIZE],
        right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        debug_assert!(
            false,
            "process_mono_to_stereo called on a processor without MONO_TO_STEREO"
        );
        *left = *input;
        *right = *input;
    }

    /// Processes one stereo block.
    fn process_stereo(
        &mut self,
        in_left: &[f32; BLOCK_SIZE],
        in_right: &[f32; BLOCK_SIZE],
        out_left: &mut [f32; BLOCK_SIZE],
        out_right: &mut [f32; BLOCK_SIZE],
        _ctx: &BlockContext,
    ) {
        debug_assert!(
            false,
            "process_stereo called on a processor without STEREO_TO_STEREO"
        );
        *out_left = *in_left;
        *out_right = *in_right;
    }

    /// Clears internal state (filter history, delay contents, phases).
    fn reset(&mut self);

    /// Name and parameter metadata.
    fn control_description(&self) -> ProcessorControlDescription;

    /// Hands the processor a scratch block from the memory pool.
    ///
    /// Processors that need no scratch memory hand the block straight back.
    fn attach_scratch(&mut self, block: PoolBlock) -> Option<PoolBlock> {
        Some(block)
    }

    /// Takes back the scratch block, if one is attached.
    fn detach_scratch(&mut self) -> Option<PoolBlock> {
        None
    }
}

/// Static metadata and construction for a concrete processor type.
pub trait ProcessorType: Processor + Sized {
    /// Display name.
    const NAME: &'static str;
    /// Stable name written to patches.
    const STREAMING_NAME: &'static str;
    /// Group used to sort the type list.
    const DISPLAY_GROUP: &'static str;
    /// Number of float parameters used.
    const FLOAT_PARAM_COUNT: usize;
    /// Number of integer parameters used.
    const INT_PARAM_COUNT: usize;
    /// Channel configurations implemented.
    const CAPABILITIES: Capabilities;
    /// Mix applied when the type is first selected.
    const DEFAULT_MIX: f32 = 1.0;
    /// Only available on group chains, not per-voice chains.
    const GROUP_ONLY: bool = false;
    /// Current parameter layout version.
    const STREAMING_VERSION: u16 = 1;
    /// Layout upgrade hook for older versions.
    const REMAP: Option<RemapFn> = None;

    /// Scratch samples needed from the memory pool at `sample_rate`.
    fn scratch_len(_sample_rate: f32) -> usize {
        0
    }

    /// Constructs an instance bound to `ctx.storage`.
    fn spawn(ctx: SpawnContext) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_union_and_contains() {
        let caps = Capabilities::MONO_TO_MONO.union(Capabilities::STEREO_TO_STEREO);
        assert!(caps.contains(Capabilities::MONO_TO_MONO));
        assert!(!caps.contains(Capabilities::MONO_TO_STEREO));
        assert!(Capabilities::ALL.contains(caps));
        assert!(Capabilities::NONE.is_empty());
    }

    #[test]
    fn stereo_only_does_not_accept_mono() {
        assert!(!Capabilities::STEREO_TO_STEREO.accepts_mono());
        assert!(Capabilities::MONO_TO_STEREO.accepts_mono());
    }

    #[test]
    fn pitch_ratio_octave() {
        let ctx = BlockContext {
            pitch: 12.0,
            ..BlockContext::default()
        };
        assert!((ctx.pitch_ratio() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn tempo_conversions() {
        let ctx = BlockContext::default();
        assert!((ctx.beats_to_seconds(1.0) - 0.5).abs() < 1e-6);
        assert!((ctx.beats_to_hz(1.0) - 2.0).abs() < 1e-6);
    }
}
