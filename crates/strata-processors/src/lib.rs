//! Strata Processors - the concrete processor set of the strata rack.
//!
//! Every type here implements [`strata_core::Processor`] for the channel
//! configurations it supports and [`strata_core::ProcessorType`] for its static
//! metadata. Parameters are never stored in the processor: each instance holds
//! the slot's shared [`LiveStorage`] and reads its float and integer arrays at
//! the start of every block.
//!
//! | Type | Group | Channels | Notes |
//! |------|-------|----------|-------|
//! | [`Amplifier`] | Utility | mono, stereo | gain in dB |
//! | [`VolumePan`] | Utility | mono to stereo, stereo | equal-power pan |
//! | [`StereoWidth`] | Utility | stereo only | mid/side width |
//! | [`Waveshaper`] | Distortion | mono, stereo | streaming version 2 |
//! | [`Bitcrusher`] | Distortion | mono, stereo | bit depth and rate reduction |
//! | [`BiquadFilter`] | Filters | mono, stereo | keytracked cutoff |
//! | [`RingModulator`] | Modulation | mono, stereo | keytracked carrier |
//! | [`Tremolo`] | Modulation | mono to stereo, stereo | temposync |
//! | [`SimpleDelay`] | Delay | stereo only | pool memory, group only |
//! | [`NoiseGenerator`] | Generators | mono, stereo | replaces input |

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
pub(crate) use alloc::sync::Arc;
#[cfg(feature = "std")]
pub(crate) use std::sync::Arc;

use strata_core::{LiveStorage, ParamDescriptor};

pub mod amplifier;
pub mod bitcrusher;
pub mod delay;
pub mod filter;
pub mod noise;
pub mod ring_mod;
pub mod tremolo;
pub mod volume_pan;
pub mod waveshaper;
pub mod width;

pub use amplifier::Amplifier;
pub use bitcrusher::Bitcrusher;
pub use delay::SimpleDelay;
pub use filter::BiquadFilter;
pub use noise::NoiseGenerator;
pub use ring_mod::RingModulator;
pub use tremolo::Tremolo;
pub use volume_pan::VolumePan;
pub use waveshaper::Waveshaper;
pub use width::StereoWidth;

/// Reads float parameter `index`, clamped to the descriptor's range.
#[inline]
pub(crate) fn float_param(storage: &LiveStorage, index: usize, desc: &ParamDescriptor) -> f32 {
    desc.clamp(storage.float(index))
}
