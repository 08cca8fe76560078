//! Four-slot processor chain for strata voices and groups.
//!
//! A chain hosts up to four processors, one per [`Slot`], and routes them
//! through one of six [`Topology`] patterns. Every slot is bound to a
//! [`LiveStorage`](strata_core::LiveStorage) that the control thread writes:
//! parameter, mix and output level changes take effect at the next block
//! (mix and level ramp across it), while type changes are queued and applied
//! by [`ProcessorChain::apply_pending`] between blocks.
//!
//! ```rust
//! use strata_chain::{ChainConfig, ProcessorChain, Topology, request_type};
//! use strata_core::{BLOCK_SIZE, BlockContext, StereoBlock};
//! use strata_registry::codes;
//!
//! let mut chain = ProcessorChain::empty(ChainConfig {
//!     topology: Topology::Ser2,
//!     ..ChainConfig::default()
//! });
//! let slot0 = chain.storage(0).unwrap();
//! request_type(&slot0, codes::AMPLIFIER);
//! chain.apply_pending(None);
//!
//! let mut block = StereoBlock::from_mono(&[0.5; BLOCK_SIZE]);
//! chain.process_block(&mut block, &BlockContext::default());
//! ```
//!
//! # Channel shape
//!
//! A block enters mono or stereo. Mono-to-mono processors keep a mono branch
//! mono, mono-to-stereo processors widen it, and stereo-only processors see
//! the mono channel duplicated. A branch never narrows again within the
//! block; parallel branches of different shapes are reconciled by duplicating
//! the mono one before summing.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
pub(crate) use alloc::sync::Arc;
#[cfg(feature = "std")]
pub(crate) use std::sync::Arc;

mod chain;
mod slot;
mod topology;

pub use chain::{ChainConfig, PAR2_BOTH_GAIN, ProcessorChain, SLOT_COUNT, request_type};
pub use slot::Slot;
pub use topology::{Topology, UnknownTopology};
