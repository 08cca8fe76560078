//! Strata Core - shared vocabulary for the strata processor rack.
//!
//! A strata chain is a fixed rack of four slots, each hosting at most one
//! runtime-selected processor, evaluated once per [`BLOCK_SIZE`]-frame block
//! on the audio thread. This crate defines what every other crate agrees on:
//!
//! # Processors
//!
//! - [`Processor`] - block processing through any subset of mono-to-mono,
//!   mono-to-stereo and stereo-to-stereo, declared by [`Capabilities`]
//! - [`ProcessorType`] - static per-type metadata (names, parameter counts,
//!   default mix, streaming version, remap hook) and construction
//! - [`Oversampled`] - runs any processor at twice the base rate
//!
//! # State
//!
//! - [`ProcessorTypeCode`] - stable persisted type identifier
//! - [`ProcessorStorage`] - persisted slot state
//! - [`LiveStorage`] - the same state shared lock-free between control and audio threads
//! - [`ProcessorControlDescription`], [`ParamDescriptor`], [`IntParamDescriptor`] - editor metadata
//!
//! # Real-time building blocks
//!
//! - [`StereoBlock`] - fixed two-channel block with a channel-shape flag
//! - [`BlockRamp`] - one-block linear ramp for mix and level
//! - [`MemoryPool`] - pre-sized scratch buffers for processors with delay lines
//! - [`Biquad`], [`Lfo`], [`SmoothedParam`] and the helpers in [`math`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for embedded targets (an
//! allocator is still required for the memory pool):
//!
//! ```toml
//! [dependencies]
//! strata-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod block;
pub mod description;
pub mod lfo;
pub mod math;
pub mod memory_pool;
pub mod oversample;
pub mod param;
pub mod param_info;
pub mod processor;
pub mod storage;

pub use biquad::{Biquad, BiquadCoefficients, FilterMode};
pub use block::{BLOCK_SIZE, BLOCK_SIZE_INV, StereoBlock};
pub use description::ProcessorControlDescription;
pub use lfo::{Lfo, LfoWaveform};
pub use math::{
    db_to_linear, flush_denormal, foldback, hard_clip, linear_to_db, pan_gains, soft_clip,
    wet_dry_mix,
};
pub use memory_pool::{MemoryPool, PoolBlock};
pub use oversample::{OVERSAMPLE_FACTOR, Oversampled};
pub use param::{BlockRamp, SmoothedParam};
pub use param_info::{
    DisplayValue, IntParamDescriptor, ParamDescriptor, ParamFlags, ParamScale, ParamUnit,
};
pub use processor::{
    BlockContext, Capabilities, Processor, ProcessorType, RemapFn, SpawnContext,
};
pub use storage::{
    LiveStorage, MAX_FLOAT_PARAMS, MAX_INT_PARAMS, ProcessorStorage, ProcessorTypeCode,
};
