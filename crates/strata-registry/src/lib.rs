//! Type registry and in-place processor arena for strata.
//!
//! Every concrete processor is registered once, in [`table`], under a stable
//! small integer [`ProcessorTypeCode`]. From that single entry the crate
//! derives:
//!
//! - **Metadata lookups** ([`name`], [`streaming_name`], [`float_param_count`],
//!   [`default_mix`], [`streaming_version`], [`remap_fn`], ...) served from a
//!   static table indexed by the code, without constructing anything.
//! - **Enum dispatch** through [`AnyProcessor`], one variant per type and one
//!   per oversampled type, so processing never goes through a vtable.
//! - **A build-time size check**: every type, and its oversampled wrapper,
//!   must fit in [`PROCESSOR_ARENA_BYTES`].
//! - **[`ProcessorArena`]**, the aligned per-slot storage that processors are
//!   spawned into and unspawned from between blocks.
//!
//! Unknown or retired codes are "not implemented" and behave exactly like
//! "none": every lookup returns the none entry's values and spawning leaves
//! the arena empty.
//!
//! # Example
//!
//! ```rust
//! use strata_registry::{codes, default_mix, from_streaming_name, name};
//!
//! assert_eq!(name(codes::SIMPLE_DELAY), "Simple Delay");
//! assert_eq!(from_streaming_name("simple-delay"), Some(codes::SIMPLE_DELAY));
//! assert!((default_mix(codes::SIMPLE_DELAY) - 0.3).abs() < 1e-6);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
pub(crate) use alloc::sync::Arc;
#[cfg(feature = "std")]
pub(crate) use std::sync::Arc;

mod arena;
mod natural;
pub mod table;

pub use arena::{ProcessorArena, SpawnRequest};
pub use natural::natural_cmp;
pub use table::{AnyProcessor, BaseProcessor, OversampledProcessor, PROCESSOR_ARENA_BYTES, TypeInfo};

use core::cmp::Ordering;
use strata_core::{
    LiveStorage, OVERSAMPLE_FACTOR, Processor, ProcessorControlDescription, ProcessorStorage,
    ProcessorTypeCode, RemapFn, SpawnContext,
};
use table::TABLE;

/// Registered type codes.
///
/// Codes are persisted only through streaming names, but they are still
/// stable: a retired code is never reassigned.
pub mod codes {
    use strata_core::ProcessorTypeCode;

    /// Identity passthrough.
    pub const NONE: ProcessorTypeCode = ProcessorTypeCode::NONE;
    /// Gain in dB.
    pub const AMPLIFIER: ProcessorTypeCode = ProcessorTypeCode(1);
    /// Volume and equal-power pan.
    pub const VOLUME_PAN: ProcessorTypeCode = ProcessorTypeCode(2);
    /// Mid/side stereo width.
    pub const STEREO_WIDTH: ProcessorTypeCode = ProcessorTypeCode(3);
    /// Drive, bias and trim around a shaping curve.
    pub const WAVESHAPER: ProcessorTypeCode = ProcessorTypeCode(4);
    /// Multimode biquad.
    pub const BIQUAD_FILTER: ProcessorTypeCode = ProcessorTypeCode(5);
    /// Bit depth and rate reduction.
    pub const BITCRUSHER: ProcessorTypeCode = ProcessorTypeCode(6);
    /// Carrier multiplication.
    pub const RING_MODULATOR: ProcessorTypeCode = ProcessorTypeCode(8);
    /// Amplitude modulation.
    pub const TREMOLO: ProcessorTypeCode = ProcessorTypeCode(9);
    /// Pool-backed stereo delay.
    pub const SIMPLE_DELAY: ProcessorTypeCode = ProcessorTypeCode(10);
    /// White to dark noise.
    pub const NOISE: ProcessorTypeCode = ProcessorTypeCode(11);
}

/// Table entry for `code`, if the code is registered.
pub fn type_info(code: ProcessorTypeCode) -> Option<&'static TypeInfo> {
    TABLE.get(code.raw() as usize).and_then(Option::as_ref)
}

fn info_or_none(code: ProcessorTypeCode) -> &'static TypeInfo {
    static NONE: TypeInfo = TypeInfo::NONE;
    type_info(code).unwrap_or(&NONE)
}

/// Whether `code` names a registered type ("none" included).
pub fn is_implemented(code: ProcessorTypeCode) -> bool {
    type_info(code).is_some()
}

/// Display name.
pub fn name(code: ProcessorTypeCode) -> &'static str {
    info_or_none(code).name
}

/// Stable name used in persisted patches.
pub fn streaming_name(code: ProcessorTypeCode) -> &'static str {
    info_or_none(code).streaming_name
}

/// Display group.
pub fn display_group(code: ProcessorTypeCode) -> &'static str {
    info_or_none(code).display_group
}

/// Float parameters the type uses.
pub fn float_param_count(code: ProcessorTypeCode) -> usize {
    info_or_none(code).float_param_count
}

/// Integer parameters the type uses.
pub fn int_param_count(code: ProcessorTypeCode) -> usize {
    info_or_none(code).int_param_count
}

/// Mix written when the type is first selected.
pub fn default_mix(code: ProcessorTypeCode) -> f32 {
    info_or_none(code).default_mix
}

/// Whether the type is restricted to group chains.
pub fn is_group_only(code: ProcessorTypeCode) -> bool {
    info_or_none(code).group_only
}

/// Current parameter layout version.
pub fn streaming_version(code: ProcessorTypeCode) -> u16 {
    info_or_none(code).streaming_version
}

/// Layout upgrade hook, if the type has ever changed its layout.
pub fn remap_fn(code: ProcessorTypeCode) -> Option<RemapFn> {
    info_or_none(code).remap
}

/// Looks a type up by its streaming name.
///
/// Linear scan; only used while loading patches.
pub fn from_streaming_name(name: &str) -> Option<ProcessorTypeCode> {
    TABLE
        .iter()
        .flatten()
        .find(|info| info.streaming_name == name)
        .map(|info| info.code)
}

/// Every implemented type, "none" first, then by display group and name.
pub fn all_descriptions() -> Vec<&'static TypeInfo> {
    let mut list: Vec<&'static TypeInfo> = TABLE.iter().flatten().collect();
    list.sort_by(|a, b| {
        match (a.code.is_none(), b.code.is_none()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        natural_cmp(a.display_group, b.display_group).then_with(|| natural_cmp(a.name, b.name))
    });
    list
}

/// Largest pool block any registered type asks for at `sample_rate`.
pub fn max_scratch_len(sample_rate: f32, oversampled: bool) -> usize {
    let rate = if oversampled {
        sample_rate * OVERSAMPLE_FACTOR as f32
    } else {
        sample_rate
    };
    TABLE
        .iter()
        .flatten()
        .map(|info| (info.scratch_len)(rate))
        .max()
        .unwrap_or(0)
}

/// Parameter metadata for `code`, read from a metadata-only instance.
pub fn control_description(code: ProcessorTypeCode) -> ProcessorControlDescription {
    let storage = Arc::new(LiveStorage::default());
    let ctx = SpawnContext {
        storage,
        sample_rate: 48000.0,
        needs_metadata: true,
    };
    match AnyProcessor::spawn(code, ctx, false) {
        Some(processor) => processor.control_description(),
        None => ProcessorControlDescription::empty(name(code)),
    }
}

/// Storage for a freshly selected `code`: parameter defaults, default mix
/// and current streaming version.
///
/// Unknown codes yield the "none" storage.
pub fn default_storage(code: ProcessorTypeCode) -> ProcessorStorage {
    let mut storage = ProcessorStorage::default();
    if !is_implemented(code) || code.is_none() {
        return storage;
    }
    control_description(code).write_defaults(&mut storage);
    storage.type_code = code;
    storage.mix = default_mix(code);
    storage.streaming_version = streaming_version(code);
    storage
}

/// Brings `storage` up to its type's current layout.
///
/// Runs the type's remap hook when the stored version is older than the
/// registered one and stamps the current version. Returns `true` if the
/// arrays were rewritten.
pub fn upgrade_storage(storage: &mut ProcessorStorage) -> bool {
    let current = streaming_version(storage.type_code);
    if storage.streaming_version == current {
        return false;
    }
    let remapped = match remap_fn(storage.type_code) {
        Some(remap) if storage.streaming_version < current => {
            remap(storage.streaming_version, &mut storage.floats, &mut storage.ints);
            true
        }
        _ => false,
    };
    storage.streaming_version = current;
    remapped
}
