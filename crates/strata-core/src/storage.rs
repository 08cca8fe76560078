//! Per-slot processor state.
//!
//! [`ProcessorStorage`] is the plain value that gets persisted with a patch:
//! type code, parameter arrays, mix, output level and flags.
//!
//! [`LiveStorage`] is the same data in a form both threads can touch. The
//! control thread writes values with relaxed stores; a spawned processor holds
//! an `Arc<LiveStorage>` and reads its parameters from it every block. Nothing
//! is copied into the processor, so a parameter change needs no message to the
//! audio thread. Torn reads across a block boundary are acceptable because the
//! chain ramps everything audible over a full block.
//!
//! The one ordered field is the requested type code: a control thread first
//! writes the new type's default parameters, then publishes the code with
//! `Release`. The audio thread reads it with `Acquire` between blocks.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU16, AtomicU32, Ordering};

/// Number of float parameters every storage carries.
pub const MAX_FLOAT_PARAMS: usize = 9;

/// Number of integer parameters every storage carries.
pub const MAX_INT_PARAMS: usize = 4;

/// Stable identifier for a concrete processor implementation.
///
/// Codes are persisted with patches and never reused once retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ProcessorTypeCode(pub u16);

impl ProcessorTypeCode {
    /// Identity passthrough; a slot holding this code has no processor.
    pub const NONE: Self = Self(0);

    /// Returns `true` for the passthrough code.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Raw integer value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ProcessorTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Persisted state of one chain slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorStorage {
    /// Selected processor type.
    pub type_code: ProcessorTypeCode,
    /// Float parameters in the type's layout.
    pub floats: [f32; MAX_FLOAT_PARAMS],
    /// Integer parameters in the type's layout.
    pub ints: [i32; MAX_INT_PARAMS],
    /// Dry/wet amount, 0.0 (dry) to 1.0 (wet).
    pub mix: f32,
    /// Post-processing gain in dB.
    pub output_level_db: f32,
    /// Interpret time and rate parameters in beats.
    pub temposync: bool,
    /// Per-float-parameter "switched off" flags.
    pub deactivated: [bool; MAX_FLOAT_PARAMS],
    /// Slot is bypassed.
    pub bypassed: bool,
    /// Parameter layout version the arrays are written in.
    pub streaming_version: u16,
}

impl Default for ProcessorStorage {
    fn default() -> Self {
        Self {
            type_code: ProcessorTypeCode::NONE,
            floats: [0.0; MAX_FLOAT_PARAMS],
            ints: [0; MAX_INT_PARAMS],
            mix: 1.0,
            output_level_db: 0.0,
            temposync: false,
            deactivated: [false; MAX_FLOAT_PARAMS],
            bypassed: false,
            streaming_version: 1,
        }
    }
}

impl ProcessorStorage {
    /// Deactivated flags packed into a bitset, bit `i` for float parameter `i`.
    pub fn deactivated_bits(&self) -> u16 {
        self.deactivated
            .iter()
            .enumerate()
            .fold(0, |bits, (i, &d)| if d { bits | (1 << i) } else { bits })
    }

    /// Sets the deactivated flags from a packed bitset.
    pub fn set_deactivated_bits(&mut self, bits: u16) {
        for (i, d) in self.deactivated.iter_mut().enumerate() {
            *d = bits & (1 << i) != 0;
        }
    }
}

/// Lock-free shared form of [`ProcessorStorage`].
#[derive(Debug)]
pub struct LiveStorage {
    requested_type: AtomicU16,
    streaming_version: AtomicU16,
    floats: [AtomicU32; MAX_FLOAT_PARAMS],
    ints: [AtomicI32; MAX_INT_PARAMS],
    mix: AtomicU32,
    output_level_db: AtomicU32,
    deactivated: AtomicU16,
    temposync: AtomicBool,
    bypassed: AtomicBool,
}

impl Default for LiveStorage {
    fn default() -> Self {
        Self::new(&ProcessorStorage::default())
    }
}

impl LiveStorage {
    /// Creates live storage holding `storage`.
    pub fn new(storage: &ProcessorStorage) -> Self {
        let live = Self {
            requested_type: AtomicU16::new(0),
            streaming_version: AtomicU16::new(0),
            floats: core::array::from_fn(|_| AtomicU32::new(0)),
            ints: core::array::from_fn(|_| AtomicI32::new(0)),
            mix: AtomicU32::new(0),
            output_level_db: AtomicU32::new(0),
            deactivated: AtomicU16::new(0),
            temposync: AtomicBool::new(false),
            bypassed: AtomicBool::new(false),
        };
        live.store(storage);
        live
    }

    /// Overwrites every field, publishing the type code last.
    pub fn store(&self, storage: &ProcessorStorage) {
        for (slot, v) in self.floats.iter().zip(storage.floats.iter()) {
            slot.store(v.to_bits(), Ordering::Relaxed);
        }
        for (slot, v) in self.ints.iter().zip(storage.ints.iter()) {
            slot.store(*v, Ordering::Relaxed);
        }
        self.set_mix(storage.mix);
        self.set_output_level_db(storage.output_level_db);
        self.set_temposync(storage.temposync);
        self.set_bypassed(storage.bypassed);
        self.deactivated
            .store(storage.deactivated_bits(), Ordering::Relaxed);
        self.streaming_version
            .store(storage.streaming_version, Ordering::Relaxed);
        self.requested_type
            .store(storage.type_code.0, Ordering::Release);
    }

    /// Reads every field into a plain value.
    pub fn snapshot(&self) -> ProcessorStorage {
        let mut storage = ProcessorStorage {
            type_code: self.requested_type(),
            floats: core::array::from_fn(|i| self.float(i)),
            ints: core::array::from_fn(|i| self.int(i)),
            mix: self.mix(),
            output_level_db: self.output_level_db(),
            temposync: self.is_temposync(),
            deactivated: [false; MAX_FLOAT_PARAMS],
            bypassed: self.is_bypassed(),
            streaming_version: self.streaming_version.load(Ordering::Relaxed),
        };
        storage.set_deactivated_bits(self.deactivated.load(Ordering::Relaxed));
        storage
    }

    /// Type code most recently requested by the control thread.
    #[inline]
    pub fn requested_type(&self) -> ProcessorTypeCode {
        ProcessorTypeCode(self.requested_type.load(Ordering::Acquire))
    }

    /// Float parameter `index`; out-of-range indices read as 0.0.
    #[inline]
    pub fn float(&self, index: usize) -> f32 {
        self.floats
            .get(index)
            .map_or(0.0, |v| f32::from_bits(v.load(Ordering::Relaxed)))
    }

    /// Writes float parameter `index`; out-of-range indices are ignored.
    #[inline]
    pub fn set_float(&self, index: usize, value: f32) {
        if let Some(slot) = self.floats.get(index) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    /// Integer parameter `index`; out-of-range indices read as 0.
    #[inline]
    pub fn int(&self, index: usize) -> i32 {
        self.ints
            .get(index)
            .map_or(0, |v| v.load(Ordering::Relaxed))
    }

    /// Writes integer parameter `index`; out-of-range indices are ignored.
    #[inline]
    pub fn set_int(&self, index: usize, value: i32) {
        if let Some(slot) = self.ints.get(index) {
            slot.store(value, Ordering::Relaxed);
        }
    }

    /// Dry/wet amount.
    #[inline]
    pub fn mix(&self) -> f32 {
        f32::from_bits(self.mix.load(Ordering::Relaxed))
    }

    /// Sets the dry/wet amount; consumed as the next block's ramp target.
    #[inline]
    pub fn set_mix(&self, mix: f32) {
        self.mix.store(mix.to_bits(), Ordering::Relaxed);
    }

    /// Output level in dB.
    #[inline]
    pub fn output_level_db(&self) -> f32 {
        f32::from_bits(self.output_level_db.load(Ordering::Relaxed))
    }

    /// Sets the output level in dB.
    #[inline]
    pub fn set_output_level_db(&self, db: f32) {
        self.output_level_db.store(db.to_bits(), Ordering::Relaxed);
    }

    /// Temposync flag.
    #[inline]
    pub fn is_temposync(&self) -> bool {
        self.temposync.load(Ordering::Relaxed)
    }

    /// Sets the temposync flag.
    #[inline]
    pub fn set_temposync(&self, on: bool) {
        self.temposync.store(on, Ordering::Relaxed);
    }

    /// Bypass flag.
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed.load(Ordering::Relaxed)
    }

    /// Sets the bypass flag.
    #[inline]
    pub fn set_bypassed(&self, on: bool) {
        self.bypassed.store(on, Ordering::Relaxed);
    }

    /// Returns `true` if float parameter `index` is switched off.
    #[inline]
    pub fn is_deactivated(&self, index: usize) -> bool {
        index < MAX_FLOAT_PARAMS && self.deactivated.load(Ordering::Relaxed) & (1 << index) != 0
    }

    /// Switches float parameter `index` off or on.
    pub fn set_deactivated(&self, index: usize, off: bool) {
        if index >= MAX_FLOAT_PARAMS {
            return;
        }
        let bit = 1 << index;
        if off {
            self.deactivated.fetch_or(bit, Ordering::Relaxed);
        } else {
            self.deactivated.fetch_and(!bit, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_storage() -> ProcessorStorage {
        let mut s = ProcessorStorage {
            type_code: ProcessorTypeCode(4),
            mix: 0.25,
            output_level_db: -3.0,
            temposync: true,
            streaming_version: 2,
            ..ProcessorStorage::default()
        };
        s.floats[0] = 12.0;
        s.floats[8] = -0.5;
        s.ints[3] = 7;
        s.deactivated[1] = true;
        s
    }

    #[test]
    fn live_snapshot_matches_stored_value() {
        let storage = sample_storage();
        let live = LiveStorage::new(&storage);
        assert_eq!(live.snapshot(), storage);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let live = LiveStorage::default();
        live.set_float(MAX_FLOAT_PARAMS, 1.0);
        live.set_int(MAX_INT_PARAMS + 2, 5);
        assert_eq!(live.float(MAX_FLOAT_PARAMS), 0.0);
        assert_eq!(live.int(MAX_INT_PARAMS + 2), 0);
        assert!(!live.is_deactivated(12));
    }

    #[test]
    fn deactivated_bits_roundtrip() {
        let mut storage = ProcessorStorage::default();
        storage.set_deactivated_bits(0b1_0000_0101);
        assert!(storage.deactivated[0]);
        assert!(!storage.deactivated[1]);
        assert!(storage.deactivated[8]);
        assert_eq!(storage.deactivated_bits(), 0b1_0000_0101);
    }

    #[test]
    fn set_deactivated_toggles_single_bit() {
        let live = LiveStorage::default();
        live.set_deactivated(3, true);
        live.set_deactivated(5, true);
        live.set_deactivated(3, false);
        assert!(!live.is_deactivated(3));
        assert!(live.is_deactivated(5));
    }

    #[test]
    fn default_storage_is_passthrough() {
        let storage = ProcessorStorage::default();
        assert!(storage.type_code.is_none());
        assert_eq!(storage.mix, 1.0);
    }
}
