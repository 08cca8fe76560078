//! Editor-facing metadata derived from a live processor.
//!
//! A [`ProcessorControlDescription`] is computed on demand (never per block)
//! and holds everything an editor or preset validator needs to present a
//! slot: the type's name and the descriptor of every used parameter. It is a
//! fixed-size value with no heap storage so it can be produced anywhere.

use crate::param_info::{IntParamDescriptor, ParamDescriptor};
use crate::storage::{MAX_FLOAT_PARAMS, MAX_INT_PARAMS, ProcessorStorage};

/// Name and parameter metadata for one processor type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorControlDescription {
    /// Display name.
    pub name: &'static str,
    /// Float parameter descriptors; `None` marks an unused position.
    pub floats: [Option<ParamDescriptor>; MAX_FLOAT_PARAMS],
    /// Integer parameter descriptors; `None` marks an unused position.
    pub ints: [Option<IntParamDescriptor>; MAX_INT_PARAMS],
    /// Some parameter follows the voice pitch.
    pub supports_keytrack: bool,
    /// Time or rate parameters can be synced to tempo.
    pub supports_temposync: bool,
}

impl ProcessorControlDescription {
    /// Description with no parameters, used for the passthrough type.
    pub const fn empty(name: &'static str) -> Self {
        Self {
            name,
            floats: [None; MAX_FLOAT_PARAMS],
            ints: [None; MAX_INT_PARAMS],
            supports_keytrack: false,
            supports_temposync: false,
        }
    }

    /// Builds a description from leading float and int descriptors.
    ///
    /// Descriptors beyond the fixed capacity are ignored.
    pub fn new(name: &'static str, floats: &[ParamDescriptor], ints: &[IntParamDescriptor]) -> Self {
        let mut desc = Self::empty(name);
        for (slot, d) in desc.floats.iter_mut().zip(floats.iter()) {
            *slot = Some(*d);
        }
        for (slot, d) in desc.ints.iter_mut().zip(ints.iter()) {
            *slot = Some(*d);
        }
        desc
    }

    /// Marks the description as keytrack-capable.
    pub fn with_keytrack(mut self) -> Self {
        self.supports_keytrack = true;
        self
    }

    /// Marks the description as temposync-capable.
    pub fn with_temposync(mut self) -> Self {
        self.supports_temposync = true;
        self
    }

    /// Number of used float positions.
    pub fn float_count(&self) -> usize {
        self.floats.iter().filter(|d| d.is_some()).count()
    }

    /// Number of used integer positions.
    pub fn int_count(&self) -> usize {
        self.ints.iter().filter(|d| d.is_some()).count()
    }

    /// Writes each descriptor's default into `storage`.
    ///
    /// Unused positions are zeroed.
    pub fn write_defaults(&self, storage: &mut ProcessorStorage) {
        for (v, d) in storage.floats.iter_mut().zip(self.floats.iter()) {
            *v = d.map_or(0.0, |d| d.default);
        }
        for (v, d) in storage.ints.iter_mut().zip(self.ints.iter()) {
            *v = d.map_or(0, |d| d.default);
        }
    }
}
