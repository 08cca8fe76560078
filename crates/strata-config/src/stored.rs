//! Persisted form of one chain slot.
//!
//! A [`StoredProcessor`] names its type by the stable streaming name rather
//! than the numeric code, and carries the parameter layout version it was
//! written in. Restoring runs the type's remap hook when that version is older
//! than the current one.

use serde::{Deserialize, Serialize};
use strata_core::{ProcessorStorage, ProcessorTypeCode};
use strata_registry::{
    default_mix, default_storage, from_streaming_name, streaming_name, streaming_version,
    upgrade_storage,
};
use thiserror::Error;

/// Something a restore had to paper over.
///
/// Warnings never stop a load; the affected slot falls back to "none" or is
/// used as stored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadWarning {
    /// The streaming name is not registered in this build.
    #[error("slot {slot}: unknown processor type '{name}', using none")]
    UnknownType {
        /// Slot index.
        slot: usize,
        /// Streaming name as stored.
        name: String,
    },

    /// The stored layout is newer than this build understands.
    #[error("slot {slot}: '{name}' version {stored} is newer than supported version {current}")]
    NewerVersion {
        /// Slot index.
        slot: usize,
        /// Streaming name.
        name: String,
        /// Version in the file.
        stored: u16,
        /// Version this build writes.
        current: u16,
    },

    /// More than four slots were stored; the extras are ignored.
    #[error("{count} extra slot(s) ignored")]
    ExtraSlots {
        /// Number of ignored entries.
        count: usize,
    },
}

/// One slot as written to a preset file.
///
/// Missing arrays and fields are filled in on restore: parameters from the
/// type's defaults when the stored version is current (zero otherwise), mix
/// from the type's default mix, version from the current version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProcessor {
    /// Streaming name of the processor type.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Parameter layout version the arrays are written in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u16>,

    /// Float parameters.
    #[serde(default)]
    pub floats: Vec<f32>,

    /// Integer parameters.
    #[serde(default)]
    pub ints: Vec<i32>,

    /// Dry/wet amount, 0.0 to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix: Option<f32>,

    /// Post-processing gain in dB.
    #[serde(default)]
    pub output_level_db: f32,

    /// Interpret time and rate parameters in beats.
    #[serde(default)]
    pub temposync: bool,

    /// Slot is bypassed.
    #[serde(default)]
    pub bypassed: bool,

    /// Per-float-parameter deactivated flags.
    #[serde(default)]
    pub deactivated: Vec<bool>,
}

impl Default for StoredProcessor {
    fn default() -> Self {
        Self::none()
    }
}

impl StoredProcessor {
    /// An empty slot.
    pub fn none() -> Self {
        Self::from_storage(&ProcessorStorage::default())
    }

    /// A slot of type `name` with every other field left to defaults.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            type_name: name.into(),
            version: None,
            floats: Vec::new(),
            ints: Vec::new(),
            mix: None,
            output_level_db: 0.0,
            temposync: false,
            bypassed: false,
            deactivated: Vec::new(),
        }
    }

    /// Captures `storage` for writing. Arrays are written in full.
    pub fn from_storage(storage: &ProcessorStorage) -> Self {
        Self {
            type_name: streaming_name(storage.type_code).to_string(),
            version: Some(storage.streaming_version),
            floats: storage.floats.to_vec(),
            ints: storage.ints.to_vec(),
            mix: Some(storage.mix),
            output_level_db: storage.output_level_db,
            temposync: storage.temposync,
            bypassed: storage.bypassed,
            deactivated: storage.deactivated.to_vec(),
        }
    }

    /// Type code for the stored name, if this build knows it.
    pub fn type_code(&self) -> Option<ProcessorTypeCode> {
        from_streaming_name(&self.type_name)
    }

    /// Rebuilds the runtime storage for slot `slot`, upgrading older layouts.
    ///
    /// Problems are appended to `warnings` and logged.
    pub fn restore(&self, slot: usize, warnings: &mut Vec<LoadWarning>) -> ProcessorStorage {
        let Some(code) = self.type_code() else {
            tracing::warn!(slot, name = %self.type_name, "unknown processor type, using none");
            warnings.push(LoadWarning::UnknownType {
                slot,
                name: self.type_name.clone(),
            });
            return ProcessorStorage::default();
        };

        let current = streaming_version(code);
        let version = self.version.unwrap_or(current);
        let mut storage = if version == current {
            default_storage(code)
        } else {
            ProcessorStorage {
                type_code: code,
                ..ProcessorStorage::default()
            }
        };
        overlay(&mut storage.floats, &self.floats);
        overlay(&mut storage.ints, &self.ints);
        overlay(&mut storage.deactivated, &self.deactivated);
        storage.mix = self.mix.unwrap_or_else(|| default_mix(code));
        storage.output_level_db = self.output_level_db;
        storage.temposync = self.temposync;
        storage.bypassed = self.bypassed;
        storage.streaming_version = version;

        if version > current {
            tracing::warn!(
                slot,
                name = %self.type_name,
                stored = version,
                current,
                "stored layout is newer than this build"
            );
            warnings.push(LoadWarning::NewerVersion {
                slot,
                name: self.type_name.clone(),
                stored: version,
                current,
            });
        }
        if upgrade_storage(&mut storage) {
            tracing::debug!(
                slot,
                name = %self.type_name,
                from = version,
                to = current,
                "remapped parameters"
            );
        }
        storage
    }
}

/// Copies as many leading entries of `src` as fit into `dst`.
fn overlay<T: Copy, const N: usize>(dst: &mut [T; N], src: &[T]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = *s;
    }
}
