//! Chain preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::stored::{LoadWarning, StoredProcessor};
use strata_chain::{ChainConfig, ProcessorChain, SLOT_COUNT, Topology};
use strata_core::{LiveStorage, MemoryPool, ProcessorStorage};

/// A saved processor chain: routing plus four slots.
///
/// # TOML Format
///
/// ```toml
/// name = "Crunch Pad"
/// description = "Drive into a resonant low pass"
/// topology = "ser2"
///
/// [[slots]]
/// type = "waveshaper"
/// version = 2
/// floats = [12.0, 0.0, -6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
/// ints = [1, 0, 0, 0]
/// mix = 1.0
/// output_level_db = 0.0
///
/// [[slots]]
/// type = "biquad-filter"
/// ```
///
/// Files are always written with four slot entries. Missing entries load as
/// "none"; entries past the fourth are ignored with a [`LoadWarning`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Routing between the slots.
    #[serde(default)]
    pub topology: Topology,

    /// Slots in order.
    #[serde(default)]
    pub slots: Vec<StoredProcessor>,
}

/// Runtime storage rebuilt from a preset.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredChain {
    /// Routing.
    pub topology: Topology,
    /// One storage per slot, upgraded to current layouts.
    pub storage: [ProcessorStorage; SLOT_COUNT],
    /// Everything the restore had to work around.
    pub warnings: Vec<LoadWarning>,
}

impl ChainPreset {
    /// Create a new empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            topology: Topology::Sequential,
            slots: Vec::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the routing.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Append a slot.
    pub fn with_slot(mut self, slot: StoredProcessor) -> Self {
        self.slots.push(slot);
        self
    }

    /// Captures four storages.
    pub fn from_storage(
        name: impl Into<String>,
        topology: Topology,
        storage: &[ProcessorStorage; SLOT_COUNT],
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            topology,
            slots: storage.iter().map(StoredProcessor::from_storage).collect(),
        }
    }

    /// Captures the current state of a running chain.
    pub fn from_chain(name: impl Into<String>, chain: &ProcessorChain) -> Self {
        Self::from_storage(name, chain.topology(), &chain.snapshot())
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset = Self::from_toml(&content).map_err(|e| e.in_file(path))?;
        tracing::debug!(path = %path.display(), name = %preset.name, "loaded preset");
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), name = %self.name, "saved preset");
        Ok(())
    }

    /// Convert the preset to a TOML string with at least four slot entries.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.padded())?)
    }

    fn padded(&self) -> Self {
        let mut out = self.clone();
        while out.slots.len() < SLOT_COUNT {
            out.slots.push(StoredProcessor::none());
        }
        out
    }

    /// Rebuilds runtime storage for every slot.
    pub fn restore(&self) -> RestoredChain {
        let mut warnings = Vec::new();
        let storage = core::array::from_fn(|i| match self.slots.get(i) {
            Some(slot) => slot.restore(i, &mut warnings),
            None => ProcessorStorage::default(),
        });
        if self.slots.len() > SLOT_COUNT {
            let count = self.slots.len() - SLOT_COUNT;
            tracing::warn!(preset = %self.name, count, "ignoring extra slots");
            warnings.push(LoadWarning::ExtraSlots { count });
        }
        RestoredChain {
            topology: self.topology,
            storage,
            warnings,
        }
    }

    /// Builds a chain from this preset. The preset's topology replaces
    /// `config.topology`.
    pub fn build_chain(
        &self,
        config: ChainConfig,
        pool: Option<&mut MemoryPool>,
    ) -> (ProcessorChain, Vec<LoadWarning>) {
        let restored = self.restore();
        let storage = restored.storage.map(|s| Arc::new(LiveStorage::new(&s)));
        let chain = ProcessorChain::new(
            ChainConfig {
                topology: restored.topology,
                ..config
            },
            storage,
            pool,
        );
        (chain, restored.warnings)
    }

    /// Number of slots that name a processor other than "none".
    pub fn active_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.type_name != "none").count()
    }
}

impl Default for ChainPreset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
