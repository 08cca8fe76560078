//! Preset persistence and validation for strata processor chains.
//!
//! # Features
//!
//! - **Chain presets**: load and save a topology plus four slots as TOML
//! - **Stable slot format**: types are stored by streaming name with a layout
//!   version; older layouts are remapped on load
//! - **Forgiving restore**: unknown types fall back to "none" and are
//!   reported as [`LoadWarning`]s
//! - **Validation**: strict checks against processor metadata
//! - **Factory presets**: built-in chains addressable by name
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_chain::{ChainConfig, Topology};
//! use strata_config::{ChainPreset, StoredProcessor};
//!
//! let preset = ChainPreset::new("Dark Drive")
//!     .with_topology(Topology::Sequential)
//!     .with_slot(StoredProcessor::named("waveshaper"))
//!     .with_slot(StoredProcessor::named("biquad-filter"));
//! preset.save("dark_drive.toml").unwrap();
//!
//! let loaded = ChainPreset::load("dark_drive.toml").unwrap();
//! let (_chain, warnings) = loaded.build_chain(ChainConfig::default(), None);
//! assert!(warnings.is_empty());
//! ```

mod error;
mod preset;
mod stored;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::{ConfigError, PresetIo};
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset, factory_presets, get_factory_preset, is_factory_preset,
};
pub use preset::{ChainPreset, RestoredChain};
pub use stored::{LoadWarning, StoredProcessor};
pub use validation::{ValidationError, ValidationResult, validate_preset, validate_slot};
