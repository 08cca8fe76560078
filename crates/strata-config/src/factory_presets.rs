//! Factory presets bundled with the library.
//!
//! Built from registry defaults at call time, so they always match the
//! current parameter layouts.

use crate::{ChainPreset, ConfigError};
use strata_chain::{SLOT_COUNT, Topology};
use strata_core::ProcessorStorage;
use strata_registry::{codes, default_storage};

/// Names of every factory preset, in listing order.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "crunch",
    "lofi",
    "wide-tremolo",
    "bell-ring",
    "breath",
    "slapback",
];

fn none() -> ProcessorStorage {
    ProcessorStorage::default()
}

fn build(name: &str) -> Option<ChainPreset> {
    let (description, topology, slots): (&str, Topology, [ProcessorStorage; SLOT_COUNT]) =
        match name {
            "init" => ("Empty chain", Topology::Sequential, [none(), none(), none(), none()]),
            "crunch" => {
                let mut drive = default_storage(codes::WAVESHAPER);
                drive.floats[0] = 18.0;
                drive.floats[2] = -9.0;
                let mut tone = default_storage(codes::BIQUAD_FILTER);
                tone.floats[0] = 3500.0;
                (
                    "Soft clipper into a low pass",
                    Topology::Sequential,
                    [drive, tone, none(), none()],
                )
            }
            "lofi" => {
                let mut crush = default_storage(codes::BITCRUSHER);
                crush.floats[0] = 6.0;
                crush.floats[1] = 4.0;
                let mut dark = default_storage(codes::BIQUAD_FILTER);
                dark.floats[0] = 2500.0;
                let mut clean = default_storage(codes::AMPLIFIER);
                clean.floats[0] = -3.0;
                (
                    "Crushed and filtered, blended with a clean path",
                    Topology::Par3,
                    [crush, clean, none(), dark],
                )
            }
            "wide-tremolo" => {
                let mut trem = default_storage(codes::TREMOLO);
                trem.floats[0] = 4.0;
                trem.floats[1] = 0.7;
                trem.floats[2] = 1.0;
                let mut width = default_storage(codes::STEREO_WIDTH);
                width.floats[0] = 1.6;
                (
                    "Stereo tremolo with widened image",
                    Topology::Sequential,
                    [trem, width, none(), none()],
                )
            }
            "bell-ring" => {
                let mut ring = default_storage(codes::RING_MODULATOR);
                ring.floats[0] = 440.0;
                ring.ints[1] = 1;
                ring.mix = 0.6;
                let mut body = default_storage(codes::BIQUAD_FILTER);
                body.floats[0] = 1200.0;
                body.floats[1] = 4.0;
                body.ints[0] = 2;
                (
                    "Keytracked ring modulation beside a resonant band pass",
                    Topology::Par2,
                    [ring, none(), body, none()],
                )
            }
            "breath" => {
                let mut noise = default_storage(codes::NOISE);
                noise.floats[0] = -24.0;
                noise.floats[1] = 0.6;
                noise.mix = 0.3;
                (
                    "Filtered noise layered under the voice",
                    Topology::Sequential,
                    [noise, none(), none(), none()],
                )
            }
            "slapback" => {
                let mut delay = default_storage(codes::SIMPLE_DELAY);
                delay.floats[0] = 0.09;
                delay.floats[1] = 0.15;
                (
                    "Short single-repeat echo (group chains only)",
                    Topology::Sequential,
                    [none(), none(), none(), delay],
                )
            }
            _ => return None,
        };
    Some(ChainPreset::from_storage(name, topology, &slots).with_description(description))
}

/// Every factory preset.
pub fn factory_presets() -> Vec<ChainPreset> {
    FACTORY_PRESET_NAMES.iter().filter_map(|name| build(name)).collect()
}

/// A factory preset by name.
pub fn get_factory_preset(name: &str) -> Option<ChainPreset> {
    build(name)
}

/// A factory preset by name, as an error if it does not exist.
pub fn factory_preset(name: &str) -> Result<ChainPreset, ConfigError> {
    build(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// Whether `name` is a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    FACTORY_PRESET_NAMES.contains(&name)
}
