//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use std::path::Path;
use strata_config::{ChainPreset, FACTORY_PRESET_NAMES, get_factory_preset};

/// Load a preset by factory name or by path to a TOML file.
pub fn load_preset(name: &str) -> anyhow::Result<ChainPreset> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }

    let path = Path::new(name);
    if path.exists() {
        return ChainPreset::load(path)
            .with_context(|| format!("failed to load preset '{}'", path.display()));
    }

    anyhow::bail!(
        "Preset '{}' not found. Factory presets: {}",
        name,
        FACTORY_PRESET_NAMES.join(", ")
    )
}

/// RMS of a sample buffer.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Absolute peak of a sample buffer.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

/// Level in dB, floored at -120.
pub fn level_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        strata_core::linear_to_db(linear).max(-120.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_names_resolve() {
        assert_eq!(load_preset("crunch").unwrap().name, "crunch");
        assert!(load_preset("definitely-not-a-preset").is_err());
    }

    #[test]
    fn stats() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[1.0, -1.0]) - 1.0).abs() < 1e-6);
        assert_eq!(peak(&[0.2, -0.7, 0.5]), 0.7);
        assert_eq!(level_db(0.0), -120.0);
        assert!(level_db(1.0).abs() < 1e-4);
    }
}
