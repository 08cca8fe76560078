//! Preset validation.
//!
//! Loading is forgiving: unknown types become "none" and out-of-range values
//! are clamped when processors read them. Validation is the strict
//! counterpart, used before saving or by the `presets validate` command, and
//! reports every problem it finds rather than stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use strata_config::{ChainPreset, StoredProcessor, validate_preset};
//!
//! let mut gain = StoredProcessor::named("amplifier");
//! gain.floats = vec![96.0];
//! let preset = ChainPreset::new("Too Loud").with_slot(gain);
//! assert!(validate_preset(&preset, false).is_err());
//! ```

use crate::{ChainPreset, StoredProcessor};
use strata_chain::SLOT_COUNT;
use strata_core::{MAX_FLOAT_PARAMS, MAX_INT_PARAMS};
use strata_registry::{control_description, is_group_only};
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Too many slot entries.
    #[error("preset has {0} slots, at most {max} allowed", max = SLOT_COUNT)]
    TooManySlots(usize),

    /// Unknown processor type.
    #[error("slot {slot}: unknown processor type '{name}'")]
    UnknownType {
        /// Slot index.
        slot: usize,
        /// Streaming name as written.
        name: String,
    },

    /// Group-only type on a voice chain.
    #[error("slot {slot}: '{name}' is only available on group chains")]
    GroupOnly {
        /// Slot index.
        slot: usize,
        /// Streaming name.
        name: String,
    },

    /// A parameter array is longer than the storage layout.
    #[error("slot {slot}: {field} has {len} entries, at most {max} allowed")]
    TooManyValues {
        /// Slot index.
        slot: usize,
        /// Array name.
        field: &'static str,
        /// Entries found.
        len: usize,
        /// Layout size.
        max: usize,
    },

    /// NaN or infinite value.
    #[error("slot {slot}: {field} is not finite")]
    NonFinite {
        /// Slot index.
        slot: usize,
        /// Field name, with index for arrays.
        field: String,
    },

    /// Float parameter value out of range.
    #[error("slot {slot}: parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Slot index.
        slot: usize,
        /// Parameter name.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Integer parameter value out of range.
    #[error("slot {slot}: parameter '{param}' value {value} out of range [{min}, {max}]")]
    IntOutOfRange {
        /// Slot index.
        slot: usize,
        /// Parameter name.
        param: String,
        /// The value that was out of range.
        value: i32,
        /// Minimum allowed value.
        min: i32,
        /// Maximum allowed value.
        max: i32,
    },

    /// Mix outside 0..1.
    #[error("slot {slot}: mix {value} out of range [0, 1]")]
    MixOutOfRange {
        /// Slot index.
        slot: usize,
        /// The stored mix.
        value: f32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a whole preset.
///
/// `group` selects whether group-only types are allowed. Returns the single
/// error directly, or [`ValidationError::Multiple`] when there are several.
pub fn validate_preset(preset: &ChainPreset, group: bool) -> ValidationResult<()> {
    let mut errors = Vec::new();
    if preset.slots.len() > SLOT_COUNT {
        errors.push(ValidationError::TooManySlots(preset.slots.len()));
    }
    for (slot, stored) in preset.slots.iter().enumerate() {
        errors.extend(validate_slot(slot, stored, group));
    }
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Every problem with one slot entry.
pub fn validate_slot(slot: usize, stored: &StoredProcessor, group: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(code) = stored.type_code() else {
        errors.push(ValidationError::UnknownType {
            slot,
            name: stored.type_name.clone(),
        });
        return errors;
    };
    if is_group_only(code) && !group {
        errors.push(ValidationError::GroupOnly {
            slot,
            name: stored.type_name.clone(),
        });
    }

    for (field, len, max) in [
        ("floats", stored.floats.len(), MAX_FLOAT_PARAMS),
        ("ints", stored.ints.len(), MAX_INT_PARAMS),
        ("deactivated", stored.deactivated.len(), MAX_FLOAT_PARAMS),
    ] {
        if len > max {
            errors.push(ValidationError::TooManyValues {
                slot,
                field,
                len,
                max,
            });
        }
    }

    let mut finite = true;
    for (i, v) in stored.floats.iter().enumerate() {
        if !v.is_finite() {
            finite = false;
            errors.push(ValidationError::NonFinite {
                slot,
                field: format!("floats[{i}]"),
            });
        }
    }
    if !stored.output_level_db.is_finite() {
        errors.push(ValidationError::NonFinite {
            slot,
            field: "output_level_db".to_string(),
        });
    }
    if let Some(mix) = stored.mix {
        if !mix.is_finite() {
            errors.push(ValidationError::NonFinite {
                slot,
                field: "mix".to_string(),
            });
        } else if !(0.0..=1.0).contains(&mix) {
            errors.push(ValidationError::MixOutOfRange { slot, value: mix });
        }
    }
    if !finite {
        return errors;
    }

    // ranges apply to the current layout, so check after any remap
    let storage = stored.restore(slot, &mut Vec::new());
    let description = control_description(code);
    for (i, desc) in description.floats.iter().enumerate() {
        let Some(desc) = desc else { continue };
        let value = storage.floats[i];
        if !desc.contains(value) {
            errors.push(ValidationError::OutOfRange {
                slot,
                param: desc.name.to_string(),
                value,
                min: desc.min,
                max: desc.max,
            });
        }
    }
    for (i, desc) in description.ints.iter().enumerate() {
        let Some(desc) = desc else { continue };
        let value = storage.ints[i];
        if !(desc.min..=desc.max).contains(&value) {
            errors.push(ValidationError::IntOutOfRange {
                slot,
                param: desc.name.to_string(),
                value,
                min: desc.min,
                max: desc.max,
            });
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_registry::{codes, default_storage};

    fn single(stored: StoredProcessor) -> ChainPreset {
        ChainPreset::new("Test").with_slot(stored)
    }

    #[test]
    fn defaults_validate() {
        for code in [
            codes::AMPLIFIER,
            codes::WAVESHAPER,
            codes::BIQUAD_FILTER,
            codes::TREMOLO,
            codes::SIMPLE_DELAY,
        ] {
            let preset = single(StoredProcessor::from_storage(&default_storage(code)));
            assert_eq!(validate_preset(&preset, true), Ok(()), "{code}");
        }
        assert_eq!(validate_preset(&ChainPreset::new("Empty"), false), Ok(()));
    }

    #[test]
    fn unknown_type() {
        let result = validate_preset(&single(StoredProcessor::named("wormhole")), true);
        assert_eq!(
            result,
            Err(ValidationError::UnknownType {
                slot: 0,
                name: "wormhole".to_string()
            })
        );
    }

    #[test]
    fn group_only_on_voice() {
        let preset = single(StoredProcessor::named("simple-delay"));
        assert!(validate_preset(&preset, true).is_ok());
        assert!(matches!(
            validate_preset(&preset, false),
            Err(ValidationError::GroupOnly { slot: 0, .. })
        ));
    }

    #[test]
    fn out_of_range_float() {
        let mut stored = StoredProcessor::named("biquad-filter");
        stored.floats = vec![5.0];
        match validate_preset(&single(stored), false) {
            Err(ValidationError::OutOfRange { param, value, min, .. }) => {
                assert_eq!(param, "Cutoff");
                assert_eq!(value, 5.0);
                assert_eq!(min, 20.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn out_of_range_int() {
        let mut stored = StoredProcessor::named("waveshaper");
        stored.ints = vec![7];
        assert!(matches!(
            validate_preset(&single(stored), false),
            Err(ValidationError::IntOutOfRange { value: 7, .. })
        ));
    }

    #[test]
    fn non_finite_values() {
        let mut stored = StoredProcessor::named("amplifier");
        stored.floats = vec![f32::NAN];
        stored.output_level_db = f32::INFINITY;
        match validate_preset(&single(stored), false) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mix_range() {
        let mut stored = StoredProcessor::named("amplifier");
        stored.mix = Some(1.5);
        assert_eq!(
            validate_preset(&single(stored), false),
            Err(ValidationError::MixOutOfRange { slot: 0, value: 1.5 })
        );
    }

    #[test]
    fn slot_and_array_counts() {
        let mut preset = ChainPreset::new("Long");
        for _ in 0..5 {
            preset = preset.with_slot(StoredProcessor::none());
        }
        assert_eq!(validate_preset(&preset, false), Err(ValidationError::TooManySlots(5)));

        let mut stored = StoredProcessor::named("amplifier");
        stored.ints = vec![0; MAX_INT_PARAMS + 1];
        assert!(matches!(
            validate_preset(&single(stored), false),
            Err(ValidationError::TooManyValues { field: "ints", .. })
        ));
    }

    #[test]
    fn old_layout_is_checked_after_remap() {
        // version 1 drive is linear: 100 is 40 dB, inside the current range
        let mut stored = StoredProcessor::named("waveshaper");
        stored.version = Some(1);
        stored.floats = vec![100.0, 0.0];
        assert_eq!(validate_preset(&single(stored), false), Ok(()));
    }

    #[test]
    fn multiple_display_joins() {
        let err = ValidationError::Multiple(vec![
            ValidationError::TooManySlots(6),
            ValidationError::MixOutOfRange { slot: 1, value: 2.0 },
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: preset has 6 slots, at most 4 allowed; slot 1: mix 2 out of range [0, 1]"
        );
    }
}
