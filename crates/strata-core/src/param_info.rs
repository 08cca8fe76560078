//! Parameter metadata for processor controls.
//!
//! Processors read their parameters from bound storage slots (see
//! [`LiveStorage`](crate::LiveStorage)); they never own the values. What a
//! processor *does* own is the description of each slot: name, range, unit,
//! scale and capability flags. Editors and preset validation read these
//! descriptions through a [`ProcessorControlDescription`](crate::ProcessorControlDescription).
//!
//! Float parameters are described by [`ParamDescriptor`], integer parameters
//! (mode switches, toggles) by [`IntParamDescriptor`].
//!
//! # Example
//!
//! ```rust
//! use strata_core::{ParamDescriptor, ParamFlags};
//!
//! let drive = ParamDescriptor::gain_db("Drive", "Drive", -12.0, 48.0, 0.0);
//! assert_eq!(drive.clamp(60.0), 48.0);
//!
//! let bias = ParamDescriptor::custom("Bias", "Bias", -1.0, 1.0, 0.0)
//!     .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::DEACTIVATABLE));
//! assert!(bias.flags.contains(ParamFlags::DEACTIVATABLE));
//! ```

use core::fmt;

/// Scaling curve for parameter normalization.
///
/// Determines how a parameter's plain value maps to normalized \[0.0, 1.0\] space.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`
/// - **Power(exp)**: `normalized = ((value - min) / (max - min)).powf(1.0 / exp)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Linear mapping (default). Equal resolution across the range.
    #[default]
    Linear,
    /// Logarithmic mapping. More resolution at low values. Requires `min > 0.0`.
    Logarithmic,
    /// Power curve mapping with configurable exponent.
    Power(f32),
}

/// Parameter capability flags.
///
/// # Example
///
/// ```rust
/// use strata_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::TEMPOSYNCABLE);
/// assert!(flags.contains(ParamFlags::TEMPOSYNCABLE));
/// assert!(!flags.contains(ParamFlags::DEACTIVATABLE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Parameter can be modulated/automated (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps.
    pub const STEPPED: Self = Self(1 << 1);
    /// Parameter can be switched off through the storage's deactivated bitset.
    pub const DEACTIVATABLE: Self = Self(1 << 2);
    /// Parameter is reinterpreted in beats when the slot is temposynced.
    pub const TEMPOSYNCABLE: Self = Self(1 << 3);
    /// Parameter follows the voice pitch when keytracking is enabled.
    pub const KEYTRACKABLE: Self = Self(1 << 4);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB).
    Decibels,
    /// Hertz (Hz).
    Hertz,
    /// Seconds (s).
    Seconds,
    /// Percentage; stored as 0.0-1.0, displayed as 0-100%.
    Percent,
    /// Bits (bit depth).
    Bits,
    /// Semitones.
    Semitones,
    /// No unit.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use strata_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Seconds => " s",
            ParamUnit::Percent => "%",
            ParamUnit::Bits => " bit",
            ParamUnit::Semitones => " st",
            ParamUnit::None => "",
        }
    }
}

/// Describes a single float parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display.
    pub name: &'static str,
    /// Short name for narrow displays, max 8 characters.
    pub short_name: &'static str,
    /// Unit type for formatting the value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value written into storage when the processor type is selected.
    pub default: f32,
    /// Recommended step increment for encoder-based control.
    pub step: f32,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Generic parameter with custom range and no unit.
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.01,
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Gain parameter in decibels.
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::custom(name, short_name, min, max, default)
            .with_unit(ParamUnit::Decibels)
            .with_step(0.5)
    }

    /// Amount parameter stored as 0.0-1.0 and displayed as a percentage.
    pub const fn percent(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self::custom(name, short_name, 0.0, 1.0, default).with_unit(ParamUnit::Percent)
    }

    /// Frequency parameter in Hz with logarithmic scaling.
    pub const fn frequency(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::custom(name, short_name, min, max, default)
            .with_unit(ParamUnit::Hertz)
            .with_scale(ParamScale::Logarithmic)
            .with_step(1.0)
    }

    /// Time parameter in seconds.
    pub const fn seconds(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::custom(name, short_name, min, max, default)
            .with_unit(ParamUnit::Seconds)
            .with_scale(ParamScale::Power(2.0))
            .with_step(0.001)
    }

    /// Sets the display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the normalization scale.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the encoder step.
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Sets the parameter flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamps a value to this parameter's valid range. NaN maps to the default.
    ///
    /// ```rust
    /// use strata_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Gain", "Gain", -60.0, 12.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -60.0);
    /// assert_eq!(desc.clamp(f32::NAN), 0.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Returns `true` if `value` is finite and inside `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Converts a plain value to normalized range (0.0 to 1.0).
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 || value <= 0.0 {
                    return 0.0;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
            ParamScale::Power(exp) => {
                let linear = (value - self.min) / range;
                libm::powf(linear.max(0.0), 1.0 / exp)
            }
        }
    }

    /// Converts a normalized value (0.0 to 1.0) to the parameter range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * libm::powf(self.max / self.min, normalized)
            }
            ParamScale::Power(exp) => {
                let curved = libm::powf(normalized.max(0.0), exp);
                self.min + curved * (self.max - self.min)
            }
        }
    }

    /// Formats `value` with this parameter's unit.
    ///
    /// ```rust
    /// use strata_core::ParamDescriptor;
    ///
    /// let mix = ParamDescriptor::percent("Mix", "Mix", 0.5);
    /// assert_eq!(format!("{}", mix.display(0.25)), "25.0%");
    /// ```
    pub fn display(&self, value: f32) -> DisplayValue {
        DisplayValue {
            value,
            unit: self.unit,
        }
    }
}

/// A parameter value paired with its unit, formatted through [`fmt::Display`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayValue {
    value: f32,
    unit: ParamUnit,
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            ParamUnit::Percent => write!(f, "{:.1}%", self.value * 100.0),
            ParamUnit::Hertz => write!(f, "{:.0} Hz", self.value),
            ParamUnit::Seconds if self.value < 1.0 => write!(f, "{:.1} ms", self.value * 1000.0),
            ParamUnit::Bits => write!(f, "{:.1} bit", self.value),
            unit => write!(f, "{:.2}{}", self.value, unit.suffix()),
        }
    }
}

/// Describes a single integer parameter (mode switch or toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntParamDescriptor {
    /// Parameter name for display.
    pub name: &'static str,
    /// Minimum allowed value.
    pub min: i32,
    /// Maximum allowed value.
    pub max: i32,
    /// Value written into storage when the processor type is selected.
    pub default: i32,
    /// Labels for each value from `min` to `max`; empty for plain integers.
    pub labels: &'static [&'static str],
}

impl IntParamDescriptor {
    /// A choice parameter ranging over `labels`.
    pub const fn choice(name: &'static str, labels: &'static [&'static str], default: i32) -> Self {
        Self {
            name,
            min: 0,
            max: labels.len() as i32 - 1,
            default,
            labels,
        }
    }

    /// An on/off toggle.
    pub const fn toggle(name: &'static str, default: bool) -> Self {
        Self::choice(name, &["Off", "On"], default as i32)
    }

    /// Clamps a value to this parameter's valid range.
    #[inline]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// Returns the label for `value`, if the parameter is labelled.
    pub fn label(&self, value: i32) -> Option<&'static str> {
        let offset = usize::try_from(value - self.min).ok()?;
        self.labels.get(offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_linear_roundtrip() {
        let desc = ParamDescriptor::custom("Bias", "Bias", -1.0, 1.0, 0.0);
        assert_eq!(desc.normalize(0.0), 0.5);
        assert_eq!(desc.denormalize(0.5), 0.0);
    }

    #[test]
    fn normalize_logarithmic_endpoints() {
        let desc = ParamDescriptor::frequency("Cutoff", "Cutoff", 20.0, 20000.0, 1000.0);
        assert!((desc.normalize(20.0)).abs() < 1e-6);
        assert!((desc.normalize(20000.0) - 1.0).abs() < 1e-6);
        let mid = desc.denormalize(0.5);
        assert!((mid - 632.45).abs() < 1.0, "geometric mean expected, got {mid}");
    }

    #[test]
    fn contains_rejects_nan() {
        let desc = ParamDescriptor::percent("Depth", "Depth", 0.5);
        assert!(desc.contains(0.3));
        assert!(!desc.contains(f32::NAN));
        assert!(!desc.contains(1.5));
    }

    #[test]
    fn display_formats_units() {
        let hz = ParamDescriptor::frequency("Freq", "Freq", 20.0, 2000.0, 220.0);
        assert_eq!(format!("{}", hz.display(440.0)), "440 Hz");
        let db = ParamDescriptor::gain_db("Gain", "Gain", -24.0, 24.0, 0.0);
        assert_eq!(format!("{}", db.display(-6.0)), "-6.00 dB");
        let t = ParamDescriptor::seconds("Time", "Time", 0.001, 2.0, 0.25);
        assert_eq!(format!("{}", t.display(0.25)), "250.0 ms");
    }

    #[test]
    fn int_choice_labels() {
        let shape = IntParamDescriptor::choice("Shape", &["Soft", "Hard", "Fold"], 0);
        assert_eq!(shape.max, 2);
        assert_eq!(shape.label(1), Some("Hard"));
        assert_eq!(shape.label(3), None);
        assert_eq!(shape.clamp(9), 2);
    }

    #[test]
    fn toggle_defaults() {
        let kt = IntParamDescriptor::toggle("Keytrack", true);
        assert_eq!(kt.default, 1);
        assert_eq!(kt.label(0), Some("Off"));
    }
}
