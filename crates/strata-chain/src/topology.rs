//! How the four slots of a chain combine.
//!
//! `a -> b` runs in series, `{a | b}` runs in parallel from the same input
//! and sums, scaled by one over the number of non-muted members.
//!
//! | Topology | Routing |
//! |----------|---------|
//! | `Sequential` | `0 -> 1 -> 2 -> 3` |
//! | `Ser2` | `{0 | 1} -> {2 | 3}` |
//! | `Ser3` | `0 -> {1 | 2} -> 3` |
//! | `Par1` | `{0 | 1 | 2 | 3}` |
//! | `Par2` | `(0 -> 1)` summed with `(2 -> 3)`, halved when both sides are populated |
//! | `Par3` | `{0 | 1 | 2} -> 3` |

use core::fmt;
use core::str::FromStr;

/// Routing pattern over the four slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Topology {
    /// All four slots in series.
    #[default]
    Sequential,
    /// Two parallel pairs in series.
    Ser2,
    /// Slot 0, then slots 1 and 2 in parallel, then slot 3.
    Ser3,
    /// All four slots in parallel.
    Par1,
    /// Two serial pairs in parallel.
    Par2,
    /// Slots 0 to 2 in parallel, then slot 3.
    Par3,
}

impl Topology {
    /// Every topology, in selector order.
    pub const ALL: [Self; 6] = [
        Self::Sequential,
        Self::Ser2,
        Self::Ser3,
        Self::Par1,
        Self::Par2,
        Self::Par3,
    ];

    /// Lowercase name used in presets and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Ser2 => "ser2",
            Self::Ser3 => "ser3",
            Self::Par1 => "par1",
            Self::Par2 => "par2",
            Self::Par3 => "par3",
        }
    }

    /// Diagram of the routing, for display.
    pub const fn diagram(self) -> &'static str {
        match self {
            Self::Sequential => "0 -> 1 -> 2 -> 3",
            Self::Ser2 => "{0 | 1} -> {2 | 3}",
            Self::Ser3 => "0 -> {1 | 2} -> 3",
            Self::Par1 => "{0 | 1 | 2 | 3}",
            Self::Par2 => "{(0 -> 1) | (2 -> 3)}",
            Self::Par3 => "{0 | 1 | 2} -> 3",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown topology name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTopology;

impl fmt::Display for UnknownTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown topology (expected sequential, ser2, ser3, par1, par2 or par3)")
    }
}

impl core::error::Error for UnknownTopology {}

impl FromStr for Topology {
    type Err = UnknownTopology;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownTopology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for t in Topology::ALL {
            assert_eq!(t.as_str().parse::<Topology>(), Ok(t));
        }
        assert_eq!("PAR2".parse::<Topology>(), Ok(Topology::Par2));
        assert!("par4".parse::<Topology>().is_err());
    }

    #[test]
    fn default_is_sequential() {
        assert_eq!(Topology::default(), Topology::Sequential);
    }
}
