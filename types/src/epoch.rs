//! Per-account upgrade generations.
//!
//! An epoch block advances its account to the next generation without moving
//! value. Pending entries carry the epoch of the send that created them so a
//! receive can inherit the upgrade.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Monotone per-account upgrade marker.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Epoch {
    #[default]
    Epoch0,
    Epoch1,
    Epoch2,
}

impl Epoch {
    pub const MAX: Self = Self::Epoch2;

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Epoch0 => 0,
            Self::Epoch1 => 1,
            Self::Epoch2 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, TypeError> {
        match value {
            0 => Ok(Self::Epoch0),
            1 => Ok(Self::Epoch1),
            2 => Ok(Self::Epoch2),
            other => Err(TypeError::UnknownEpoch(other)),
        }
    }

    /// The next generation, if any. Epoch upgrades advance exactly one step.
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::Epoch0 => Some(Self::Epoch1),
            Self::Epoch1 => Some(Self::Epoch2),
            Self::Epoch2 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_monotone() {
        assert!(Epoch::Epoch0 < Epoch::Epoch1);
        assert!(Epoch::Epoch1 < Epoch::Epoch2);
    }

    #[test]
    fn byte_roundtrip() {
        for e in [Epoch::Epoch0, Epoch::Epoch1, Epoch::Epoch2] {
            assert_eq!(Epoch::from_u8(e.as_u8()).unwrap(), e);
        }
        assert!(Epoch::from_u8(9).is_err());
    }

    #[test]
    fn successor_chain_terminates() {
        assert_eq!(Epoch::Epoch0.successor(), Some(Epoch::Epoch1));
        assert_eq!(Epoch::Epoch2.successor(), None);
    }
}
