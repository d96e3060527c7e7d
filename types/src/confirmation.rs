//! Confirmation height — the cemented prefix of an account's chain.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::BlockHash;

/// The largest confirmed prefix of an account's chain. Monotone
/// non-decreasing; a block at or below this height is cemented and can
/// never be rolled back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationHeightInfo {
    pub height: u64,
    pub frontier: BlockHash,
}

impl ConfirmationHeightInfo {
    pub const SERIALIZED_SIZE: usize = 8 + 32;

    pub fn new(height: u64, frontier: BlockHash) -> Self {
        Self { height, frontier }
    }

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut out = [0u8; Self::SERIALIZED_SIZE];
        out[..8].copy_from_slice(&self.height.to_be_bytes());
        out[8..].copy_from_slice(self.frontier.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() < Self::SERIALIZED_SIZE {
            return Err(TypeError::Truncated(
                "confirmation height",
                Self::SERIALIZED_SIZE,
                bytes.len(),
            ));
        }
        let mut height = [0u8; 8];
        height.copy_from_slice(&bytes[..8]);
        let mut frontier = [0u8; 32];
        frontier.copy_from_slice(&bytes[8..40]);
        Ok(Self {
            height: u64::from_be_bytes(height),
            frontier: BlockHash::new(frontier),
        })
    }
}
