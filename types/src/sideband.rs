//! Block sideband — derived metadata stored alongside every admitted block.
//!
//! The sideband is reconstructable from ledger history; it is persisted to
//! avoid repeated chain walks when answering height, balance and successor
//! queries. When a new block is admitted the prior head's sideband is
//! rewritten with the new `successor` under the same transaction.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::amount::Amount;
use crate::epoch::Epoch;
use crate::error::TypeError;
use crate::hash::BlockHash;
use crate::time::Timestamp;

const FLAG_IS_SEND: u8 = 1 << 0;
const FLAG_IS_RECEIVE: u8 = 1 << 1;
const FLAG_IS_EPOCH: u8 = 1 << 2;

/// Classification of the block as applied, plus its epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDetails {
    pub epoch: Epoch,
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

impl BlockDetails {
    pub fn new(epoch: Epoch, is_send: bool, is_receive: bool, is_epoch: bool) -> Self {
        Self {
            epoch,
            is_send,
            is_receive,
            is_epoch,
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.is_send {
            flags |= FLAG_IS_SEND;
        }
        if self.is_receive {
            flags |= FLAG_IS_RECEIVE;
        }
        if self.is_epoch {
            flags |= FLAG_IS_EPOCH;
        }
        flags
    }
}

/// Per-block derived metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSideband {
    /// The next block on this account's chain; zero while this is the head.
    pub successor: BlockHash,
    /// The account owning the chain (legacy payloads don't carry it).
    pub account: Account,
    /// Account balance after this block.
    pub balance: Amount,
    /// 1-based height on the account chain.
    pub height: u64,
    /// Local admission time.
    pub timestamp: Timestamp,
    pub details: BlockDetails,
    /// Epoch of the consumed pending entry, for receive-style blocks.
    pub source_epoch: Epoch,
}

impl BlockSideband {
    pub const SERIALIZED_SIZE: usize = 32 + 32 + 16 + 8 + 8 + 1 + 1 + 1;

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut out = [0u8; Self::SERIALIZED_SIZE];
        out[0..32].copy_from_slice(self.successor.as_bytes());
        out[32..64].copy_from_slice(self.account.as_bytes());
        out[64..80].copy_from_slice(&self.balance.to_be_bytes());
        out[80..88].copy_from_slice(&self.height.to_be_bytes());
        out[88..96].copy_from_slice(&self.timestamp.as_secs().to_be_bytes());
        out[96] = self.details.epoch.as_u8();
        out[97] = self.details.flags();
        out[98] = self.source_epoch.as_u8();
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() < Self::SERIALIZED_SIZE {
            return Err(TypeError::Truncated(
                "sideband",
                Self::SERIALIZED_SIZE,
                bytes.len(),
            ));
        }
        let mut successor = [0u8; 32];
        successor.copy_from_slice(&bytes[0..32]);
        let mut account = [0u8; 32];
        account.copy_from_slice(&bytes[32..64]);
        let mut balance = [0u8; 16];
        balance.copy_from_slice(&bytes[64..80]);
        let mut height = [0u8; 8];
        height.copy_from_slice(&bytes[80..88]);
        let mut timestamp = [0u8; 8];
        timestamp.copy_from_slice(&bytes[88..96]);
        let flags = bytes[97];
        Ok(Self {
            successor: BlockHash::new(successor),
            account: Account::new(account),
            balance: Amount::from_be_bytes(balance),
            height: u64::from_be_bytes(height),
            timestamp: Timestamp::new(u64::from_be_bytes(timestamp)),
            details: BlockDetails {
                epoch: Epoch::from_u8(bytes[96])?,
                is_send: flags & FLAG_IS_SEND != 0,
                is_receive: flags & FLAG_IS_RECEIVE != 0,
                is_epoch: flags & FLAG_IS_EPOCH != 0,
            },
            source_epoch: Epoch::from_u8(bytes[98])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockSideband {
        BlockSideband {
            successor: BlockHash::new([1u8; 32]),
            account: Account::new([2u8; 32]),
            balance: Amount::new(12345),
            height: 42,
            timestamp: Timestamp::new(1_700_000_000),
            details: BlockDetails::new(Epoch::Epoch1, true, false, false),
            source_epoch: Epoch::Epoch0,
        }
    }

    #[test]
    fn roundtrip() {
        let sideband = sample();
        let bytes = sideband.to_bytes();
        assert_eq!(BlockSideband::from_bytes(&bytes).unwrap(), sideband);
    }

    #[test]
    fn flags_independent() {
        let mut sideband = sample();
        sideband.details = BlockDetails::new(Epoch::Epoch2, false, true, true);
        let decoded = BlockSideband::from_bytes(&sideband.to_bytes()).unwrap();
        assert!(!decoded.details.is_send);
        assert!(decoded.details.is_receive);
        assert!(decoded.details.is_epoch);
    }

    #[test]
    fn truncated_rejected() {
        let bytes = sample().to_bytes();
        assert!(BlockSideband::from_bytes(&bytes[..50]).is_err());
    }
}
