//! Per-account ledger record.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::amount::Amount;
use crate::epoch::Epoch;
use crate::error::TypeError;
use crate::hash::BlockHash;
use crate::time::Timestamp;

/// The authoritative per-account state. `head` is always the chain tip and
/// `block_count` equals the head's height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub head: BlockHash,
    pub representative: Account,
    pub open_block: BlockHash,
    pub balance: Amount,
    pub modified: Timestamp,
    pub block_count: u64,
    pub epoch: Epoch,
}

impl AccountInfo {
    pub const SERIALIZED_SIZE: usize = 32 + 32 + 32 + 16 + 8 + 8 + 1;

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut out = [0u8; Self::SERIALIZED_SIZE];
        out[0..32].copy_from_slice(self.head.as_bytes());
        out[32..64].copy_from_slice(self.representative.as_bytes());
        out[64..96].copy_from_slice(self.open_block.as_bytes());
        out[96..112].copy_from_slice(&self.balance.to_be_bytes());
        out[112..120].copy_from_slice(&self.modified.as_secs().to_be_bytes());
        out[120..128].copy_from_slice(&self.block_count.to_be_bytes());
        out[128] = self.epoch.as_u8();
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() < Self::SERIALIZED_SIZE {
            return Err(TypeError::Truncated(
                "account info",
                Self::SERIALIZED_SIZE,
                bytes.len(),
            ));
        }
        let mut head = [0u8; 32];
        head.copy_from_slice(&bytes[0..32]);
        let mut representative = [0u8; 32];
        representative.copy_from_slice(&bytes[32..64]);
        let mut open_block = [0u8; 32];
        open_block.copy_from_slice(&bytes[64..96]);
        let mut balance = [0u8; 16];
        balance.copy_from_slice(&bytes[96..112]);
        let mut modified = [0u8; 8];
        modified.copy_from_slice(&bytes[112..120]);
        let mut block_count = [0u8; 8];
        block_count.copy_from_slice(&bytes[120..128]);
        Ok(Self {
            head: BlockHash::new(head),
            representative: Account::new(representative),
            open_block: BlockHash::new(open_block),
            balance: Amount::from_be_bytes(balance),
            modified: Timestamp::new(u64::from_be_bytes(modified)),
            block_count: u64::from_be_bytes(block_count),
            epoch: Epoch::from_u8(bytes[128])?,
        })
    }
}
