//! Pending entries — unclaimed transfers awaiting a receive.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::amount::Amount;
use crate::epoch::Epoch;
use crate::error::TypeError;
use crate::hash::BlockHash;

/// Identifies a pending transfer: the destination account and the hash of
/// the send that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    pub account: Account,
    pub send_hash: BlockHash,
}

impl PendingKey {
    pub const SERIALIZED_SIZE: usize = 64;

    pub fn new(account: Account, send_hash: BlockHash) -> Self {
        Self { account, send_hash }
    }

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut out = [0u8; Self::SERIALIZED_SIZE];
        out[..32].copy_from_slice(self.account.as_bytes());
        out[32..].copy_from_slice(self.send_hash.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() < Self::SERIALIZED_SIZE {
            return Err(TypeError::Truncated(
                "pending key",
                Self::SERIALIZED_SIZE,
                bytes.len(),
            ));
        }
        let mut account = [0u8; 32];
        account.copy_from_slice(&bytes[..32]);
        let mut send_hash = [0u8; 32];
        send_hash.copy_from_slice(&bytes[32..64]);
        Ok(Self {
            account: Account::new(account),
            send_hash: BlockHash::new(send_hash),
        })
    }
}

/// The payload of a pending transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfo {
    pub source: Account,
    pub amount: Amount,
    /// Epoch of the send that created this entry. Legacy receives can only
    /// consume epoch-0 entries.
    pub epoch: Epoch,
}

impl PendingInfo {
    pub const SERIALIZED_SIZE: usize = 32 + 16 + 1;

    pub fn new(source: Account, amount: Amount, epoch: Epoch) -> Self {
        Self {
            source,
            amount,
            epoch,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut out = [0u8; Self::SERIALIZED_SIZE];
        out[..32].copy_from_slice(self.source.as_bytes());
        out[32..48].copy_from_slice(&self.amount.to_be_bytes());
        out[48] = self.epoch.as_u8();
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() < Self::SERIALIZED_SIZE {
            return Err(TypeError::Truncated(
                "pending info",
                Self::SERIALIZED_SIZE,
                bytes.len(),
            ));
        }
        let mut source = [0u8; 32];
        source.copy_from_slice(&bytes[..32]);
        let mut amount = [0u8; 16];
        amount.copy_from_slice(&bytes[32..48]);
        Ok(Self {
            source: Account::new(source),
            amount: Amount::from_be_bytes(amount),
            epoch: Epoch::from_u8(bytes[48])?,
        })
    }
}
