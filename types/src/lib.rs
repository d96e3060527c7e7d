//! Fundamental types for the strand ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: hashes, accounts, amounts, epochs, timestamps, the five block
//! variants, and the persisted record types (account info, pending entries,
//! confirmation heights, block sideband).

pub mod account;
pub mod account_info;
pub mod amount;
pub mod block;
pub mod confirmation;
pub mod epoch;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod pending;
pub mod sideband;
pub mod time;

pub use account::Account;
pub use account_info::AccountInfo;
pub use amount::Amount;
pub use block::{
    Block, BlockType, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock,
};
pub use confirmation::ConfirmationHeightInfo;
pub use epoch::Epoch;
pub use error::TypeError;
pub use hash::{BlockHash, QualifiedRoot, Root};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use pending::{PendingInfo, PendingKey};
pub use sideband::{BlockDetails, BlockSideband};
pub use time::Timestamp;
