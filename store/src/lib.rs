//! LMDB storage backend for the strand ledger.
//!
//! One environment, one named database per logical table. Every table store
//! method takes an explicit `RoTxn`/`RwTxn` so the ledger can hold a single
//! write transaction across a whole block application — effects within it
//! are atomic and isolated, and observers only see committed state.
//!
//! All keys and persisted integers are big-endian so lexicographic ordering
//! matches numeric ordering.

pub mod account;
pub mod block;
pub mod confirmation_height;
pub mod environment;
pub mod error;
pub mod final_vote;
pub mod frontier;
pub mod maintenance;
pub mod meta;
pub mod migration;
pub mod online_weight;
pub mod peer;
pub mod pending;
pub mod pruned;
pub mod rep_weight;
pub mod unchecked;

pub use environment::LedgerStore;
pub use error::StoreError;
pub use maintenance::{snapshot, vacuum};
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION, MINIMUM_SCHEMA_VERSION};

/// Re-exported transaction handles; callers thread these through every
/// table operation.
pub use heed::{RoTxn, RwTxn};
