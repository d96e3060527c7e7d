//! Block-lattice ledger state machine.
//!
//! Each account has its own chain; consensus is only needed where two blocks
//! contend for the same chain slot. This crate validates and applies blocks
//! against persistent state under a caller-held write transaction, maintains
//! pending transfers and aggregated voting weights, and supports exact
//! rollback of uncemented blocks.

pub mod constants;
pub mod error;
pub mod genesis;
pub mod ledger;
pub mod process;
pub mod rep_weights;
pub mod rollback;

pub use constants::LedgerConstants;
pub use error::LedgerError;
pub use genesis::create_genesis_block;
pub use ledger::Ledger;
pub use process::{ProcessCode, ProcessResult};
pub use rep_weights::RepWeights;

#[cfg(test)]
mod ledger_tests;
