use thiserror::Error;

use strand_types::BlockHash;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Store(#[from] strand_store::StoreError),

    #[error("block not found: {0}")]
    BlockNotFound(BlockHash),

    #[error("refusing to roll back cemented block {0}")]
    RollbackCemented(BlockHash),

    #[error("ledger invariant violated: {0}")]
    Invariant(&'static str),
}
