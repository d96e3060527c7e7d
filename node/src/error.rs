use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("storage error: {0}")]
    Store(#[from] strand_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] strand_ledger::LedgerError),

    #[error("consensus error: {0}")]
    Consensus(#[from] strand_consensus::ConsensusError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
