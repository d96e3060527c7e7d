use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lmdb error: {0}")]
    Lmdb(#[from] heed::Error),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] strand_types::TypeError),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("database schema version {found} is older than minimum supported {minimum}")]
    VersionTooOld { found: u32, minimum: u32 },

    #[error("database schema version {found} is newer than supported {current}")]
    VersionTooNew { found: u32, current: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
