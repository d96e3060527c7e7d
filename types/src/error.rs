use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("unknown epoch byte: {0}")]
    UnknownEpoch(u8),

    #[error("unknown block type byte: {0}")]
    UnknownBlockType(u8),

    #[error("truncated {0} encoding: expected {1} bytes, got {2}")]
    Truncated(&'static str, usize, usize),
}
