use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum ConsensusError {
    #[error("election capacity reached: maximum {0} active elections")]
    ElectionCapacityReached(usize),

    #[error("election not found for root {0}")]
    ElectionNotFound(String),

    #[error("vote failed signature validation")]
    InvalidVote,
}
