//! PoW generation — parallel nonce search with rayon.

use rayon::prelude::*;
use thiserror::Error;

use strand_types::Root;

use crate::validator::validate_work;

/// Nonces tried per parallel batch before checking for exhaustion.
const BATCH_SIZE: u64 = 1 << 20;

/// A valid work nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkNonce(pub u64);

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("nonce space exhausted without meeting threshold {0}")]
    Exhausted(u64),
}

/// Searches the nonce space in parallel batches until a nonce clears the
/// threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkGenerator;

impl WorkGenerator {
    pub fn generate(&self, root: &Root, threshold: u64) -> Result<WorkNonce, WorkError> {
        let mut start = 0u64;
        loop {
            let end = start.saturating_add(BATCH_SIZE);
            let found = (start..end)
                .into_par_iter()
                .find_any(|nonce| validate_work(root, *nonce, threshold));
            if let Some(nonce) = found {
                return Ok(WorkNonce(nonce));
            }
            if end == u64::MAX {
                return Err(WorkError::Exhausted(threshold));
            }
            start = end;
        }
    }
}
