//! Unchecked table — `dependency_hash (32 B) ‖ block_hash (32 B) → payload`.
//!
//! Persists blocks whose previous/source is missing so gaps survive a
//! restart. The composite key groups all blocks waiting on one dependency;
//! keying by block hash inside the group deduplicates re-submissions.

use std::ops::Bound;

use heed::{RoTxn, RwTxn};

use strand_types::{Block, BlockHash};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct UncheckedStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

fn composite_key(dependency: &BlockHash, block_hash: &BlockHash) -> [u8; 64] {
    let mut key = [0u8; 64];
    key[..32].copy_from_slice(dependency.as_bytes());
    key[32..].copy_from_slice(block_hash.as_bytes());
    key
}

impl UncheckedStore<'_> {
    pub fn put(
        &self,
        txn: &mut RwTxn,
        dependency: &BlockHash,
        block: &Block,
    ) -> Result<(), StoreError> {
        let key = composite_key(dependency, &block.hash());
        self.store.unchecked_db.put(txn, &key, &block.to_bytes())?;
        Ok(())
    }

    /// All blocks waiting for `dependency`.
    pub fn get_dependents(
        &self,
        txn: &RoTxn,
        dependency: &BlockHash,
    ) -> Result<Vec<Block>, StoreError> {
        let lower = composite_key(dependency, &BlockHash::ZERO);
        let upper = composite_key(dependency, &BlockHash::new([0xFF; 32]));
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Included(upper.as_slice()),
        );
        let mut out = Vec::new();
        for item in self.store.unchecked_db.range(txn, &bounds)? {
            let (_, value) = item?;
            out.push(Block::from_bytes(value)?);
        }
        Ok(out)
    }

    pub fn del(
        &self,
        txn: &mut RwTxn,
        dependency: &BlockHash,
        block_hash: &BlockHash,
    ) -> Result<(), StoreError> {
        self.store
            .unchecked_db
            .delete(txn, &composite_key(dependency, block_hash))?;
        Ok(())
    }

    /// Remove every entry under `dependency`, returning how many were
    /// deleted.
    pub fn del_dependents(
        &self,
        txn: &mut RwTxn,
        dependency: &BlockHash,
    ) -> Result<usize, StoreError> {
        let hashes: Vec<BlockHash> = self
            .get_dependents(txn, dependency)?
            .iter()
            .map(|block| block.hash())
            .collect();
        for hash in &hashes {
            self.del(txn, dependency, hash)?;
        }
        Ok(hashes.len())
    }

    /// Full scan: `(dependency, block)` pairs, used by the TTL sweep.
    pub fn iter(&self, txn: &RoTxn) -> Result<Vec<(BlockHash, Block)>, StoreError> {
        let mut out = Vec::new();
        for item in self.store.unchecked_db.iter(txn)? {
            let (key, value) = item?;
            let mut dependency = [0u8; 32];
            dependency.copy_from_slice(&key[..32]);
            out.push((BlockHash::new(dependency), Block::from_bytes(value)?));
        }
        Ok(out)
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.unchecked_db.len(txn)?)
    }

    pub fn clear(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.store.unchecked_db.clear(txn)?;
        Ok(())
    }
}
