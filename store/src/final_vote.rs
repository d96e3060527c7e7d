//! Final vote table — `qualified_root (64 B) → winner_hash (32 B)`.
//!
//! Once we cast a final vote for a slot we must never vote for a different
//! block there, across restarts included.

use heed::{RoTxn, RwTxn};

use strand_types::{BlockHash, QualifiedRoot};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct FinalVoteStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl FinalVoteStore<'_> {
    /// Record the winner for a slot. Returns `false` if a different winner
    /// is already recorded (the caller must not override it).
    pub fn put(
        &self,
        txn: &mut RwTxn,
        root: &QualifiedRoot,
        winner: &BlockHash,
    ) -> Result<bool, StoreError> {
        if let Some(existing) = self.get(txn, root)? {
            return Ok(existing == *winner);
        }
        self.store
            .final_vote_db
            .put(txn, &root.to_bytes(), winner.as_bytes())?;
        Ok(true)
    }

    pub fn get(&self, txn: &RoTxn, root: &QualifiedRoot) -> Result<Option<BlockHash>, StoreError> {
        let Some(value) = self.store.final_vote_db.get(txn, &root.to_bytes())? else {
            return Ok(None);
        };
        let mut hash = [0u8; 32];
        hash.copy_from_slice(value);
        Ok(Some(BlockHash::new(hash)))
    }

    pub fn del(&self, txn: &mut RwTxn, root: &QualifiedRoot) -> Result<(), StoreError> {
        self.store.final_vote_db.delete(txn, &root.to_bytes())?;
        Ok(())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.final_vote_db.len(txn)?)
    }

    pub fn clear(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.store.final_vote_db.clear(txn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_types::Root;

    #[test]
    fn existing_winner_is_not_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let root = QualifiedRoot::new(Root::new([1u8; 32]), BlockHash::new([2u8; 32]));
        let winner_a = BlockHash::new([3u8; 32]);
        let winner_b = BlockHash::new([4u8; 32]);

        let mut wtxn = store.write_txn().unwrap();
        assert!(store.final_vote().put(&mut wtxn, &root, &winner_a).unwrap());
        assert!(store.final_vote().put(&mut wtxn, &root, &winner_a).unwrap());
        assert!(!store.final_vote().put(&mut wtxn, &root, &winner_b).unwrap());
        wtxn.commit().unwrap();

        let rtxn = store.read_txn().unwrap();
        assert_eq!(
            store.final_vote().get(&rtxn, &root).unwrap(),
            Some(winner_a)
        );
    }
}
