//! Pruned table — `hash (32 B) → ()`. Records hashes whose full blocks
//! were discarded after cementation; a pruned hash still counts as "seen".

use heed::{RoTxn, RwTxn};

use strand_types::BlockHash;

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct PrunedStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl PrunedStore<'_> {
    pub fn put(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.store.pruned_db.put(txn, hash.as_bytes(), &[])?;
        Ok(())
    }

    pub fn exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.store.pruned_db.get(txn, hash.as_bytes())?.is_some())
    }

    pub fn del(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.store.pruned_db.delete(txn, hash.as_bytes())?;
        Ok(())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.pruned_db.len(txn)?)
    }
}
