//! Frontiers table — `head_hash (32 B) → account (32 B)`.
//!
//! Populated only while an account's head is a legacy block; legacy
//! payloads don't name their account, so the head is the lookup key. State
//! heads address the account directly and have no entry here.

use heed::{RoTxn, RwTxn};

use strand_types::{Account, BlockHash};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct FrontierStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl FrontierStore<'_> {
    pub fn put(
        &self,
        txn: &mut RwTxn,
        head: &BlockHash,
        account: &Account,
    ) -> Result<(), StoreError> {
        self.store
            .frontiers_db
            .put(txn, head.as_bytes(), account.as_bytes())?;
        Ok(())
    }

    pub fn get(&self, txn: &RoTxn, head: &BlockHash) -> Result<Option<Account>, StoreError> {
        let Some(value) = self.store.frontiers_db.get(txn, head.as_bytes())? else {
            return Ok(None);
        };
        let mut account = [0u8; 32];
        account.copy_from_slice(value);
        Ok(Some(Account::new(account)))
    }

    pub fn del(&self, txn: &mut RwTxn, head: &BlockHash) -> Result<(), StoreError> {
        self.store.frontiers_db.delete(txn, head.as_bytes())?;
        Ok(())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.frontiers_db.len(txn)?)
    }
}
