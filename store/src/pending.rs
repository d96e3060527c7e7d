//! Pending table — `account (32 B) ‖ send_hash (32 B) → PendingInfo`.
//!
//! The composite key sorts all of an account's unclaimed transfers
//! contiguously, so a prefix range scan answers "anything receivable?".

use std::ops::Bound;

use heed::{RoTxn, RwTxn};

use strand_types::{Account, PendingInfo, PendingKey};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct PendingStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl PendingStore<'_> {
    pub fn put(
        &self,
        txn: &mut RwTxn,
        key: &PendingKey,
        info: &PendingInfo,
    ) -> Result<(), StoreError> {
        self.store
            .pending_db
            .put(txn, &key.to_bytes(), &info.to_bytes())?;
        Ok(())
    }

    pub fn get(&self, txn: &RoTxn, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
        let Some(value) = self.store.pending_db.get(txn, &key.to_bytes())? else {
            return Ok(None);
        };
        Ok(Some(PendingInfo::from_bytes(value)?))
    }

    pub fn exists(&self, txn: &RoTxn, key: &PendingKey) -> Result<bool, StoreError> {
        Ok(self.store.pending_db.get(txn, &key.to_bytes())?.is_some())
    }

    pub fn del(&self, txn: &mut RwTxn, key: &PendingKey) -> Result<(), StoreError> {
        self.store.pending_db.delete(txn, &key.to_bytes())?;
        Ok(())
    }

    /// All unclaimed transfers destined for `account`.
    pub fn iter_account(
        &self,
        txn: &RoTxn,
        account: &Account,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
        let lower = {
            let mut k = [0u8; 64];
            k[..32].copy_from_slice(account.as_bytes());
            k
        };
        let upper = {
            let mut k = [0xFFu8; 64];
            k[..32].copy_from_slice(account.as_bytes());
            k
        };
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Included(upper.as_slice()),
        );
        let mut out = Vec::new();
        for item in self.store.pending_db.range(txn, &bounds)? {
            let (key, value) = item?;
            let key: [u8; 64] = key
                .try_into()
                .map_err(|_| StoreError::NotFound("pending key width"))?;
            out.push((
                PendingKey::from_bytes(&key)?,
                PendingInfo::from_bytes(value)?,
            ));
        }
        Ok(out)
    }

    /// Whether any pending entry exists for `account`.
    pub fn any_for_account(&self, txn: &RoTxn, account: &Account) -> Result<bool, StoreError> {
        Ok(!self.iter_account(txn, account)?.is_empty())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.pending_db.len(txn)?)
    }
}
