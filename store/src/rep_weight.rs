//! Representation table — `account (32 B) → amount (16 B)`.
//!
//! A persisted cache of each representative's delegated weight. The
//! canonical value is the sum over `accounts`; the ledger keeps this table
//! in lockstep under the same write transaction and rebuilds the in-memory
//! cache from `accounts` at startup.

use heed::{RoTxn, RwTxn};

use strand_types::{Account, Amount};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct RepWeightStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl RepWeightStore<'_> {
    pub fn put(
        &self,
        txn: &mut RwTxn,
        representative: &Account,
        weight: Amount,
    ) -> Result<(), StoreError> {
        if weight.is_zero() {
            self.store
                .representation_db
                .delete(txn, representative.as_bytes())?;
        } else {
            self.store
                .representation_db
                .put(txn, representative.as_bytes(), &weight.to_be_bytes())?;
        }
        Ok(())
    }

    /// A representative with no delegations weighs zero.
    pub fn get(&self, txn: &RoTxn, representative: &Account) -> Result<Amount, StoreError> {
        let Some(value) = self
            .store
            .representation_db
            .get(txn, representative.as_bytes())?
        else {
            return Ok(Amount::ZERO);
        };
        let bytes: [u8; 16] = value
            .try_into()
            .map_err(|_| StoreError::NotFound("representation width"))?;
        Ok(Amount::from_be_bytes(bytes))
    }

    pub fn iter(&self, txn: &RoTxn) -> Result<Vec<(Account, Amount)>, StoreError> {
        let mut out = Vec::new();
        for item in self.store.representation_db.iter(txn)? {
            let (key, value) = item?;
            let mut account = [0u8; 32];
            account.copy_from_slice(key);
            let bytes: [u8; 16] = value
                .try_into()
                .map_err(|_| StoreError::NotFound("representation width"))?;
            out.push((Account::new(account), Amount::from_be_bytes(bytes)));
        }
        Ok(out)
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.representation_db.len(txn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rep_weighs_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let rtxn = store.read_txn().unwrap();
        assert_eq!(
            store
                .rep_weight()
                .get(&rtxn, &Account::new([1u8; 32]))
                .unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn zero_weight_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let rep = Account::new([2u8; 32]);

        let mut wtxn = store.write_txn().unwrap();
        store
            .rep_weight()
            .put(&mut wtxn, &rep, Amount::new(500))
            .unwrap();
        store.rep_weight().put(&mut wtxn, &rep, Amount::ZERO).unwrap();
        wtxn.commit().unwrap();

        let rtxn = store.read_txn().unwrap();
        assert_eq!(store.rep_weight().count(&rtxn).unwrap(), 0);
    }
}
