//! Confirmation height table — `account (32 B) → height (8 B) ‖ frontier (32 B)`.

use heed::{RoTxn, RwTxn};

use strand_types::{Account, ConfirmationHeightInfo};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct ConfirmationHeightStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl ConfirmationHeightStore<'_> {
    pub fn put(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError> {
        self.store
            .confirmation_height_db
            .put(txn, account.as_bytes(), &info.to_bytes())?;
        Ok(())
    }

    /// An account with no record has cemented nothing.
    pub fn get(
        &self,
        txn: &RoTxn,
        account: &Account,
    ) -> Result<ConfirmationHeightInfo, StoreError> {
        let Some(value) = self
            .store
            .confirmation_height_db
            .get(txn, account.as_bytes())?
        else {
            return Ok(ConfirmationHeightInfo::default());
        };
        Ok(ConfirmationHeightInfo::from_bytes(value)?)
    }

    pub fn del(&self, txn: &mut RwTxn, account: &Account) -> Result<(), StoreError> {
        self.store
            .confirmation_height_db
            .delete(txn, account.as_bytes())?;
        Ok(())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.confirmation_height_db.len(txn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_types::BlockHash;

    #[test]
    fn missing_account_is_unconfirmed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let rtxn = store.read_txn().unwrap();
        let info = store
            .confirmation_height()
            .get(&rtxn, &Account::new([1u8; 32]))
            .unwrap();
        assert_eq!(info.height, 0);
    }

    #[test]
    fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let account = Account::new([1u8; 32]);
        let info = ConfirmationHeightInfo::new(5, BlockHash::new([2u8; 32]));

        let mut wtxn = store.write_txn().unwrap();
        store
            .confirmation_height()
            .put(&mut wtxn, &account, &info)
            .unwrap();
        wtxn.commit().unwrap();

        let rtxn = store.read_txn().unwrap();
        assert_eq!(
            store.confirmation_height().get(&rtxn, &account).unwrap(),
            info
        );
    }
}
