//! Accounts table — `account (32 B) → AccountInfo`.

use heed::{RoTxn, RwTxn};

use strand_types::{Account, AccountInfo};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct AccountStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl AccountStore<'_> {
    pub fn put(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &AccountInfo,
    ) -> Result<(), StoreError> {
        self.store
            .accounts_db
            .put(txn, account.as_bytes(), &info.to_bytes())?;
        Ok(())
    }

    pub fn get(&self, txn: &RoTxn, account: &Account) -> Result<Option<AccountInfo>, StoreError> {
        let Some(value) = self.store.accounts_db.get(txn, account.as_bytes())? else {
            return Ok(None);
        };
        Ok(Some(AccountInfo::from_bytes(value)?))
    }

    pub fn exists(&self, txn: &RoTxn, account: &Account) -> Result<bool, StoreError> {
        Ok(self.store.accounts_db.get(txn, account.as_bytes())?.is_some())
    }

    pub fn del(&self, txn: &mut RwTxn, account: &Account) -> Result<(), StoreError> {
        self.store.accounts_db.delete(txn, account.as_bytes())?;
        Ok(())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.accounts_db.len(txn)?)
    }

    /// Full scan — used to rebuild the representative weight cache at
    /// startup and by diagnostics.
    pub fn iter(&self, txn: &RoTxn) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
        let mut out = Vec::new();
        for item in self.store.accounts_db.iter(txn)? {
            let (key, value) = item?;
            let mut account = [0u8; 32];
            account.copy_from_slice(key);
            out.push((Account::new(account), AccountInfo::from_bytes(value)?));
        }
        Ok(out)
    }
}
