//! Version table — single key `0` holding the 4-byte schema version.

use heed::{RoTxn, RwTxn};

use crate::environment::LedgerStore;
use crate::error::StoreError;

const VERSION_KEY: [u8; 1] = [0];

pub struct MetaStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl MetaStore<'_> {
    /// The stored schema version; 0 for a fresh database.
    pub fn schema_version(&self, txn: &RoTxn) -> Result<u32, StoreError> {
        let Some(value) = self.store.meta_db.get(txn, &VERSION_KEY)? else {
            return Ok(0);
        };
        let bytes: [u8; 4] = value
            .try_into()
            .map_err(|_| StoreError::NotFound("schema version width"))?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn set_schema_version(&self, txn: &mut RwTxn, version: u32) -> Result<(), StoreError> {
        self.store
            .meta_db
            .put(txn, &VERSION_KEY, &version.to_be_bytes())?;
        Ok(())
    }
}
