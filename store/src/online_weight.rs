//! Online weight table — `timestamp (8 B) → weight (16 B)`.
//!
//! A bounded time series of observed online voting weight; the consensus
//! quorum uses its median. Big-endian timestamps keep the series ordered.

use heed::{RoTxn, RwTxn};

use strand_types::Amount;

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct OnlineWeightStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl OnlineWeightStore<'_> {
    pub fn put(&self, txn: &mut RwTxn, timestamp: u64, weight: Amount) -> Result<(), StoreError> {
        self.store
            .online_weight_db
            .put(txn, &timestamp.to_be_bytes(), &weight.to_be_bytes())?;
        Ok(())
    }

    /// The full series in timestamp order.
    pub fn iter(&self, txn: &RoTxn) -> Result<Vec<(u64, Amount)>, StoreError> {
        let mut out = Vec::new();
        for item in self.store.online_weight_db.iter(txn)? {
            let (key, value) = item?;
            let ts: [u8; 8] = key
                .try_into()
                .map_err(|_| StoreError::NotFound("online weight key width"))?;
            let weight: [u8; 16] = value
                .try_into()
                .map_err(|_| StoreError::NotFound("online weight value width"))?;
            out.push((u64::from_be_bytes(ts), Amount::from_be_bytes(weight)));
        }
        Ok(out)
    }

    /// Drop oldest samples until at most `max_samples` remain.
    pub fn trim(&self, txn: &mut RwTxn, max_samples: usize) -> Result<(), StoreError> {
        let series = self.iter(txn)?;
        if series.len() <= max_samples {
            return Ok(());
        }
        let excess = series.len() - max_samples;
        for (timestamp, _) in series.into_iter().take(excess) {
            self.store
                .online_weight_db
                .delete(txn, &timestamp.to_be_bytes())?;
        }
        Ok(())
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.online_weight_db.len(txn)?)
    }
}
