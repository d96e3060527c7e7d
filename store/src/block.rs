//! Blocks table — `hash (32 B) → block_type ‖ payload ‖ sideband`.

use heed::{RoTxn, RwTxn};

use strand_types::{Block, BlockHash, BlockSideband, BlockType};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct BlockStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

impl BlockStore<'_> {
    /// Store a block with its sideband. Overwrites the existing record for
    /// sideband rewrites (e.g. setting `successor` on the prior head).
    pub fn put(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        block: &Block,
        sideband: &BlockSideband,
    ) -> Result<(), StoreError> {
        let mut value = block.to_bytes();
        value.extend_from_slice(&sideband.to_bytes());
        self.store
            .blocks_db
            .put(txn, hash.as_bytes(), &value)?;
        Ok(())
    }

    pub fn get(
        &self,
        txn: &RoTxn,
        hash: &BlockHash,
    ) -> Result<Option<(Block, BlockSideband)>, StoreError> {
        let Some(value) = self.store.blocks_db.get(txn, hash.as_bytes())? else {
            return Ok(None);
        };
        let block = Block::from_bytes(value)?;
        let sideband_offset = 1 + block.block_type().payload_size();
        let sideband = BlockSideband::from_bytes(&value[sideband_offset..])?;
        Ok(Some((block, sideband)))
    }

    pub fn exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.store.blocks_db.get(txn, hash.as_bytes())?.is_some())
    }

    pub fn del(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.store.blocks_db.delete(txn, hash.as_bytes())?;
        Ok(())
    }

    /// The successor of `hash` on its account chain, if one has been
    /// admitted on top of it.
    pub fn successor(
        &self,
        txn: &RoTxn,
        hash: &BlockHash,
    ) -> Result<Option<BlockHash>, StoreError> {
        Ok(self
            .get(txn, hash)?
            .map(|(_, sideband)| sideband.successor)
            .filter(|successor| !successor.is_zero()))
    }

    /// Rewrite only the sideband's successor field.
    pub fn set_successor(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        successor: BlockHash,
    ) -> Result<(), StoreError> {
        let (block, mut sideband) = self
            .get(txn, hash)?
            .ok_or(StoreError::NotFound("block for successor update"))?;
        sideband.successor = successor;
        self.put(txn, hash, &block, &sideband)
    }

    pub fn block_type(
        &self,
        txn: &RoTxn,
        hash: &BlockHash,
    ) -> Result<Option<BlockType>, StoreError> {
        let Some(value) = self.store.blocks_db.get(txn, hash.as_bytes())? else {
            return Ok(None);
        };
        let tag = *value.first().ok_or(StoreError::NotFound("block tag"))?;
        Ok(Some(BlockType::from_u8(tag)?))
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.blocks_db.len(txn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_types::{
        Account, Amount, BlockDetails, Epoch, SendBlock, Signature, Timestamp,
    };

    fn sample_block() -> Block {
        Block::Send(SendBlock {
            previous: BlockHash::new([1u8; 32]),
            destination: Account::new([2u8; 32]),
            balance: Amount::new(500),
            signature: Signature([3u8; 64]),
            work: 9,
        })
    }

    fn sample_sideband() -> BlockSideband {
        BlockSideband {
            successor: BlockHash::ZERO,
            account: Account::new([4u8; 32]),
            balance: Amount::new(500),
            height: 2,
            timestamp: Timestamp::new(1000),
            details: BlockDetails::new(Epoch::Epoch0, true, false, false),
            source_epoch: Epoch::Epoch0,
        }
    }

    #[test]
    fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let block = sample_block();
        let hash = block.hash();

        let mut wtxn = store.write_txn().unwrap();
        store
            .block()
            .put(&mut wtxn, &hash, &block, &sample_sideband())
            .unwrap();
        wtxn.commit().unwrap();

        let rtxn = store.read_txn().unwrap();
        let (loaded, sideband) = store.block().get(&rtxn, &hash).unwrap().unwrap();
        assert_eq!(loaded, block);
        assert_eq!(sideband, sample_sideband());
        assert!(store.block().exists(&rtxn, &hash).unwrap());
        assert_eq!(store.block().count(&rtxn).unwrap(), 1);
    }

    #[test]
    fn successor_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let block = sample_block();
        let hash = block.hash();
        let next = BlockHash::new([7u8; 32]);

        let mut wtxn = store.write_txn().unwrap();
        store
            .block()
            .put(&mut wtxn, &hash, &block, &sample_sideband())
            .unwrap();
        store.block().set_successor(&mut wtxn, &hash, next).unwrap();
        wtxn.commit().unwrap();

        let rtxn = store.read_txn().unwrap();
        assert_eq!(store.block().successor(&rtxn, &hash).unwrap(), Some(next));
    }

    #[test]
    fn uncommitted_writes_are_invisible() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let block = sample_block();
        let hash = block.hash();

        {
            let mut wtxn = store.write_txn().unwrap();
            store
                .block()
                .put(&mut wtxn, &hash, &block, &sample_sideband())
                .unwrap();
            // dropped without commit
        }

        let rtxn = store.read_txn().unwrap();
        assert!(!store.block().exists(&rtxn, &hash).unwrap());
    }
}
