//! Store maintenance — compaction and dated backups.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use heed::CompactionOption;

use crate::environment::LedgerStore;
use crate::error::StoreError;

/// Write a dated, compacted copy of the data file next to it and return
/// its path. Used by the CLI `snapshot` command and before destructive
/// migration steps.
pub fn snapshot(store: &LedgerStore) -> Result<PathBuf, StoreError> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let dest = store.path().join(format!("snapshot-{stamp}.mdb"));
    store
        .env()
        .copy_to_file(&dest, CompactionOption::Enabled)?;
    Ok(dest)
}

/// Compact the data file in place: copy-compact to a temporary file, close
/// the environment, then rename over the original.
///
/// Takes ownership of the store because the environment must be closed
/// before the rename; callers reopen afterwards.
pub fn vacuum(store: LedgerStore) -> Result<(), StoreError> {
    let dir = store.path().to_path_buf();
    let tmp = dir.join("vacuum.tmp.mdb");
    store.env().copy_to_file(&tmp, CompactionOption::Enabled)?;
    drop(store);
    std::fs::rename(&tmp, dir.join("data.mdb"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_types::{Account, AccountInfo, Amount, BlockHash, Epoch, Timestamp};

    fn sample_info() -> AccountInfo {
        AccountInfo {
            head: BlockHash::new([1u8; 32]),
            representative: Account::new([2u8; 32]),
            open_block: BlockHash::new([3u8; 32]),
            balance: Amount::new(5),
            modified: Timestamp::new(1),
            block_count: 1,
            epoch: Epoch::Epoch0,
        }
    }

    #[test]
    fn snapshot_creates_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("data").as_path()).unwrap();
        let path = snapshot(&store).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn vacuum_preserves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let account = Account::new([9u8; 32]);
        {
            let store = LedgerStore::open(&path).unwrap();
            let mut wtxn = store.write_txn().unwrap();
            store.account().put(&mut wtxn, &account, &sample_info()).unwrap();
            wtxn.commit().unwrap();
            vacuum(store).unwrap();
        }
        let store = LedgerStore::open(&path).unwrap();
        let rtxn = store.read_txn().unwrap();
        assert!(store.account().exists(&rtxn, &account).unwrap());
    }
}
