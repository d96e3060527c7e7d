//! LMDB environment setup — opens the named databases and runs migrations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use crate::account::AccountStore;
use crate::block::BlockStore;
use crate::confirmation_height::ConfirmationHeightStore;
use crate::error::StoreError;
use crate::final_vote::FinalVoteStore;
use crate::frontier::FrontierStore;
use crate::meta::MetaStore;
use crate::migration::Migrator;
use crate::online_weight::OnlineWeightStore;
use crate::peer::PeerStore;
use crate::pending::PendingStore;
use crate::pruned::PrunedStore;
use crate::rep_weight::RepWeightStore;
use crate::unchecked::UncheckedStore;

/// Default LMDB map size: 16 GiB (sparse until used).
const DEFAULT_MAP_SIZE: usize = 16 << 30;
/// Number of named LMDB databases.
const MAX_DBS: u32 = 12;

/// The unified ledger store: LMDB environment plus one handle per table.
pub struct LedgerStore {
    env: Arc<Env>,
    path: PathBuf,
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    pub(crate) pending_db: Database<Bytes, Bytes>,
    pub(crate) representation_db: Database<Bytes, Bytes>,
    pub(crate) pruned_db: Database<Bytes, Bytes>,
    pub(crate) unchecked_db: Database<Bytes, Bytes>,
    pub(crate) final_vote_db: Database<Bytes, Bytes>,
    pub(crate) confirmation_height_db: Database<Bytes, Bytes>,
    pub(crate) frontiers_db: Database<Bytes, Bytes>,
    pub(crate) online_weight_db: Database<Bytes, Bytes>,
    pub(crate) peers_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LedgerStore {
    /// Open or create the store at `path` and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;
        // Safety: the path is a directory we own for the lifetime of the
        // process; no other environment is opened on it with different flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let blocks_db = env.create_database(&mut wtxn, Some("blocks"))?;
        let accounts_db = env.create_database(&mut wtxn, Some("accounts"))?;
        let pending_db = env.create_database(&mut wtxn, Some("pending"))?;
        let representation_db = env.create_database(&mut wtxn, Some("representation"))?;
        let pruned_db = env.create_database(&mut wtxn, Some("pruned"))?;
        let unchecked_db = env.create_database(&mut wtxn, Some("unchecked"))?;
        let final_vote_db = env.create_database(&mut wtxn, Some("final_vote"))?;
        let confirmation_height_db =
            env.create_database(&mut wtxn, Some("confirmation_height"))?;
        let frontiers_db = env.create_database(&mut wtxn, Some("frontiers"))?;
        let online_weight_db = env.create_database(&mut wtxn, Some("online_weight"))?;
        let peers_db = env.create_database(&mut wtxn, Some("peers"))?;
        let meta_db = env.create_database(&mut wtxn, Some("version"))?;
        wtxn.commit()?;

        let store = Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            blocks_db,
            accounts_db,
            pending_db,
            representation_db,
            pruned_db,
            unchecked_db,
            final_vote_db,
            confirmation_height_db,
            frontiers_db,
            online_weight_db,
            peers_db,
            meta_db,
        };

        Migrator::run(&store)?;
        Ok(store)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_txn(&self) -> Result<RwTxn<'_>, StoreError> {
        Ok(self.env.write_txn()?)
    }

    pub fn read_txn(&self) -> Result<RoTxn<'_>, StoreError> {
        Ok(self.env.read_txn()?)
    }

    // ── Typed table accessors ───────────────────────────────────────────

    pub fn block(&self) -> BlockStore<'_> {
        BlockStore { store: self }
    }

    pub fn account(&self) -> AccountStore<'_> {
        AccountStore { store: self }
    }

    pub fn pending(&self) -> PendingStore<'_> {
        PendingStore { store: self }
    }

    pub fn rep_weight(&self) -> RepWeightStore<'_> {
        RepWeightStore { store: self }
    }

    pub fn pruned(&self) -> PrunedStore<'_> {
        PrunedStore { store: self }
    }

    pub fn unchecked(&self) -> UncheckedStore<'_> {
        UncheckedStore { store: self }
    }

    pub fn final_vote(&self) -> FinalVoteStore<'_> {
        FinalVoteStore { store: self }
    }

    pub fn confirmation_height(&self) -> ConfirmationHeightStore<'_> {
        ConfirmationHeightStore { store: self }
    }

    pub fn frontier(&self) -> FrontierStore<'_> {
        FrontierStore { store: self }
    }

    pub fn online_weight(&self) -> OnlineWeightStore<'_> {
        OnlineWeightStore { store: self }
    }

    pub fn peer(&self) -> PeerStore<'_> {
        PeerStore { store: self }
    }

    pub fn meta(&self) -> MetaStore<'_> {
        MetaStore { store: self }
    }
}
