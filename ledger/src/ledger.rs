//! The ledger — persistent state plus the weight cache, with query helpers.

use std::sync::{Arc, Mutex};

use strand_store::{LedgerStore, RoTxn, RwTxn};
use strand_types::{
    Account, AccountInfo, Amount, Block, BlockDetails, BlockHash, BlockSideband,
    ConfirmationHeightInfo, Epoch, Timestamp,
};

use crate::constants::LedgerConstants;
use crate::error::LedgerError;
use crate::genesis::create_genesis_block;
use crate::process::{self, ProcessResult};
use crate::rep_weights::RepWeights;
use crate::rollback;

/// Validates and applies blocks against persistent state.
///
/// All mutations run under a caller-held write transaction; nothing is
/// visible to readers until the caller commits. The representative weight
/// cache shadows the persisted representation table and is rebuilt from the
/// accounts table if they ever diverge (e.g. after an aborted transaction).
pub struct Ledger {
    store: Arc<LedgerStore>,
    pub constants: LedgerConstants,
    rep_weights: Mutex<RepWeights>,
}

impl Ledger {
    /// Open the ledger: bootstrap the genesis account on first run and
    /// rebuild the weight cache from the accounts table.
    pub fn new(store: Arc<LedgerStore>, constants: LedgerConstants) -> Result<Self, LedgerError> {
        let ledger = Self {
            store,
            constants,
            rep_weights: Mutex::new(RepWeights::new()),
        };
        ledger.bootstrap_genesis()?;
        ledger.rebuild_rep_weights()?;
        Ok(ledger)
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Validate and apply one block. See the process module for the rules.
    pub fn process(&self, txn: &mut RwTxn, block: &Block) -> Result<ProcessResult, LedgerError> {
        process::process(self, txn, block)
    }

    /// Reverse the latest block(s) of the account owning `hash` until
    /// `hash` itself has been reversed. Returns the rolled-back blocks,
    /// most recent first.
    pub fn rollback(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<Vec<Block>, LedgerError> {
        rollback::rollback(self, txn, hash)
    }

    // ── Representation ──────────────────────────────────────────────────

    /// Voting weight currently delegated to `representative`.
    pub fn weight(&self, representative: &Account) -> Amount {
        self.rep_weights
            .lock()
            .expect("rep weight cache poisoned")
            .weight(representative)
    }

    /// Snapshot of every representative and its weight.
    pub fn rep_weights(&self) -> std::collections::HashMap<Account, Amount> {
        self.rep_weights
            .lock()
            .expect("rep weight cache poisoned")
            .all()
    }

    pub(crate) fn representation_add(
        &self,
        txn: &mut RwTxn,
        representative: &Account,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut cache = self.rep_weights.lock().expect("rep weight cache poisoned");
        cache.add(representative, amount);
        let updated = cache.weight(representative);
        self.store.rep_weight().put(txn, representative, updated)?;
        Ok(())
    }

    pub(crate) fn representation_sub(
        &self,
        txn: &mut RwTxn,
        representative: &Account,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut cache = self.rep_weights.lock().expect("rep weight cache poisoned");
        cache.sub(representative, amount);
        let updated = cache.weight(representative);
        self.store.rep_weight().put(txn, representative, updated)?;
        Ok(())
    }

    /// Recompute the weight cache from the accounts table (the canonical
    /// source; the representation table is only a persisted cache).
    pub fn rebuild_rep_weights(&self) -> Result<(), LedgerError> {
        let rtxn = self.store.read_txn()?;
        let delegations = self
            .store
            .account()
            .iter(&rtxn)?
            .into_iter()
            .map(|(_, info)| (info.representative, info.balance));
        *self.rep_weights.lock().expect("rep weight cache poisoned") =
            RepWeights::rebuild(delegations);
        Ok(())
    }

    // ── Query helpers ───────────────────────────────────────────────────

    /// Balance of the account owning `hash`, as of that block.
    pub fn balance(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Option<Amount>, LedgerError> {
        Ok(self
            .store
            .block()
            .get(txn, hash)?
            .map(|(_, sideband)| sideband.balance))
    }

    /// The account whose chain contains `hash`.
    pub fn account_of(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .store
            .block()
            .get(txn, hash)?
            .map(|(_, sideband)| sideband.account))
    }

    /// Head block of `account`'s chain.
    pub fn latest(&self, txn: &RoTxn, account: &Account) -> Result<Option<BlockHash>, LedgerError> {
        Ok(self.store.account().get(txn, account)?.map(|info| info.head))
    }

    /// The amount a receive of `send_hash` credits: the send's balance
    /// delta, read from the sidebands of the send and its predecessor.
    pub fn amount_of(&self, txn: &RoTxn, send_hash: &BlockHash) -> Result<Option<Amount>, LedgerError> {
        let Some((block, sideband)) = self.store.block().get(txn, send_hash)? else {
            return Ok(None);
        };
        let previous = block.previous();
        if previous.is_zero() {
            return Ok(Some(sideband.balance));
        }
        let Some(previous_balance) = self.balance(txn, &previous)? else {
            return Ok(None);
        };
        Ok(Some(previous_balance.saturating_sub(sideband.balance)))
    }

    /// Walk back from `hash` to the nearest block carrying a representative
    /// field (legacy sends and receives don't).
    pub fn representative_of(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Account, LedgerError> {
        let mut cursor = *hash;
        loop {
            let (block, _) = self
                .store
                .block()
                .get(txn, &cursor)?
                .ok_or(LedgerError::BlockNotFound(cursor))?;
            if let Some(representative) = block.representative() {
                return Ok(representative);
            }
            cursor = block.previous();
            if cursor.is_zero() {
                return Err(LedgerError::Invariant(
                    "chain ended without a representative-bearing block",
                ));
            }
        }
    }

    /// Whether `hash` lies at or below its account's cemented frontier.
    pub fn block_confirmed(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, LedgerError> {
        let Some((_, sideband)) = self.store.block().get(txn, hash)? else {
            // A pruned block was cemented before pruning.
            return Ok(self.store.pruned().exists(txn, hash)?);
        };
        let info = self
            .store
            .confirmation_height()
            .get(txn, &sideband.account)?;
        Ok(sideband.height <= info.height)
    }

    /// Whether the block has been seen at all (admitted or pruned).
    pub fn block_or_pruned_exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, LedgerError> {
        Ok(self.store.block().exists(txn, hash)? || self.store.pruned().exists(txn, hash)?)
    }

    // ── Genesis ─────────────────────────────────────────────────────────

    fn bootstrap_genesis(&self) -> Result<(), LedgerError> {
        {
            let rtxn = self.store.read_txn()?;
            if self.store.account().count(&rtxn)? > 0 {
                return Ok(());
            }
        }

        let block = create_genesis_block(&self.constants);
        let hash = block.hash();
        let account = self.constants.genesis_account;
        let amount = self.constants.genesis_amount;

        let mut txn = self.store.write_txn()?;
        let sideband = BlockSideband {
            successor: BlockHash::ZERO,
            account,
            balance: amount,
            height: 1,
            timestamp: Timestamp::now(),
            details: BlockDetails::new(Epoch::Epoch0, false, true, false),
            source_epoch: Epoch::Epoch0,
        };
        self.store.block().put(&mut txn, &hash, &block, &sideband)?;
        self.store.account().put(
            &mut txn,
            &account,
            &AccountInfo {
                head: hash,
                representative: account,
                open_block: hash,
                balance: amount,
                modified: Timestamp::now(),
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        )?;
        self.store.rep_weight().put(&mut txn, &account, amount)?;
        self.store.frontier().put(&mut txn, &hash, &account)?;
        // Genesis is confirmed by definition.
        self.store.confirmation_height().put(
            &mut txn,
            &account,
            &ConfirmationHeightInfo::new(1, hash),
        )?;
        txn.commit().map_err(strand_store::StoreError::from)?;

        tracing::info!(genesis = %hash, network = self.constants.network.as_str(), "ledger bootstrapped");
        Ok(())
    }
}
