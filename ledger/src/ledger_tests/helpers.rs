//! Shared fixtures for ledger tests: a temp-backed ledger plus block
//! factories that read current chain state and sign with the right key.

use std::sync::Arc;

use strand_crypto::{keypair_from_seed, sign_message};
use strand_store::LedgerStore;
use strand_types::{
    Account, AccountInfo, Amount, Block, BlockHash, ChangeBlock, Epoch, KeyPair, OpenBlock,
    PendingInfo, PendingKey, ReceiveBlock, SendBlock, Signature, StateBlock,
};

use crate::constants::LedgerConstants;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::process::ProcessResult;

pub(crate) struct LedgerContext {
    _dir: tempfile::TempDir,
    pub store: Arc<LedgerStore>,
    pub ledger: Ledger,
}

pub(crate) fn test_key(byte: u8) -> KeyPair {
    keypair_from_seed(&[byte; 32])
}

pub(crate) fn account_of(key: &KeyPair) -> Account {
    Account::from(key.public)
}

fn signed(mut block: Block, key: &KeyPair) -> Block {
    let hash = block.hash();
    block.set_signature(sign_message(hash.as_bytes(), &key.private));
    block
}

impl LedgerContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LedgerStore::open(dir.path().join("data").as_path()).unwrap());
        let ledger = Ledger::new(Arc::clone(&store), LedgerConstants::dev()).unwrap();
        Self {
            _dir: dir,
            store,
            ledger,
        }
    }

    pub fn genesis_key(&self) -> KeyPair {
        keypair_from_seed(&[0u8; 32])
    }

    pub fn genesis_account(&self) -> Account {
        self.ledger.constants.genesis_account
    }

    pub fn process(&self, block: &Block) -> ProcessResult {
        let mut txn = self.store.write_txn().unwrap();
        let result = self.ledger.process(&mut txn, block).unwrap();
        txn.commit().unwrap();
        result
    }

    pub fn rollback(&self, hash: &BlockHash) -> Result<Vec<Block>, LedgerError> {
        let mut txn = self.store.write_txn().unwrap();
        let result = self.ledger.rollback(&mut txn, hash);
        if result.is_ok() {
            txn.commit().unwrap();
        }
        result
    }

    // ── State inspection ────────────────────────────────────────────────

    pub fn account_info(&self, account: &Account) -> Option<AccountInfo> {
        let rtxn = self.store.read_txn().unwrap();
        self.store.account().get(&rtxn, account).unwrap()
    }

    pub fn balance(&self, account: &Account) -> Amount {
        self.account_info(account)
            .map(|info| info.balance)
            .unwrap_or(Amount::ZERO)
    }

    pub fn pending(&self, destination: &Account, send: &BlockHash) -> Option<PendingInfo> {
        let rtxn = self.store.read_txn().unwrap();
        self.store
            .pending()
            .get(&rtxn, &PendingKey::new(*destination, *send))
            .unwrap()
    }

    pub fn block_exists(&self, hash: &BlockHash) -> bool {
        let rtxn = self.store.read_txn().unwrap();
        self.store.block().exists(&rtxn, hash).unwrap()
    }

    pub fn cement(&self, account: &Account, height: u64, frontier: &BlockHash) {
        let mut txn = self.store.write_txn().unwrap();
        self.store
            .confirmation_height()
            .put(
                &mut txn,
                account,
                &strand_types::ConfirmationHeightInfo::new(height, *frontier),
            )
            .unwrap();
        txn.commit().unwrap();
    }

    // ── Legacy block factories ──────────────────────────────────────────

    pub fn legacy_send(&self, key: &KeyPair, destination: Account, new_balance: Amount) -> Block {
        let info = self.account_info(&account_of(key)).expect("sender not open");
        signed(
            Block::Send(SendBlock {
                previous: info.head,
                destination,
                balance: new_balance,
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    pub fn legacy_open(&self, key: &KeyPair, source: BlockHash, representative: Account) -> Block {
        signed(
            Block::Open(OpenBlock {
                source,
                representative,
                account: account_of(key),
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    pub fn legacy_receive(&self, key: &KeyPair, source: BlockHash) -> Block {
        let info = self.account_info(&account_of(key)).expect("receiver not open");
        signed(
            Block::Receive(ReceiveBlock {
                previous: info.head,
                source,
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    pub fn legacy_change(&self, key: &KeyPair, representative: Account) -> Block {
        let info = self.account_info(&account_of(key)).expect("account not open");
        signed(
            Block::Change(ChangeBlock {
                previous: info.head,
                representative,
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    // ── State block factories ───────────────────────────────────────────

    pub fn state_send(&self, key: &KeyPair, destination: Account, new_balance: Amount) -> Block {
        let info = self.account_info(&account_of(key)).expect("sender not open");
        signed(
            Block::State(StateBlock {
                account: account_of(key),
                previous: info.head,
                representative: info.representative,
                balance: new_balance,
                link: BlockHash::from(destination),
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    pub fn state_open(
        &self,
        key: &KeyPair,
        representative: Account,
        source: BlockHash,
        balance: Amount,
    ) -> Block {
        signed(
            Block::State(StateBlock {
                account: account_of(key),
                previous: BlockHash::ZERO,
                representative,
                balance,
                link: source,
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    pub fn state_receive(&self, key: &KeyPair, source: BlockHash, amount: Amount) -> Block {
        let info = self.account_info(&account_of(key)).expect("receiver not open");
        signed(
            Block::State(StateBlock {
                account: account_of(key),
                previous: info.head,
                representative: info.representative,
                balance: info.balance.saturating_add(amount),
                link: source,
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    pub fn state_change(&self, key: &KeyPair, representative: Account) -> Block {
        let info = self.account_info(&account_of(key)).expect("account not open");
        signed(
            Block::State(StateBlock {
                account: account_of(key),
                previous: info.head,
                representative,
                balance: info.balance,
                link: BlockHash::ZERO,
                signature: Signature::ZERO,
                work: 0,
            }),
            key,
        )
    }

    /// Epoch upgrade block, signed by the epoch signer (the genesis key on
    /// the dev network).
    pub fn epoch_block(&self, target: &Account, epoch: Epoch) -> Block {
        let link = match epoch {
            Epoch::Epoch1 => self.ledger.constants.epoch_1_link,
            Epoch::Epoch2 => self.ledger.constants.epoch_2_link,
            Epoch::Epoch0 => panic!("no epoch-0 upgrade"),
        };
        let (previous, representative, balance) = match self.account_info(target) {
            Some(info) => (info.head, info.representative, info.balance),
            None => (BlockHash::ZERO, Account::BURN, Amount::ZERO),
        };
        signed(
            Block::State(StateBlock {
                account: *target,
                previous,
                representative,
                balance,
                link,
                signature: Signature::ZERO,
                work: 0,
            }),
            &self.genesis_key(),
        )
    }
}
