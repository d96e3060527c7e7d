//! Block validation and application.
//!
//! `process` dispatches on the block variant; every branch either returns a
//! non-progress code without touching state, or applies the full effect set
//! (block + sideband, account info, pending, representation, frontier)
//! under the caller's write transaction. First failing check wins.

use strand_crypto::verify_signature;
use strand_store::RwTxn;
use strand_types::{
    Account, AccountInfo, Amount, Block, BlockDetails, BlockHash, BlockSideband, ChangeBlock,
    Epoch, OpenBlock, PendingInfo, PendingKey, ReceiveBlock, SendBlock, StateBlock, Timestamp,
};

use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Outcome classification of `Ledger::process`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessCode {
    /// Block admitted and applied.
    Progress,
    /// Already in the ledger (or pruned) — benign replay.
    Old,
    /// The previous block is unknown; stash until it arrives.
    GapPrevious,
    /// The source send is unknown; stash until it arrives.
    GapSource,
    /// Signature check failed against the signing account.
    BadSignature,
    /// A send whose balance exceeds its predecessor's.
    NegativeSpend,
    /// Receive without a matching pending entry.
    Unreceivable,
    /// Block type or epoch is not allowed at this chain position.
    BlockPosition,
    /// Another block already occupies this root.
    Fork,
    /// Stated balance disagrees with the pending amount or epoch rules.
    BalanceMismatch,
    /// Attempt to open the all-zero burn account.
    OpenedBurnAccount,
    /// Epoch block changes the representative.
    RepresentativeMismatch,
}

/// Result of `Ledger::process`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessResult {
    pub code: ProcessCode,
    /// The account the block was applied to (Progress only).
    pub account: Option<Account>,
    /// Value moved by the block (Progress only; zero for change/epoch).
    pub amount: Option<Amount>,
    /// Destination of a send's new pending entry.
    pub pending_account: Option<Account>,
}

impl ProcessResult {
    pub(crate) fn from_code(code: ProcessCode) -> Self {
        Self {
            code,
            account: None,
            amount: None,
            pending_account: None,
        }
    }

    pub fn is_progress(&self) -> bool {
        self.code == ProcessCode::Progress
    }
}

pub(crate) fn process(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
) -> Result<ProcessResult, LedgerError> {
    match block {
        Block::Open(open) => process_open(ledger, txn, block, open),
        Block::Send(send) => process_send(ledger, txn, block, send),
        Block::Receive(receive) => process_receive(ledger, txn, block, receive),
        Block::Change(change) => process_change(ledger, txn, block, change),
        Block::State(state) => process_state(ledger, txn, block, state),
    }
}

// ── State blocks ────────────────────────────────────────────────────────

fn process_state(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    state: &StateBlock,
) -> Result<ProcessResult, LedgerError> {
    // An epoch link always selects the epoch path — it must never fall
    // through to the value path, where the link would be misread as a send
    // target. The balance-unchanged rule is enforced inside, after the
    // position checks.
    if ledger.constants.is_epoch_link(&state.link) {
        return process_epoch(ledger, txn, block, state);
    }
    process_state_value(ledger, txn, block, state)
}

fn process_state_value(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    state: &StateBlock,
) -> Result<ProcessResult, LedgerError> {
    let hash = block.hash();
    if ledger.block_or_pruned_exists(txn, &hash)? {
        return Ok(ProcessResult::from_code(ProcessCode::Old));
    }
    if !verify_signature(hash.as_bytes(), &state.signature, &state.account.public_key()) {
        return Ok(ProcessResult::from_code(ProcessCode::BadSignature));
    }
    if state.account.is_zero() {
        return Ok(ProcessResult::from_code(ProcessCode::OpenedBurnAccount));
    }

    let existing = ledger.store().account().get(txn, &state.account)?;
    let mut epoch = Epoch::Epoch0;
    let mut source_epoch = Epoch::Epoch0;
    let mut is_send = false;
    let amount;

    match &existing {
        Some(info) => {
            epoch = info.epoch;
            if state.previous.is_zero() {
                // Account already open; a second first-block is an alternate.
                return Ok(ProcessResult::from_code(ProcessCode::Fork));
            }
            if !ledger.store().block().exists(txn, &state.previous)? {
                return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
            }
            if state.previous != info.head {
                return Ok(ProcessResult::from_code(ProcessCode::Fork));
            }
            is_send = state.balance < info.balance;
            amount = if is_send {
                info.balance - state.balance
            } else {
                state.balance - info.balance
            };
        }
        None => {
            if !state.previous.is_zero() {
                return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
            }
            if state.link.is_zero() {
                // The first block of an account is always a receive.
                return Ok(ProcessResult::from_code(ProcessCode::GapSource));
            }
            amount = state.balance;
        }
    }

    if !is_send {
        if !state.link.is_zero() {
            // Receive sub-kind: the link names the consumed send.
            if !ledger.block_or_pruned_exists(txn, &state.link)? {
                return Ok(ProcessResult::from_code(ProcessCode::GapSource));
            }
            let key = PendingKey::new(state.account, state.link);
            let Some(pending) = ledger.store().pending().get(txn, &key)? else {
                return Ok(ProcessResult::from_code(ProcessCode::Unreceivable));
            };
            if amount != pending.amount {
                return Ok(ProcessResult::from_code(ProcessCode::BalanceMismatch));
            }
            source_epoch = pending.epoch;
            epoch = epoch.max(pending.epoch);
        } else {
            // No link: only the representative may change.
            if !amount.is_zero() {
                return Ok(ProcessResult::from_code(ProcessCode::BalanceMismatch));
            }
        }
    }

    // All checks passed — apply.
    let (height, open_block) = match &existing {
        Some(info) => (info.block_count + 1, info.open_block),
        None => (1, hash),
    };
    let sideband = BlockSideband {
        successor: BlockHash::ZERO,
        account: state.account,
        balance: state.balance,
        height,
        timestamp: Timestamp::now(),
        details: BlockDetails::new(epoch, is_send, !is_send && !state.link.is_zero(), false),
        source_epoch,
    };
    ledger.store().block().put(txn, &hash, block, &sideband)?;

    if let Some(info) = &existing {
        ledger.store().block().set_successor(txn, &info.head, hash)?;
        ledger.representation_sub(txn, &info.representative, info.balance)?;
    }
    ledger.representation_add(txn, &state.representative, state.balance)?;

    let mut pending_account = None;
    if is_send {
        let key = PendingKey::new(state.link.as_account(), hash);
        let info = PendingInfo::new(state.account, amount, epoch);
        ledger.store().pending().put(txn, &key, &info)?;
        pending_account = Some(state.link.as_account());
    } else if !state.link.is_zero() {
        ledger
            .store()
            .pending()
            .del(txn, &PendingKey::new(state.account, state.link))?;
    }

    ledger.store().account().put(
        txn,
        &state.account,
        &AccountInfo {
            head: hash,
            representative: state.representative,
            open_block,
            balance: state.balance,
            modified: Timestamp::now(),
            block_count: height,
            epoch,
        },
    )?;

    // State heads are addressed through the account payload; a surviving
    // legacy frontier entry for the old head must go.
    if let Some(info) = &existing {
        if ledger.store().frontier().get(txn, &info.head)?.is_some() {
            ledger.store().frontier().del(txn, &info.head)?;
        }
    }

    Ok(ProcessResult {
        code: ProcessCode::Progress,
        account: Some(state.account),
        amount: Some(amount),
        pending_account,
    })
}

fn process_epoch(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    state: &StateBlock,
) -> Result<ProcessResult, LedgerError> {
    let hash = block.hash();
    if ledger.block_or_pruned_exists(txn, &hash)? {
        return Ok(ProcessResult::from_code(ProcessCode::Old));
    }
    if !verify_signature(
        hash.as_bytes(),
        &state.signature,
        &ledger.constants.epoch_signer.public_key(),
    ) {
        return Ok(ProcessResult::from_code(ProcessCode::BadSignature));
    }
    if state.account.is_zero() {
        return Ok(ProcessResult::from_code(ProcessCode::OpenedBurnAccount));
    }

    let existing = ledger.store().account().get(txn, &state.account)?;
    match &existing {
        Some(info) => {
            if state.previous.is_zero() {
                return Ok(ProcessResult::from_code(ProcessCode::Fork));
            }
            if !ledger.store().block().exists(txn, &state.previous)? {
                return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
            }
            if state.previous != info.head {
                return Ok(ProcessResult::from_code(ProcessCode::Fork));
            }
            if state.representative != info.representative {
                return Ok(ProcessResult::from_code(ProcessCode::RepresentativeMismatch));
            }
        }
        None => {
            // Epoch-opening an unopened account: no value, no delegate.
            if !state.previous.is_zero() {
                return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
            }
            if !state.representative.is_zero() {
                return Ok(ProcessResult::from_code(ProcessCode::RepresentativeMismatch));
            }
        }
    }

    // The link determines the target generation; it must advance the
    // account's epoch by exactly one. Position outranks the balance rule.
    let current_epoch = existing.as_ref().map(|info| info.epoch).unwrap_or_default();
    let target = ledger
        .constants
        .epoch_of_link(&state.link)
        .ok_or(LedgerError::Invariant("epoch path without epoch link"))?;
    if current_epoch.successor() != Some(target) {
        return Ok(ProcessResult::from_code(ProcessCode::BlockPosition));
    }

    // Epoch upgrades move no value.
    let unchanged = match &existing {
        Some(info) => state.balance == info.balance,
        None => state.balance.is_zero(),
    };
    if !unchanged {
        return Ok(ProcessResult::from_code(ProcessCode::BalanceMismatch));
    }

    let (height, open_block, balance) = match &existing {
        Some(info) => (info.block_count + 1, info.open_block, info.balance),
        None => (1, hash, Amount::ZERO),
    };
    let sideband = BlockSideband {
        successor: BlockHash::ZERO,
        account: state.account,
        balance,
        height,
        timestamp: Timestamp::now(),
        details: BlockDetails::new(target, false, false, true),
        source_epoch: Epoch::Epoch0,
    };
    ledger.store().block().put(txn, &hash, block, &sideband)?;
    if let Some(info) = &existing {
        ledger.store().block().set_successor(txn, &info.head, hash)?;
    }

    // Epoch blocks move no value and touch no pendings or representation.
    ledger.store().account().put(
        txn,
        &state.account,
        &AccountInfo {
            head: hash,
            representative: state.representative,
            open_block,
            balance,
            modified: Timestamp::now(),
            block_count: height,
            epoch: target,
        },
    )?;
    if let Some(info) = &existing {
        if ledger.store().frontier().get(txn, &info.head)?.is_some() {
            ledger.store().frontier().del(txn, &info.head)?;
        }
    }

    Ok(ProcessResult {
        code: ProcessCode::Progress,
        account: Some(state.account),
        amount: Some(Amount::ZERO),
        pending_account: None,
    })
}

// ── Legacy blocks ───────────────────────────────────────────────────────

fn process_open(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    open: &OpenBlock,
) -> Result<ProcessResult, LedgerError> {
    let hash = block.hash();
    if ledger.block_or_pruned_exists(txn, &hash)? {
        return Ok(ProcessResult::from_code(ProcessCode::Old));
    }
    if !ledger.block_or_pruned_exists(txn, &open.source)? {
        return Ok(ProcessResult::from_code(ProcessCode::GapSource));
    }
    if !verify_signature(hash.as_bytes(), &open.signature, &open.account.public_key()) {
        return Ok(ProcessResult::from_code(ProcessCode::BadSignature));
    }
    if ledger.store().account().exists(txn, &open.account)? {
        return Ok(ProcessResult::from_code(ProcessCode::Fork));
    }
    let key = PendingKey::new(open.account, open.source);
    let Some(pending) = ledger.store().pending().get(txn, &key)? else {
        return Ok(ProcessResult::from_code(ProcessCode::Unreceivable));
    };
    if open.account.is_zero() {
        return Ok(ProcessResult::from_code(ProcessCode::OpenedBurnAccount));
    }
    // Legacy opens cannot receive epoch-marked sends.
    if pending.epoch != Epoch::Epoch0 {
        return Ok(ProcessResult::from_code(ProcessCode::Unreceivable));
    }

    ledger.store().pending().del(txn, &key)?;
    let sideband = BlockSideband {
        successor: BlockHash::ZERO,
        account: open.account,
        balance: pending.amount,
        height: 1,
        timestamp: Timestamp::now(),
        details: BlockDetails::new(Epoch::Epoch0, false, true, false),
        source_epoch: Epoch::Epoch0,
    };
    ledger.store().block().put(txn, &hash, block, &sideband)?;
    ledger.store().account().put(
        txn,
        &open.account,
        &AccountInfo {
            head: hash,
            representative: open.representative,
            open_block: hash,
            balance: pending.amount,
            modified: Timestamp::now(),
            block_count: 1,
            epoch: Epoch::Epoch0,
        },
    )?;
    ledger.representation_add(txn, &open.representative, pending.amount)?;
    ledger.store().frontier().put(txn, &hash, &open.account)?;

    Ok(ProcessResult {
        code: ProcessCode::Progress,
        account: Some(open.account),
        amount: Some(pending.amount),
        pending_account: None,
    })
}

fn process_send(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    send: &SendBlock,
) -> Result<ProcessResult, LedgerError> {
    let hash = block.hash();
    if ledger.block_or_pruned_exists(txn, &hash)? {
        return Ok(ProcessResult::from_code(ProcessCode::Old));
    }
    let Some((previous, _)) = ledger.store().block().get(txn, &send.previous)? else {
        return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
    };
    if !block.valid_predecessor(&previous) {
        return Ok(ProcessResult::from_code(ProcessCode::BlockPosition));
    }
    // The previous block must be a current legacy head; otherwise a signed
    // alternate exists for this slot.
    let Some(account) = ledger.store().frontier().get(txn, &send.previous)? else {
        return Ok(ProcessResult::from_code(ProcessCode::Fork));
    };
    if !verify_signature(hash.as_bytes(), &send.signature, &account.public_key()) {
        return Ok(ProcessResult::from_code(ProcessCode::BadSignature));
    }
    let info = ledger
        .store()
        .account()
        .get(txn, &account)?
        .ok_or(LedgerError::Invariant("frontier names a missing account"))?;
    if send.balance > info.balance {
        return Ok(ProcessResult::from_code(ProcessCode::NegativeSpend));
    }

    let amount = info.balance - send.balance;
    ledger.representation_sub(txn, &info.representative, amount)?;
    let sideband = BlockSideband {
        successor: BlockHash::ZERO,
        account,
        balance: send.balance,
        height: info.block_count + 1,
        timestamp: Timestamp::now(),
        details: BlockDetails::new(Epoch::Epoch0, true, false, false),
        source_epoch: Epoch::Epoch0,
    };
    ledger.store().block().put(txn, &hash, block, &sideband)?;
    ledger.store().block().set_successor(txn, &info.head, hash)?;
    ledger.store().account().put(
        txn,
        &account,
        &AccountInfo {
            head: hash,
            balance: send.balance,
            modified: Timestamp::now(),
            block_count: info.block_count + 1,
            ..info
        },
    )?;
    ledger.store().pending().put(
        txn,
        &PendingKey::new(send.destination, hash),
        &PendingInfo::new(account, amount, Epoch::Epoch0),
    )?;
    ledger.store().frontier().del(txn, &send.previous)?;
    ledger.store().frontier().put(txn, &hash, &account)?;

    Ok(ProcessResult {
        code: ProcessCode::Progress,
        account: Some(account),
        amount: Some(amount),
        pending_account: Some(send.destination),
    })
}

fn process_receive(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    receive: &ReceiveBlock,
) -> Result<ProcessResult, LedgerError> {
    let hash = block.hash();
    if ledger.block_or_pruned_exists(txn, &hash)? {
        return Ok(ProcessResult::from_code(ProcessCode::Old));
    }
    let Some((previous, _)) = ledger.store().block().get(txn, &receive.previous)? else {
        return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
    };
    if !block.valid_predecessor(&previous) {
        return Ok(ProcessResult::from_code(ProcessCode::BlockPosition));
    }
    if !ledger.block_or_pruned_exists(txn, &receive.source)? {
        return Ok(ProcessResult::from_code(ProcessCode::GapSource));
    }
    let Some(account) = ledger.store().frontier().get(txn, &receive.previous)? else {
        // Previous exists but isn't a head — a signed alternate.
        return Ok(ProcessResult::from_code(ProcessCode::Fork));
    };
    if !verify_signature(hash.as_bytes(), &receive.signature, &account.public_key()) {
        return Ok(ProcessResult::from_code(ProcessCode::BadSignature));
    }
    let info = ledger
        .store()
        .account()
        .get(txn, &account)?
        .ok_or(LedgerError::Invariant("frontier names a missing account"))?;
    let key = PendingKey::new(account, receive.source);
    let Some(pending) = ledger.store().pending().get(txn, &key)? else {
        return Ok(ProcessResult::from_code(ProcessCode::Unreceivable));
    };
    // Legacy receives cannot consume epoch-marked sends.
    if pending.epoch != Epoch::Epoch0 {
        return Ok(ProcessResult::from_code(ProcessCode::Unreceivable));
    }

    let new_balance = info.balance.saturating_add(pending.amount);
    ledger.store().pending().del(txn, &key)?;
    let sideband = BlockSideband {
        successor: BlockHash::ZERO,
        account,
        balance: new_balance,
        height: info.block_count + 1,
        timestamp: Timestamp::now(),
        details: BlockDetails::new(Epoch::Epoch0, false, true, false),
        source_epoch: Epoch::Epoch0,
    };
    ledger.store().block().put(txn, &hash, block, &sideband)?;
    ledger.store().block().set_successor(txn, &info.head, hash)?;
    ledger.store().account().put(
        txn,
        &account,
        &AccountInfo {
            head: hash,
            balance: new_balance,
            modified: Timestamp::now(),
            block_count: info.block_count + 1,
            ..info
        },
    )?;
    ledger.representation_add(txn, &info.representative, pending.amount)?;
    ledger.store().frontier().del(txn, &receive.previous)?;
    ledger.store().frontier().put(txn, &hash, &account)?;

    Ok(ProcessResult {
        code: ProcessCode::Progress,
        account: Some(account),
        amount: Some(pending.amount),
        pending_account: None,
    })
}

fn process_change(
    ledger: &Ledger,
    txn: &mut RwTxn,
    block: &Block,
    change: &ChangeBlock,
) -> Result<ProcessResult, LedgerError> {
    let hash = block.hash();
    if ledger.block_or_pruned_exists(txn, &hash)? {
        return Ok(ProcessResult::from_code(ProcessCode::Old));
    }
    let Some((previous, _)) = ledger.store().block().get(txn, &change.previous)? else {
        return Ok(ProcessResult::from_code(ProcessCode::GapPrevious));
    };
    if !block.valid_predecessor(&previous) {
        return Ok(ProcessResult::from_code(ProcessCode::BlockPosition));
    }
    let Some(account) = ledger.store().frontier().get(txn, &change.previous)? else {
        return Ok(ProcessResult::from_code(ProcessCode::Fork));
    };
    if !verify_signature(hash.as_bytes(), &change.signature, &account.public_key()) {
        return Ok(ProcessResult::from_code(ProcessCode::BadSignature));
    }
    let info = ledger
        .store()
        .account()
        .get(txn, &account)?
        .ok_or(LedgerError::Invariant("frontier names a missing account"))?;

    let sideband = BlockSideband {
        successor: BlockHash::ZERO,
        account,
        balance: info.balance,
        height: info.block_count + 1,
        timestamp: Timestamp::now(),
        details: BlockDetails::new(Epoch::Epoch0, false, false, false),
        source_epoch: Epoch::Epoch0,
    };
    ledger.store().block().put(txn, &hash, block, &sideband)?;
    ledger.store().block().set_successor(txn, &info.head, hash)?;
    ledger.representation_sub(txn, &info.representative, info.balance)?;
    ledger.representation_add(txn, &change.representative, info.balance)?;
    ledger.store().account().put(
        txn,
        &account,
        &AccountInfo {
            head: hash,
            representative: change.representative,
            modified: Timestamp::now(),
            block_count: info.block_count + 1,
            ..info
        },
    )?;
    ledger.store().frontier().del(txn, &change.previous)?;
    ledger.store().frontier().put(txn, &hash, &account)?;

    Ok(ProcessResult {
        code: ProcessCode::Progress,
        account: Some(account),
        amount: Some(Amount::ZERO),
        pending_account: None,
    })
}
