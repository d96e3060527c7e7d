//! Rollback — exact inversion of block application.
//!
//! Undoes the latest block of an account; when the target is buried, heads
//! are reversed one at a time until the target itself is the head. Undoing
//! a send first cascades into any chain that received its pending entry.
//! Cemented blocks are never reversed; hitting one is an error.

use strand_store::RwTxn;
use strand_types::{
    Account, AccountInfo, Amount, Block, BlockHash, BlockSideband, ChangeBlock, Epoch, OpenBlock,
    PendingInfo, PendingKey, ReceiveBlock, SendBlock, StateBlock, Timestamp,
};

use crate::error::LedgerError;
use crate::ledger::Ledger;

pub(crate) fn rollback(
    ledger: &Ledger,
    txn: &mut RwTxn,
    hash: &BlockHash,
) -> Result<Vec<Block>, LedgerError> {
    let Some((_, sideband)) = ledger.store().block().get(txn, hash)? else {
        return Err(LedgerError::BlockNotFound(*hash));
    };
    let account = sideband.account;
    let mut rolled = Vec::new();
    while ledger.store().block().exists(txn, hash)? {
        let info = ledger
            .store()
            .account()
            .get(txn, &account)?
            .ok_or(LedgerError::Invariant("rollback target has no account"))?;
        rollback_head(ledger, txn, &account, &info, &mut rolled)?;
    }
    Ok(rolled)
}

/// Reverse exactly the head block of `account`.
fn rollback_head(
    ledger: &Ledger,
    txn: &mut RwTxn,
    account: &Account,
    info: &AccountInfo,
    rolled: &mut Vec<Block>,
) -> Result<(), LedgerError> {
    let head = info.head;
    let (block, sideband) = ledger
        .store()
        .block()
        .get(txn, &head)?
        .ok_or(LedgerError::BlockNotFound(head))?;

    let confirmed = ledger.store().confirmation_height().get(txn, account)?;
    if sideband.height <= confirmed.height {
        return Err(LedgerError::RollbackCemented(head));
    }

    match &block {
        Block::Send(send) => rollback_send(ledger, txn, account, info, &head, send)?,
        Block::Receive(receive) => {
            rollback_receive(ledger, txn, account, info, &head, &sideband, receive)?
        }
        Block::Open(open) => rollback_open(ledger, txn, account, &head, &sideband, open)?,
        Block::Change(change) => rollback_change(ledger, txn, account, info, &head, change)?,
        Block::State(state) => rollback_state(ledger, txn, account, info, &head, &sideband, state)?,
    }

    tracing::debug!(block = %head, account = %account, "rolled back");
    rolled.push(block);
    Ok(())
}

fn previous_sideband(
    ledger: &Ledger,
    txn: &mut RwTxn,
    previous: &BlockHash,
) -> Result<BlockSideband, LedgerError> {
    ledger
        .store()
        .block()
        .get(txn, previous)?
        .map(|(_, sideband)| sideband)
        .ok_or(LedgerError::BlockNotFound(*previous))
}

/// Roll back whichever chains consumed `key` until the pending entry
/// reappears, then consume it ourselves.
fn reclaim_pending(
    ledger: &Ledger,
    txn: &mut RwTxn,
    key: &PendingKey,
) -> Result<PendingInfo, LedgerError> {
    while !ledger.store().pending().exists(txn, key)? {
        let receiver_head = ledger
            .latest(txn, &key.account)?
            .ok_or(LedgerError::Invariant("consumed pending with no receiver chain"))?;
        rollback(ledger, txn, &receiver_head)?;
    }
    let pending = ledger
        .store()
        .pending()
        .get(txn, key)?
        .ok_or(LedgerError::Invariant("pending vanished during reclaim"))?;
    ledger.store().pending().del(txn, key)?;
    Ok(pending)
}

fn rollback_send(
    ledger: &Ledger,
    txn: &mut RwTxn,
    account: &Account,
    info: &AccountInfo,
    hash: &BlockHash,
    send: &SendBlock,
) -> Result<(), LedgerError> {
    let pending = reclaim_pending(ledger, txn, &PendingKey::new(send.destination, *hash))?;
    let previous = previous_sideband(ledger, txn, &send.previous)?;

    ledger.representation_add(txn, &info.representative, pending.amount)?;
    ledger.store().account().put(
        txn,
        account,
        &AccountInfo {
            head: send.previous,
            balance: previous.balance,
            modified: Timestamp::now(),
            block_count: info.block_count - 1,
            ..*info
        },
    )?;
    ledger.store().block().del(txn, hash)?;
    ledger.store().frontier().del(txn, hash)?;
    ledger.store().frontier().put(txn, &send.previous, account)?;
    ledger
        .store()
        .block()
        .set_successor(txn, &send.previous, BlockHash::ZERO)?;
    Ok(())
}

fn rollback_receive(
    ledger: &Ledger,
    txn: &mut RwTxn,
    account: &Account,
    info: &AccountInfo,
    hash: &BlockHash,
    sideband: &BlockSideband,
    receive: &ReceiveBlock,
) -> Result<(), LedgerError> {
    let previous = previous_sideband(ledger, txn, &receive.previous)?;
    let amount = sideband.balance - previous.balance;
    let source_account = ledger
        .account_of(txn, &receive.source)?
        .unwrap_or(Account::BURN);

    ledger.representation_sub(txn, &info.representative, amount)?;
    ledger.store().account().put(
        txn,
        account,
        &AccountInfo {
            head: receive.previous,
            balance: previous.balance,
            modified: Timestamp::now(),
            block_count: info.block_count - 1,
            ..*info
        },
    )?;
    ledger.store().block().del(txn, hash)?;
    ledger.store().pending().put(
        txn,
        &PendingKey::new(*account, receive.source),
        &PendingInfo::new(source_account, amount, Epoch::Epoch0),
    )?;
    ledger.store().frontier().del(txn, hash)?;
    ledger.store().frontier().put(txn, &receive.previous, account)?;
    ledger
        .store()
        .block()
        .set_successor(txn, &receive.previous, BlockHash::ZERO)?;
    Ok(())
}

fn rollback_open(
    ledger: &Ledger,
    txn: &mut RwTxn,
    account: &Account,
    hash: &BlockHash,
    sideband: &BlockSideband,
    open: &OpenBlock,
) -> Result<(), LedgerError> {
    let amount = sideband.balance;
    let source_account = ledger
        .account_of(txn, &open.source)?
        .unwrap_or(Account::BURN);

    ledger.representation_sub(txn, &open.representative, amount)?;
    ledger.store().account().del(txn, account)?;
    ledger.store().block().del(txn, hash)?;
    ledger.store().pending().put(
        txn,
        &PendingKey::new(*account, open.source),
        &PendingInfo::new(source_account, amount, Epoch::Epoch0),
    )?;
    ledger.store().frontier().del(txn, hash)?;
    Ok(())
}

fn rollback_change(
    ledger: &Ledger,
    txn: &mut RwTxn,
    account: &Account,
    info: &AccountInfo,
    hash: &BlockHash,
    change: &ChangeBlock,
) -> Result<(), LedgerError> {
    let previous_rep = ledger.representative_of(txn, &change.previous)?;

    ledger.representation_sub(txn, &change.representative, info.balance)?;
    ledger.representation_add(txn, &previous_rep, info.balance)?;
    ledger.store().account().put(
        txn,
        account,
        &AccountInfo {
            head: change.previous,
            representative: previous_rep,
            modified: Timestamp::now(),
            block_count: info.block_count - 1,
            ..*info
        },
    )?;
    ledger.store().block().del(txn, hash)?;
    ledger.store().frontier().del(txn, hash)?;
    ledger.store().frontier().put(txn, &change.previous, account)?;
    ledger
        .store()
        .block()
        .set_successor(txn, &change.previous, BlockHash::ZERO)?;
    Ok(())
}

fn rollback_state(
    ledger: &Ledger,
    txn: &mut RwTxn,
    account: &Account,
    info: &AccountInfo,
    hash: &BlockHash,
    sideband: &BlockSideband,
    state: &StateBlock,
) -> Result<(), LedgerError> {
    let previous = if state.previous.is_zero() {
        None
    } else {
        Some(
            ledger
                .store()
                .block()
                .get(txn, &state.previous)?
                .ok_or(LedgerError::BlockNotFound(state.previous))?,
        )
    };
    let previous_balance = previous
        .as_ref()
        .map(|(_, sideband)| sideband.balance)
        .unwrap_or(Amount::ZERO);

    // Epoch blocks never touched representation or pendings.
    if !sideband.details.is_epoch {
        ledger.representation_sub(txn, &state.representative, state.balance)?;
        if !state.previous.is_zero() {
            let previous_rep = ledger.representative_of(txn, &state.previous)?;
            ledger.representation_add(txn, &previous_rep, previous_balance)?;
        }

        if sideband.details.is_send {
            reclaim_pending(ledger, txn, &PendingKey::new(state.link.as_account(), *hash))?;
        } else if !state.link.is_zero() {
            let amount = state.balance - previous_balance;
            let source_account = ledger
                .account_of(txn, &state.link)?
                .unwrap_or(Account::BURN);
            ledger.store().pending().put(
                txn,
                &PendingKey::new(*account, state.link),
                &PendingInfo::new(source_account, amount, sideband.source_epoch),
            )?;
        }
    }

    match &previous {
        Some((previous_block, previous_sideband)) => {
            let previous_rep = ledger.representative_of(txn, &state.previous)?;
            ledger.store().account().put(
                txn,
                account,
                &AccountInfo {
                    head: state.previous,
                    representative: previous_rep,
                    open_block: info.open_block,
                    balance: previous_balance,
                    modified: Timestamp::now(),
                    block_count: info.block_count - 1,
                    epoch: previous_sideband.details.epoch,
                },
            )?;
            ledger
                .store()
                .block()
                .set_successor(txn, &state.previous, BlockHash::ZERO)?;
            // A legacy predecessor becomes a frontier head again.
            if !matches!(previous_block, Block::State(_)) {
                ledger
                    .store()
                    .frontier()
                    .put(txn, &state.previous, account)?;
            }
        }
        None => {
            ledger.store().account().del(txn, account)?;
        }
    }
    ledger.store().block().del(txn, hash)?;
    Ok(())
}
