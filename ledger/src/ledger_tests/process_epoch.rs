use strand_crypto::sign_message;
use strand_types::{Amount, Epoch};

use super::helpers::{account_of, test_key, LedgerContext};
use crate::process::ProcessCode;

/// Open an account with `balance` via a state send + state open.
fn open_account(ctx: &LedgerContext, key_byte: u8, balance: u128) -> strand_types::Account {
    let genesis_key = ctx.genesis_key();
    let key = test_key(key_byte);
    let genesis_balance = ctx.balance(&ctx.genesis_account());
    let send = ctx.state_send(
        &genesis_key,
        account_of(&key),
        genesis_balance - Amount::new(balance),
    );
    assert_eq!(ctx.process(&send).code, ProcessCode::Progress);
    let open = ctx.state_open(&key, account_of(&key), send.hash(), Amount::new(balance));
    assert_eq!(ctx.process(&open).code, ProcessCode::Progress);
    account_of(&key)
}

#[test]
fn epoch_upgrade_preserves_balance_and_representation() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    let before = ctx.account_info(&account).unwrap();
    let epoch = ctx.epoch_block(&account, Epoch::Epoch1);
    let result = ctx.process(&epoch);
    assert_eq!(result.code, ProcessCode::Progress);
    assert_eq!(result.amount, Some(Amount::ZERO));

    let after = ctx.account_info(&account).unwrap();
    assert_eq!(after.epoch, Epoch::Epoch1);
    assert_eq!(after.balance, before.balance);
    assert_eq!(after.representative, before.representative);
    assert_eq!(after.block_count, before.block_count + 1);
    assert_eq!(ctx.ledger.weight(&account), Amount::new(1000));
}

#[test]
fn epoch_requires_epoch_signer() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    let mut epoch = ctx.epoch_block(&account, Epoch::Epoch1);
    // Re-sign with the account's own key instead of the epoch signer.
    let hash = epoch.hash();
    epoch.set_signature(sign_message(hash.as_bytes(), &test_key(1).private));
    assert_eq!(ctx.process(&epoch).code, ProcessCode::BadSignature);
}

#[test]
fn epoch_with_balance_delta_is_balance_mismatch() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    let mut epoch = ctx.epoch_block(&account, Epoch::Epoch1);
    if let strand_types::Block::State(ref mut state) = epoch {
        state.balance = Amount::new(999);
    }
    let hash = epoch.hash();
    epoch.set_signature(sign_message(hash.as_bytes(), &ctx.genesis_key().private));
    assert_eq!(ctx.process(&epoch).code, ProcessCode::BalanceMismatch);
    assert_eq!(ctx.account_info(&account).unwrap().epoch, Epoch::Epoch0);
}

#[test]
fn epoch_position_outranks_balance_mismatch() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    // Wrong on both counts: skips a generation AND carries a balance
    // delta. The position error wins.
    let mut epoch = ctx.epoch_block(&account, Epoch::Epoch2);
    if let strand_types::Block::State(ref mut state) = epoch {
        state.balance = Amount::new(999);
    }
    let hash = epoch.hash();
    epoch.set_signature(sign_message(hash.as_bytes(), &ctx.genesis_key().private));
    assert_eq!(ctx.process(&epoch).code, ProcessCode::BlockPosition);
    assert_eq!(ctx.account_info(&account).unwrap().epoch, Epoch::Epoch0);
}

#[test]
fn epoch_cannot_change_representative() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    let mut epoch = ctx.epoch_block(&account, Epoch::Epoch1);
    if let strand_types::Block::State(ref mut state) = epoch {
        state.representative = account_of(&test_key(8));
    }
    let hash = epoch.hash();
    epoch.set_signature(sign_message(hash.as_bytes(), &ctx.genesis_key().private));
    assert_eq!(ctx.process(&epoch).code, ProcessCode::RepresentativeMismatch);
}

#[test]
fn epoch_two_requires_epoch_one_first() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    let skip = ctx.epoch_block(&account, Epoch::Epoch2);
    assert_eq!(ctx.process(&skip).code, ProcessCode::BlockPosition);

    assert_eq!(
        ctx.process(&ctx.epoch_block(&account, Epoch::Epoch1)).code,
        ProcessCode::Progress
    );
    assert_eq!(
        ctx.process(&ctx.epoch_block(&account, Epoch::Epoch2)).code,
        ProcessCode::Progress
    );
    assert_eq!(ctx.account_info(&account).unwrap().epoch, Epoch::Epoch2);
}

#[test]
fn epoch_replay_is_old() {
    let ctx = LedgerContext::new();
    let account = open_account(&ctx, 1, 1000);

    let epoch = ctx.epoch_block(&account, Epoch::Epoch1);
    assert_eq!(ctx.process(&epoch).code, ProcessCode::Progress);
    assert_eq!(ctx.process(&epoch).code, ProcessCode::Old);
}

#[test]
fn legacy_receive_cannot_consume_epoch_marked_pending() {
    let ctx = LedgerContext::new();
    let sender = open_account(&ctx, 1, 5000);
    let receiver = test_key(2);

    // Upgrade the sender, then send: the pending entry carries epoch 1.
    assert_eq!(
        ctx.process(&ctx.epoch_block(&sender, Epoch::Epoch1)).code,
        ProcessCode::Progress
    );
    let send = ctx.state_send(&test_key(1), account_of(&receiver), Amount::new(4000));
    let send_hash = send.hash();
    assert_eq!(ctx.process(&send).code, ProcessCode::Progress);
    assert_eq!(
        ctx.pending(&account_of(&receiver), &send_hash).unwrap().epoch,
        Epoch::Epoch1
    );

    // A legacy open cannot claim it.
    let open = ctx.legacy_open(&receiver, send_hash, account_of(&receiver));
    assert_eq!(ctx.process(&open).code, ProcessCode::Unreceivable);
}

#[test]
fn state_receive_inherits_pending_epoch() {
    let ctx = LedgerContext::new();
    let sender = open_account(&ctx, 1, 5000);
    let receiver = test_key(2);

    assert_eq!(
        ctx.process(&ctx.epoch_block(&sender, Epoch::Epoch1)).code,
        ProcessCode::Progress
    );
    let send = ctx.state_send(&test_key(1), account_of(&receiver), Amount::new(4000));
    let send_hash = send.hash();
    ctx.process(&send);

    // The state open consumes the epoch-1 pending: the new account starts
    // at epoch 1 and the sideband records the source epoch.
    let open = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send_hash,
        Amount::new(1000),
    );
    let open_hash = open.hash();
    assert_eq!(ctx.process(&open).code, ProcessCode::Progress);
    assert_eq!(
        ctx.account_info(&account_of(&receiver)).unwrap().epoch,
        Epoch::Epoch1
    );

    let rtxn = ctx.store.read_txn().unwrap();
    let (_, sideband) = ctx.store.block().get(&rtxn, &open_hash).unwrap().unwrap();
    assert_eq!(sideband.source_epoch, Epoch::Epoch1);
    assert_eq!(sideband.details.epoch, Epoch::Epoch1);
}

#[test]
fn epoch_open_of_unopened_account() {
    let ctx = LedgerContext::new();
    let target = account_of(&test_key(3));

    let epoch = ctx.epoch_block(&target, Epoch::Epoch1);
    assert_eq!(ctx.process(&epoch).code, ProcessCode::Progress);

    let info = ctx.account_info(&target).unwrap();
    assert_eq!(info.balance, Amount::ZERO);
    assert_eq!(info.block_count, 1);
    assert_eq!(info.epoch, Epoch::Epoch1);
    // No value moved, no representation created.
    assert_eq!(ctx.ledger.weight(&target), Amount::ZERO);
}
