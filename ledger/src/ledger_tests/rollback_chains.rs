use strand_types::{Amount, Epoch};

use super::helpers::{account_of, test_key, LedgerContext};
use crate::error::LedgerError;
use crate::process::ProcessCode;

const GENESIS_SUPPLY: u128 = u128::MAX;

/// Snapshot of everything a rollback must restore byte-for-byte.
fn table_fingerprint(ctx: &LedgerContext) -> (u64, u64, u64, u64, Vec<u8>) {
    let rtxn = ctx.store.read_txn().unwrap();
    let accounts = ctx.store.account().iter(&rtxn).unwrap();
    let mut account_bytes = Vec::new();
    for (account, info) in &accounts {
        // `modified` is a local wall-clock stamp, not restored state.
        let mut info = *info;
        info.modified = strand_types::Timestamp::EPOCH;
        account_bytes.extend_from_slice(account.as_bytes());
        account_bytes.extend_from_slice(&info.to_bytes());
    }
    (
        ctx.store.block().count(&rtxn).unwrap(),
        ctx.store.account().count(&rtxn).unwrap(),
        ctx.store.pending().count(&rtxn).unwrap(),
        ctx.store.frontier().count(&rtxn).unwrap(),
        account_bytes,
    )
}

#[test]
fn rollback_send_restores_prior_state() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let genesis = ctx.genesis_account();

    let before = table_fingerprint(&ctx);
    let send = ctx.legacy_send(
        &genesis_key,
        account_of(&test_key(1)),
        Amount::new(GENESIS_SUPPLY - 100),
    );
    let send_hash = send.hash();
    ctx.process(&send);

    let rolled = ctx.rollback(&send_hash).unwrap();
    assert_eq!(rolled.len(), 1);
    assert_eq!(rolled[0].hash(), send_hash);

    assert_eq!(table_fingerprint(&ctx), before);
    assert_eq!(ctx.balance(&genesis), Amount::new(GENESIS_SUPPLY));
    assert_eq!(ctx.ledger.weight(&genesis), Amount::new(GENESIS_SUPPLY));
    assert!(ctx.pending(&account_of(&test_key(1)), &send_hash).is_none());
}

#[test]
fn rollback_receive_recreates_pending() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let receiver = test_key(1);

    let send = ctx.legacy_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 100),
    );
    let send_hash = send.hash();
    ctx.process(&send);
    let open = ctx.legacy_open(&receiver, send_hash, account_of(&receiver));
    ctx.process(&open);

    let send2 = ctx.legacy_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 150),
    );
    let send2_hash = send2.hash();
    ctx.process(&send2);
    let receive = ctx.legacy_receive(&receiver, send2_hash);
    let receive_hash = receive.hash();
    ctx.process(&receive);
    assert_eq!(ctx.balance(&account_of(&receiver)), Amount::new(150));

    ctx.rollback(&receive_hash).unwrap();

    assert_eq!(ctx.balance(&account_of(&receiver)), Amount::new(100));
    let pending = ctx.pending(&account_of(&receiver), &send2_hash).unwrap();
    assert_eq!(pending.amount, Amount::new(50));
    assert_eq!(ctx.ledger.weight(&account_of(&receiver)), Amount::new(100));
}

#[test]
fn rollback_open_deletes_account() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let receiver = test_key(1);

    let send = ctx.legacy_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 100),
    );
    let send_hash = send.hash();
    ctx.process(&send);
    let open = ctx.legacy_open(&receiver, send_hash, account_of(&receiver));
    let open_hash = open.hash();
    ctx.process(&open);

    ctx.rollback(&open_hash).unwrap();

    assert!(ctx.account_info(&account_of(&receiver)).is_none());
    assert!(!ctx.block_exists(&open_hash));
    // The pending entry is receivable again.
    assert_eq!(
        ctx.pending(&account_of(&receiver), &send_hash).unwrap().amount,
        Amount::new(100)
    );
    assert_eq!(ctx.ledger.weight(&account_of(&receiver)), Amount::ZERO);
}

#[test]
fn rollback_change_restores_representation() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let genesis = ctx.genesis_account();
    let new_rep = account_of(&test_key(9));

    let change = ctx.legacy_change(&genesis_key, new_rep);
    let change_hash = change.hash();
    ctx.process(&change);
    assert_eq!(ctx.ledger.weight(&new_rep), Amount::new(GENESIS_SUPPLY));

    ctx.rollback(&change_hash).unwrap();

    assert_eq!(ctx.ledger.weight(&new_rep), Amount::ZERO);
    assert_eq!(ctx.ledger.weight(&genesis), Amount::new(GENESIS_SUPPLY));
    assert_eq!(ctx.account_info(&genesis).unwrap().representative, genesis);
}

#[test]
fn rollback_send_cascades_through_receiver() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let receiver = test_key(1);

    let send = ctx.state_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 500),
    );
    let send_hash = send.hash();
    ctx.process(&send);
    let open = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send_hash,
        Amount::new(500),
    );
    let open_hash = open.hash();
    ctx.process(&open);

    // Rolling back the send must first undo the receiver's open.
    let rolled = ctx.rollback(&send_hash).unwrap();
    let rolled_hashes: Vec<_> = rolled.iter().map(|block| block.hash()).collect();
    assert!(rolled_hashes.contains(&open_hash));
    assert!(rolled_hashes.contains(&send_hash));

    assert!(ctx.account_info(&account_of(&receiver)).is_none());
    assert!(ctx.pending(&account_of(&receiver), &send_hash).is_none());
    assert_eq!(ctx.balance(&ctx.genesis_account()), Amount::new(GENESIS_SUPPLY));
    assert_eq!(
        ctx.ledger.weight(&ctx.genesis_account()),
        Amount::new(GENESIS_SUPPLY)
    );
}

#[test]
fn rollback_buried_block_unwinds_to_it() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();

    let send1 = ctx.state_send(
        &genesis_key,
        account_of(&test_key(1)),
        Amount::new(GENESIS_SUPPLY - 1),
    );
    ctx.process(&send1);
    let send2 = ctx.state_send(
        &genesis_key,
        account_of(&test_key(2)),
        Amount::new(GENESIS_SUPPLY - 2),
    );
    ctx.process(&send2);
    let send3 = ctx.state_send(
        &genesis_key,
        account_of(&test_key(3)),
        Amount::new(GENESIS_SUPPLY - 3),
    );
    ctx.process(&send3);

    let rolled = ctx.rollback(&send2.hash()).unwrap();
    assert_eq!(rolled.len(), 2);
    // Most recent first.
    assert_eq!(rolled[0].hash(), send3.hash());
    assert_eq!(rolled[1].hash(), send2.hash());
    assert!(ctx.block_exists(&send1.hash()));
    assert_eq!(ctx.balance(&ctx.genesis_account()), Amount::new(GENESIS_SUPPLY - 1));
}

#[test]
fn rollback_refuses_cemented_blocks() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let genesis = ctx.genesis_account();

    let send = ctx.state_send(
        &genesis_key,
        account_of(&test_key(1)),
        Amount::new(GENESIS_SUPPLY - 7),
    );
    let send_hash = send.hash();
    ctx.process(&send);
    ctx.cement(&genesis, 2, &send_hash);

    assert!(matches!(
        ctx.rollback(&send_hash),
        Err(LedgerError::RollbackCemented(_))
    ));
    assert!(ctx.block_exists(&send_hash));
}

#[test]
fn rollback_epoch_restores_epoch_zero() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let receiver = test_key(1);

    let send = ctx.state_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 1000),
    );
    ctx.process(&send);
    let open = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send.hash(),
        Amount::new(1000),
    );
    ctx.process(&open);

    let epoch = ctx.epoch_block(&account_of(&receiver), Epoch::Epoch1);
    let epoch_hash = epoch.hash();
    assert_eq!(ctx.process(&epoch).code, ProcessCode::Progress);

    ctx.rollback(&epoch_hash).unwrap();

    let info = ctx.account_info(&account_of(&receiver)).unwrap();
    assert_eq!(info.epoch, Epoch::Epoch0);
    assert_eq!(info.balance, Amount::new(1000));
    assert_eq!(info.head, open.hash());
    // Representation untouched in both directions.
    assert_eq!(ctx.ledger.weight(&account_of(&receiver)), Amount::new(1000));
}
