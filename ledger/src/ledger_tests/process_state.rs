use strand_types::{Amount, BlockHash};

use super::helpers::{account_of, test_key, LedgerContext};
use crate::process::ProcessCode;

const GENESIS_SUPPLY: u128 = u128::MAX;

#[test]
fn state_send_and_open() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let genesis = ctx.genesis_account();
    let receiver = test_key(1);

    let send = ctx.state_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 4000),
    );
    let send_hash = send.hash();
    let result = ctx.process(&send);
    assert_eq!(result.code, ProcessCode::Progress);
    assert_eq!(result.amount, Some(Amount::new(4000)));
    assert_eq!(result.pending_account, Some(account_of(&receiver)));

    let open = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send_hash,
        Amount::new(4000),
    );
    let result = ctx.process(&open);
    assert_eq!(result.code, ProcessCode::Progress);

    assert!(ctx.pending(&account_of(&receiver), &send_hash).is_none());
    assert_eq!(ctx.balance(&account_of(&receiver)), Amount::new(4000));
    assert_eq!(ctx.ledger.weight(&genesis), Amount::new(GENESIS_SUPPLY - 4000));
    assert_eq!(ctx.ledger.weight(&account_of(&receiver)), Amount::new(4000));
    // State heads carry no frontier entry.
    let rtxn = ctx.store.read_txn().unwrap();
    assert_eq!(ctx.store.frontier().get(&rtxn, &send_hash).unwrap(), None);
}

#[test]
fn state_open_requires_nonzero_link() {
    let ctx = LedgerContext::new();
    let receiver = test_key(1);
    let open = ctx.state_open(
        &receiver,
        account_of(&receiver),
        BlockHash::ZERO,
        Amount::ZERO,
    );
    assert_eq!(ctx.process(&open).code, ProcessCode::GapSource);
}

#[test]
fn state_receive_wrong_amount_is_balance_mismatch() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let receiver = test_key(1);

    let send = ctx.state_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 100),
    );
    let send_hash = send.hash();
    ctx.process(&send);

    // Claims 150 but the pending is 100.
    let open = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send_hash,
        Amount::new(150),
    );
    assert_eq!(ctx.process(&open).code, ProcessCode::BalanceMismatch);
    assert!(ctx.pending(&account_of(&receiver), &send_hash).is_some());
}

#[test]
fn state_change_subkind() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let genesis = ctx.genesis_account();
    let new_rep = account_of(&test_key(5));

    let change = ctx.state_change(&genesis_key, new_rep);
    let result = ctx.process(&change);
    assert_eq!(result.code, ProcessCode::Progress);
    assert_eq!(result.amount, Some(Amount::ZERO));

    assert_eq!(ctx.ledger.weight(&genesis), Amount::ZERO);
    assert_eq!(ctx.ledger.weight(&new_rep), Amount::new(GENESIS_SUPPLY));
}

#[test]
fn state_fork_same_slot() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();

    let send_a = ctx.state_send(
        &genesis_key,
        account_of(&test_key(1)),
        Amount::new(GENESIS_SUPPLY - 1),
    );
    let send_b = ctx.state_send(
        &genesis_key,
        account_of(&test_key(2)),
        Amount::new(GENESIS_SUPPLY - 2),
    );
    assert_eq!(ctx.process(&send_a).code, ProcessCode::Progress);
    assert_eq!(ctx.process(&send_b).code, ProcessCode::Fork);
}

#[test]
fn state_head_blocks_legacy_extension() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();

    // Upgrade the genesis chain to a state head.
    let change = ctx.state_change(&genesis_key, ctx.genesis_account());
    assert_eq!(ctx.process(&change).code, ProcessCode::Progress);

    // A legacy send on a state head is out of position.
    let send = ctx.legacy_send(
        &genesis_key,
        account_of(&test_key(1)),
        Amount::new(GENESIS_SUPPLY - 1),
    );
    assert_eq!(ctx.process(&send).code, ProcessCode::BlockPosition);
}

#[test]
fn state_block_on_legacy_chain_clears_frontier() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let genesis = ctx.genesis_account();

    let legacy_head = ctx.account_info(&genesis).unwrap().head;
    let change = ctx.state_change(&genesis_key, genesis);
    assert_eq!(ctx.process(&change).code, ProcessCode::Progress);

    let rtxn = ctx.store.read_txn().unwrap();
    assert_eq!(ctx.store.frontier().get(&rtxn, &legacy_head).unwrap(), None);
    assert_eq!(
        ctx.store.frontier().get(&rtxn, &change.hash()).unwrap(),
        None
    );
}

#[test]
fn second_open_is_fork() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let receiver = test_key(1);

    let send_a = ctx.state_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 10),
    );
    ctx.process(&send_a);
    let send_b = ctx.state_send(
        &genesis_key,
        account_of(&receiver),
        Amount::new(GENESIS_SUPPLY - 30),
    );
    ctx.process(&send_b);

    let open_a = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send_a.hash(),
        Amount::new(10),
    );
    assert_eq!(ctx.process(&open_a).code, ProcessCode::Progress);

    // A second zero-previous block for the same account contends for the
    // open slot.
    let open_b = ctx.state_open(
        &receiver,
        account_of(&receiver),
        send_b.hash(),
        Amount::new(20),
    );
    assert_eq!(ctx.process(&open_b).code, ProcessCode::Fork);
}

#[test]
fn representation_equals_sum_of_delegated_balances() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();
    let alice = test_key(1);
    let bob = test_key(2);
    let rep = account_of(&test_key(9));

    // Open two accounts, then delegate one of them to a third party.
    let send_a = ctx.state_send(
        &genesis_key,
        account_of(&alice),
        Amount::new(GENESIS_SUPPLY - 300),
    );
    ctx.process(&send_a);
    ctx.process(&ctx.state_open(&alice, account_of(&alice), send_a.hash(), Amount::new(300)));
    let send_b = ctx.state_send(
        &genesis_key,
        account_of(&bob),
        Amount::new(GENESIS_SUPPLY - 800),
    );
    ctx.process(&send_b);
    ctx.process(&ctx.state_open(&bob, account_of(&bob), send_b.hash(), Amount::new(500)));
    ctx.process(&ctx.state_change(&bob, rep));

    // Cache, persisted table and a fresh sum over accounts all agree.
    let rtxn = ctx.store.read_txn().unwrap();
    let mut sums: std::collections::HashMap<_, u128> = std::collections::HashMap::new();
    for (_, info) in ctx.store.account().iter(&rtxn).unwrap() {
        *sums.entry(info.representative).or_insert(0) += info.balance.raw();
    }
    for (representative, expected) in sums {
        assert_eq!(ctx.ledger.weight(&representative).raw(), expected);
        assert_eq!(
            ctx.store
                .rep_weight()
                .get(&rtxn, &representative)
                .unwrap()
                .raw(),
            expected
        );
    }
    assert_eq!(ctx.ledger.weight(&rep), Amount::new(500));
}

#[test]
fn sideband_records_height_and_balance() {
    let ctx = LedgerContext::new();
    let genesis_key = ctx.genesis_key();

    let send = ctx.state_send(
        &genesis_key,
        account_of(&test_key(1)),
        Amount::new(GENESIS_SUPPLY - 9),
    );
    let send_hash = send.hash();
    ctx.process(&send);

    let rtxn = ctx.store.read_txn().unwrap();
    let (_, sideband) = ctx.store.block().get(&rtxn, &send_hash).unwrap().unwrap();
    assert_eq!(sideband.height, 2);
    assert_eq!(sideband.balance, Amount::new(GENESIS_SUPPLY - 9));
    assert!(sideband.details.is_send);
    assert!(!sideband.details.is_receive);
    assert_eq!(sideband.account, ctx.genesis_account());

    // The genesis open now records its successor.
    let open_hash = ctx.account_info(&ctx.genesis_account()).unwrap().open_block;
    let (_, open_sideband) = ctx.store.block().get(&rtxn, &open_hash).unwrap().unwrap();
    assert_eq!(open_sideband.successor, send_hash);
}
