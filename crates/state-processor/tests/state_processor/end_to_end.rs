use alloy_primitives::U256;
use state_processor::{
    test_utils::{Behavior, TestConsensus, TestEngineFactory},
    ChainSpec, StateStore,
};

use crate::{cancun, pre_byzantium, Harness, RECIPIENT, REVERTER, SENDER};

fn transfer_then_revert(spec: ChainSpec) -> Harness {
    Harness::with(
        spec,
        TestEngineFactory::default().with_behavior(REVERTER, Behavior::Revert { gas_used: 50_000 }),
        TestConsensus::default(),
    )
}

#[test]
fn test_byzantium_transfer_and_revert() {
    let mut h = transfer_then_revert(cancun());
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::from(1), 21_000),
        h.txs.legacy(SENDER, 1, Some(REVERTER), U256::from(1), 100_000),
    ]);

    let outcome = h.process(&block).unwrap();

    assert_eq!(outcome.receipts.len(), 2);
    assert!(outcome.receipts[0].success);
    assert_eq!(outcome.receipts[0].gas_used, 21_000);
    assert_eq!(outcome.receipts[0].cumulative_gas_used, 21_000);
    assert!(!outcome.receipts[1].success);
    assert_eq!(outcome.receipts[1].gas_used, 50_000);
    assert_eq!(outcome.receipts[1].cumulative_gas_used, 71_000);
    assert_eq!(outcome.gas_used, 71_000);
    assert!(outcome.receipts.iter().all(|receipt| receipt.post_state.is_none()));

    // the reverted call moves no value but still pays for gas
    assert_eq!(h.state.balance(RECIPIENT), U256::from(1));
    assert_eq!(h.state.balance(REVERTER), U256::ZERO);
    assert_eq!(h.state.nonce(h.sender()), 2);
}

#[test]
fn test_pre_byzantium_receipts_carry_post_state() {
    let mut h = transfer_then_revert(pre_byzantium());
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::from(1), 21_000),
        h.txs.legacy(SENDER, 1, Some(REVERTER), U256::from(1), 100_000),
    ]);

    let outcome = h.process(&block).unwrap();

    assert_eq!(outcome.gas_used, 71_000);
    let roots: Vec<_> =
        outcome.receipts.iter().map(|receipt| receipt.post_state.unwrap()).collect();
    assert_ne!(roots[0], roots[1]);
    // nothing mutates the state after the last transaction
    assert_eq!(roots[1], h.state.root());
    assert!(outcome.receipts[0].success);
    assert!(!outcome.receipts[1].success);
}
