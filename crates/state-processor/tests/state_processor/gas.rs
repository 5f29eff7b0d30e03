use alloy_primitives::{Bytes, LogData, B256, U256};
use state_processor::{
    test_utils::{Behavior, TestConsensus, TestEngineFactory},
    BlockProcessError, ExecutionConfig, GasPoolError,
};

use crate::{cancun, Harness, EMITTER, RECIPIENT, REVERTER, SENDER};

fn mixed_harness() -> Harness {
    let factory = TestEngineFactory::default()
        .with_behavior(REVERTER, Behavior::Revert { gas_used: 30_000 })
        .with_behavior(
            EMITTER,
            Behavior::Emit {
                gas_used: 45_000,
                logs: vec![LogData::new_unchecked(vec![B256::with_last_byte(1)], Bytes::new())],
            },
        );
    Harness::with(cancun(), factory, TestConsensus::default())
}

#[test]
fn test_cumulative_gas_is_running_prefix_sum() {
    let mut h = mixed_harness();
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(EMITTER), U256::ZERO, 60_000),
        h.txs.eip1559(SENDER, 1, Some(RECIPIENT), U256::from(7), 21_000),
        h.txs.legacy(SENDER, 2, Some(REVERTER), U256::ZERO, 60_000),
        h.txs.legacy(SENDER, 3, Some(EMITTER), U256::ZERO, 60_000),
    ]);

    let outcome = h.process(&block).unwrap();

    let mut running = 0;
    for receipt in &outcome.receipts {
        running += receipt.gas_used;
        assert_eq!(receipt.cumulative_gas_used, running);
    }
    assert_eq!(outcome.gas_used, running);
    assert_eq!(outcome.gas_used, 45_000 + 21_000 + 30_000 + 45_000);
}

#[test]
fn test_block_gas_limit_exceeded() {
    let mut h = mixed_harness();
    let mut header = h.header();
    header.gas_limit = 50_000;
    let block = crate::block(
        header,
        vec![
            h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000),
            h.txs.legacy(SENDER, 1, Some(RECIPIENT), U256::ZERO, 40_000),
        ],
    );
    let second = *block.body.transactions[1].tx_hash();

    let err = h.process(&block).unwrap_err();
    match err {
        BlockProcessError::GasExceeded { index, hash, source } => {
            assert_eq!(index, 1);
            assert_eq!(hash, second);
            assert_eq!(source, GasPoolError { available: 29_000, requested: 40_000 });
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.processor.consensus().records().is_empty());
}

#[test]
fn test_unused_gas_returns_to_pool() {
    let mut h = mixed_harness();
    let mut header = h.header();
    header.gas_limit = 120_000;
    // each reverting call reserves 60k but only burns 30k
    let block = crate::block(
        header,
        vec![
            h.txs.legacy(SENDER, 0, Some(REVERTER), U256::ZERO, 60_000),
            h.txs.legacy(SENDER, 1, Some(REVERTER), U256::ZERO, 60_000),
            h.txs.legacy(SENDER, 2, Some(REVERTER), U256::ZERO, 60_000),
        ],
    );

    let outcome = h.process(&block).unwrap();
    assert_eq!(outcome.gas_used, 90_000);
}

#[test]
fn test_processing_is_deterministic() {
    let h = mixed_harness();
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(EMITTER), U256::ZERO, 60_000),
        h.txs.legacy(SENDER, 1, Some(REVERTER), U256::ZERO, 60_000),
        h.txs.legacy(SENDER, 2, Some(RECIPIENT), U256::from(3), 21_000),
    ]);
    let config = ExecutionConfig::default();

    let mut first = h.state.clone();
    let mut second = h.state.clone();
    let a = h.processor.process(&block, &mut first, &config).unwrap();
    let b = h.processor.process(&block, &mut second, &config).unwrap();

    assert_eq!(a, b);
    assert_eq!(first.root(), second.root());
    // the second run drew the engine of the first from the pool
    assert_eq!(h.processor.engines().factory().created(), 1);
}
