use alloy_primitives::{Address, U256};
use state_processor::{
    test_utils::{TestEngineError, TxFactory, TRANSFER_GAS},
    ApplyTxError, ExecutionConfig, GasPool, GasPoolError, Receipt, ReceiptBloomGenerator,
    ReceiptProcessor, StateStore, Transaction,
};

use crate::{cancun, Harness, COINBASE, RECIPIENT, SENDER};

fn apply(
    h: &mut Harness,
    author: Option<Address>,
    gas_pool: &mut GasPool,
    used_gas: &mut u64,
    index: usize,
    tx: &Transaction,
) -> Result<Receipt, ApplyTxError> {
    let header = h.header();
    let mut bloom = ReceiptBloomGenerator;
    h.state.set_tx_context(*tx.tx_hash(), index);
    h.processor.apply_transaction(
        author,
        gas_pool,
        &mut h.state,
        &header,
        tx,
        used_gas,
        &ExecutionConfig::default(),
        &mut [&mut bloom as &mut dyn ReceiptProcessor],
    )
}

#[test]
fn test_sequential_applies_share_gas_accounting() {
    let mut h = Harness::new(cancun());
    let txs = [
        h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::from(1), 50_000),
        h.txs.eip1559(SENDER, 1, Some(RECIPIENT), U256::from(2), 50_000),
    ];
    let mut gas_pool = GasPool::new(100_000);
    let mut used_gas = 0;

    let first = apply(&mut h, None, &mut gas_pool, &mut used_gas, 0, &txs[0]).unwrap();
    assert_eq!(first.cumulative_gas_used, TRANSFER_GAS);
    assert_eq!(gas_pool.gas(), 100_000 - TRANSFER_GAS);

    let second = apply(&mut h, None, &mut gas_pool, &mut used_gas, 1, &txs[1]).unwrap();
    assert_eq!(second.cumulative_gas_used, 2 * TRANSFER_GAS);
    assert_eq!(second.transaction_index, 1);
    assert_eq!(used_gas, 2 * TRANSFER_GAS);
    assert_eq!(gas_pool.gas(), 100_000 - 2 * TRANSFER_GAS);
    assert_eq!(h.state.balance(RECIPIENT), U256::from(3));
}

#[test]
fn test_gas_exceeded_leaves_counters_untouched() {
    let mut h = Harness::new(cancun());
    let tx = h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 50_000);
    let mut gas_pool = GasPool::new(40_000);
    let mut used_gas = 7;

    let err = apply(&mut h, None, &mut gas_pool, &mut used_gas, 0, &tx).unwrap_err();
    assert!(matches!(
        err,
        ApplyTxError::GasExceeded(GasPoolError { available: 40_000, requested: 50_000 })
    ));
    assert_eq!(gas_pool.gas(), 40_000);
    assert_eq!(used_gas, 7);
    assert_eq!(h.state.nonce(h.sender()), 0);
}

#[test]
fn test_author_receives_fees() {
    let mut h = Harness::new(cancun());
    let author = Address::with_last_byte(0xa0);
    let tx = h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000);
    let mut gas_pool = GasPool::new(100_000);
    let mut used_gas = 0;

    apply(&mut h, Some(author), &mut gas_pool, &mut used_gas, 0, &tx).unwrap();

    // legacy gas price 10 over a base fee of 1
    let tip = (TxFactory::GAS_PRICE - 1) as u64 * TRANSFER_GAS;
    assert_eq!(h.state.balance(author), U256::from(tip));
    assert_eq!(h.state.balance(COINBASE), U256::ZERO);
}

#[test]
fn test_engine_error_is_reported() {
    let mut h = Harness::new(cancun());
    let tx = h.txs.legacy(SENDER, 3, Some(RECIPIENT), U256::ZERO, 21_000);
    let mut gas_pool = GasPool::new(100_000);
    let mut used_gas = 0;

    let err = apply(&mut h, None, &mut gas_pool, &mut used_gas, 0, &tx).unwrap_err();
    let ApplyTxError::Execution(source) = err else {
        panic!("expected an execution error");
    };
    assert!(matches!(
        source.downcast_ref::<TestEngineError>(),
        Some(TestEngineError::NonceMismatch { message: 3, .. })
    ));
    assert_eq!(used_gas, 0);
    assert_eq!(gas_pool.gas(), 100_000);
}
