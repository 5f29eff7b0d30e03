use alloy_consensus::{Eip658Value, TxType};
use alloy_hardforks::{EthereumHardfork, ForkCondition};
use alloy_primitives::{Bloom, Bytes, LogData, B256, U256};
use rstest::rstest;
use state_processor::{
    logs_bloom,
    test_utils::{Behavior, TestConsensus, TestEngineFactory, CREATE_GAS},
    ChainSpec,
};

use crate::{cancun, pre_byzantium, Harness, EMITTER, RECIPIENT, SENDER};

fn log_data(topic: u8) -> LogData {
    LogData::new_unchecked(vec![B256::with_last_byte(topic)], Bytes::copy_from_slice(&[topic]))
}

fn emitter() -> Harness {
    let factory = TestEngineFactory::default().with_behavior(
        EMITTER,
        Behavior::Emit { gas_used: 30_000, logs: vec![log_data(1), log_data(2)] },
    );
    Harness::with(cancun(), factory, TestConsensus::default())
}

#[test]
fn test_logs_are_linked_to_block_and_transaction() {
    let mut h = emitter();
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(EMITTER), U256::ZERO, 50_000),
        h.txs.legacy(SENDER, 1, Some(RECIPIENT), U256::ZERO, 21_000),
        h.txs.legacy(SENDER, 2, Some(EMITTER), U256::ZERO, 50_000),
    ]);
    let block_hash = block.header.hash_slow();

    let outcome = h.process(&block).unwrap();

    let [first, transfer, last] = outcome.receipts.as_slice() else {
        panic!("expected three receipts");
    };
    assert_eq!(first.logs.len(), 2);
    assert!(transfer.logs.is_empty());
    assert_eq!(last.logs.len(), 2);

    let indices: Vec<_> = outcome.logs.iter().map(|log| log.log_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    for log in &outcome.logs {
        assert_eq!(log.block_hash, block_hash);
        assert_eq!(log.block_number, 1);
        assert_eq!(log.address, EMITTER);
    }
    assert_eq!(last.logs[0].tx_index, 2);
    assert_eq!(last.logs[0].tx_hash, last.tx_hash);
    assert_eq!(outcome.logs[3], last.logs[1]);
}

#[test]
fn test_bloom_covers_receipt_logs() {
    let mut h = emitter();
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(EMITTER), U256::ZERO, 50_000),
        h.txs.legacy(SENDER, 1, Some(RECIPIENT), U256::ZERO, 21_000),
    ]);

    let outcome = h.process(&block).unwrap();

    let emitted = &outcome.receipts[0];
    assert_ne!(emitted.bloom, Bloom::ZERO);
    assert_eq!(emitted.bloom, logs_bloom(emitted.raw_logs()));
    assert_eq!(outcome.receipts[1].bloom, Bloom::ZERO);

    let consensus = emitted.to_consensus();
    assert_eq!(consensus.logs_bloom, emitted.bloom);
    assert_eq!(consensus.receipt.status, Eip658Value::Eip658(true));
    assert_eq!(consensus.receipt.logs.len(), 2);
}

#[rstest]
#[case::byzantium(cancun(), false)]
#[case::frontier(pre_byzantium(), true)]
fn test_post_state_by_fork(#[case] spec: ChainSpec, #[case] has_post_state: bool) {
    let mut h = Harness::new(spec);
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000),
        h.txs.legacy(SENDER, 1, Some(RECIPIENT), U256::ZERO, 21_000),
    ]);

    let outcome = h.process(&block).unwrap();

    for receipt in &outcome.receipts {
        assert!(receipt.success);
        assert_eq!(receipt.post_state.is_some(), has_post_state);
        let status = receipt.to_consensus().receipt.status;
        assert_eq!(matches!(status, Eip658Value::PostState(_)), has_post_state);
    }
}

#[test]
fn test_contract_creation_address() {
    let mut h = Harness::new(cancun());
    let sender = h.sender();
    let block = h.block(vec![
        h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000),
        h.txs.eip1559(SENDER, 1, None, U256::ZERO, 100_000),
    ]);

    let outcome = h.process(&block).unwrap();

    assert_eq!(outcome.receipts[0].contract_address, None);
    let created = &outcome.receipts[1];
    assert_eq!(created.tx_type, TxType::Eip1559);
    assert_eq!(created.contract_address, Some(sender.create(1)));
    assert_eq!(created.gas_used, CREATE_GAS);
}

fn prague() -> ChainSpec {
    cancun().with_fork(EthereumHardfork::Prague, ForkCondition::Timestamp(0))
}

#[rstest]
#[case::cancun_at_minimum(cancun(), 0, 1)]
#[case::cancun(cancun(), 10_000_000, 19)]
#[case::prague(prague(), 10_000_000, 7)]
fn test_blob_receipt_fields(
    #[case] spec: ChainSpec,
    #[case] excess_blob_gas: u64,
    #[case] blob_gas_price: u128,
) {
    let mut h = Harness::new(spec);
    let mut header = h.header();
    header.excess_blob_gas = Some(excess_blob_gas);
    header.blob_gas_used = Some(262_144);
    let block = crate::block(header, vec![h.txs.eip4844(SENDER, 0, RECIPIENT, 2, 21_000)]);

    let outcome = h.process(&block).unwrap();

    let receipt = &outcome.receipts[0];
    assert_eq!(receipt.tx_type, TxType::Eip4844);
    assert_eq!(receipt.blob_gas_used, Some(262_144));
    assert_eq!(receipt.blob_gas_price, Some(blob_gas_price));
}

#[test]
fn test_non_blob_receipt_has_no_blob_fields() {
    let mut h = Harness::new(cancun());
    let mut header = h.header();
    header.excess_blob_gas = Some(0);
    let tx = h.txs.eip1559(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000);
    let block = crate::block(header, vec![tx]);

    let outcome = h.process(&block).unwrap();

    assert_eq!(outcome.receipts[0].blob_gas_used, None);
    assert_eq!(outcome.receipts[0].blob_gas_price, None);
}
