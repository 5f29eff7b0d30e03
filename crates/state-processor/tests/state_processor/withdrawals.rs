use alloy_eips::eip4895::{Withdrawal, Withdrawals};
use alloy_hardforks::EthereumHardfork;
use alloy_primitives::U256;
use state_processor::{BlockProcessError, ChainSpec};

use crate::{cancun, Harness, RECIPIENT, SENDER};

fn withdrawals() -> Withdrawals {
    Withdrawals::new(vec![Withdrawal {
        index: 0,
        validator_index: 7,
        address: RECIPIENT,
        amount: 1_000,
    }])
}

fn pre_shanghai() -> ChainSpec {
    cancun().without_fork(EthereumHardfork::Cancun).without_fork(EthereumHardfork::Shanghai)
}

#[test]
fn test_withdrawals_rejected_before_shanghai() {
    let mut h = Harness::new(pre_shanghai());
    let mut block = h.block(vec![h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000)]);
    block.body.withdrawals = Some(withdrawals());

    let err = h.process(&block).unwrap_err();
    assert!(matches!(err, BlockProcessError::WithdrawalsBeforeShanghai));
    assert_eq!(err.to_string(), "withdrawals before shanghai");
    assert!(h.processor.consensus().records().is_empty());
}

#[test]
fn test_empty_withdrawals_allowed_before_shanghai() {
    let mut h = Harness::new(pre_shanghai());
    let mut block = h.block(vec![]);
    block.body.withdrawals = Some(Withdrawals::default());

    h.process(&block).unwrap();
    assert_eq!(h.processor.consensus().records().len(), 1);
}

#[test]
fn test_withdrawals_accepted_from_shanghai() {
    let mut h = Harness::new(cancun());
    let mut block = h.block(vec![]);
    block.body.withdrawals = Some(withdrawals());

    let outcome = h.process(&block).unwrap();
    assert!(outcome.receipts.is_empty());
    assert_eq!(h.processor.consensus().records().len(), 1);
}
