use alloy_hardforks::ForkCondition;
use alloy_primitives::{Address, Bytes, U256};
use rstest::rstest;
use state_processor::{ContractUpgrade, DaoFork, ParliaHardfork, StateStore, DAO_REFUND_CONTRACT};

use crate::{cancun, Harness, BLOCK_TIME, RECIPIENT, SENDER};

const VALIDATOR_SET: Address = Address::with_last_byte(0x10);
const STAKE_HUB: Address = Address::with_last_byte(0x20);

fn drain_list() -> Vec<Address> {
    vec![Address::with_last_byte(0xd1), Address::with_last_byte(0xd2)]
}

fn dao_harness(block: u64) -> Harness {
    let spec = cancun().with_dao_fork(DaoFork {
        block,
        beneficiary: DAO_REFUND_CONTRACT,
        drain_list: drain_list(),
    });
    let mut h = Harness::new(spec);
    h.state.fund(drain_list()[0], U256::from(1_000));
    h.state.fund(drain_list()[1], U256::from(234));
    h
}

#[test]
fn test_dao_fork_drains_on_fork_block() {
    let mut h = dao_harness(1);
    let block = h.block(vec![h.txs.legacy(SENDER, 0, Some(RECIPIENT), U256::ZERO, 21_000)]);

    h.process(&block).unwrap();

    assert_eq!(h.state.balance(DAO_REFUND_CONTRACT), U256::from(1_234));
    for account in drain_list() {
        assert_eq!(h.state.balance(account), U256::ZERO);
    }
}

#[test]
fn test_dao_fork_ignored_on_other_blocks() {
    let mut h = dao_harness(2);
    let block = h.block(vec![]);

    h.process(&block).unwrap();

    assert_eq!(h.state.balance(DAO_REFUND_CONTRACT), U256::ZERO);
    assert_eq!(h.state.balance(drain_list()[0]), U256::from(1_000));
}

fn upgrade(address: Address, code: &'static [u8]) -> ContractUpgrade {
    ContractUpgrade { address, code: Bytes::from_static(code) }
}

#[rstest]
#[case::before_feynman(ForkCondition::Never, true)]
#[case::after_feynman(ForkCondition::Timestamp(0), false)]
fn test_block_fork_upgrade(#[case] feynman: ForkCondition, #[case] upgraded: bool) {
    let spec = cancun()
        .with_fork(ParliaHardfork::Luban, ForkCondition::Block(1))
        .with_fork(ParliaHardfork::Feynman, feynman)
        .with_contract_upgrade(ParliaHardfork::Luban, upgrade(VALIDATOR_SET, &[0x60, 0x01]));
    let mut h = Harness::new(spec);
    let block = h.block(vec![]);

    h.process(&block).unwrap();

    let expected = upgraded.then(|| Bytes::from_static(&[0x60, 0x01]));
    assert_eq!(h.state.code(VALIDATOR_SET), expected);
}

#[test]
fn test_time_fork_upgrade_before_feynman() {
    let spec = cancun()
        .with_fork(ParliaHardfork::Kepler, ForkCondition::Timestamp(BLOCK_TIME))
        .with_contract_upgrade(ParliaHardfork::Kepler, upgrade(STAKE_HUB, &[0x60, 0x02]));
    let mut h = Harness::new(spec);
    let block = h.block(vec![]);

    h.process(&block).unwrap();

    assert_eq!(h.state.code(STAKE_HUB), Some(Bytes::from_static(&[0x60, 0x02])));
}

#[test]
fn test_feynman_activation_block_skips_upgrades() {
    // Feynman activates on block 1 itself; from then on the finalizer owns upgrades.
    let spec = cancun()
        .with_fork(ParliaHardfork::Feynman, ForkCondition::Timestamp(BLOCK_TIME))
        .with_contract_upgrade(ParliaHardfork::Feynman, upgrade(STAKE_HUB, &[0x60, 0x03]));
    let mut h = Harness::new(spec);
    let block = h.block(vec![]);

    h.process(&block).unwrap();

    assert_eq!(h.state.code(STAKE_HUB), None);
    assert!(!h.state.exist(STAKE_HUB));
}
