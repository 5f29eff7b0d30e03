//! Integration tests for block processing.

mod apply_transaction;
mod end_to_end;
mod gas;
mod hardforks;
mod receipts;
mod withdrawals;

use std::sync::Arc;

use alloy_consensus::BlockBody;
use alloy_hardforks::{EthereumHardfork, ForkCondition};
use alloy_primitives::{address, Address, B256, U256};
use state_processor::{
    test_utils::{MemoryChain, MemoryState, TestConsensus, TestEngineFactory, TxFactory},
    Block, BlockProcessError, ChainSpec, ExecutionConfig, Header, ProcessOutcome, StateProcessor,
    Transaction,
};

pub(crate) const CHAIN_ID: u64 = 56;
pub(crate) const GAS_LIMIT: u64 = 30_000_000;
pub(crate) const BLOCK_TIME: u64 = 12;

pub(crate) const COINBASE: Address = address!("0x00000000000000000000000000000000000c0ffe");
pub(crate) const RECIPIENT: Address = address!("0x000000000000000000000000000000000000beef");
pub(crate) const REVERTER: Address = address!("0x00000000000000000000000000000000000000de");
pub(crate) const EMITTER: Address = address!("0x00000000000000000000000000000000000000ee");
pub(crate) const SYSTEM_CONTRACT: Address = address!("0x0000000000000000000000000000000000001000");

/// Key of the funded default sender.
pub(crate) const SENDER: u8 = 1;
/// Key of the validator signing system transactions.
pub(crate) const VALIDATOR: u8 = 2;

pub(crate) type Processor = StateProcessor<TestEngineFactory, MemoryChain, TestConsensus>;

/// Every Ethereum fork through Cancun, active from genesis.
pub(crate) fn cancun() -> ChainSpec {
    ChainSpec::cancun(CHAIN_ID)
}

/// Homestead and Spurious Dragon only.
pub(crate) fn pre_byzantium() -> ChainSpec {
    ChainSpec::new(CHAIN_ID)
        .with_fork(EthereumHardfork::Frontier, ForkCondition::Block(0))
        .with_fork(EthereumHardfork::Homestead, ForkCondition::Block(0))
        .with_fork(EthereumHardfork::Tangerine, ForkCondition::Block(0))
        .with_fork(EthereumHardfork::SpuriousDragon, ForkCondition::Block(0))
}

pub(crate) fn one_ether() -> U256 {
    U256::from(10).pow(U256::from(18))
}

pub(crate) fn block(header: Header, transactions: Vec<Transaction>) -> Block {
    Block { header, body: BlockBody { transactions, ommers: vec![], withdrawals: None } }
}

/// A processor on top of a genesis block, with a funded [`SENDER`].
pub(crate) struct Harness {
    pub(crate) processor: Processor,
    pub(crate) parent: B256,
    pub(crate) txs: TxFactory,
    pub(crate) state: MemoryState,
}

impl Harness {
    pub(crate) fn new(spec: ChainSpec) -> Self {
        Self::with(spec, TestEngineFactory::default(), TestConsensus::default())
    }

    pub(crate) fn with(
        spec: ChainSpec,
        factory: TestEngineFactory,
        consensus: TestConsensus,
    ) -> Self {
        let genesis = Header { gas_limit: GAS_LIMIT, ..Default::default() };
        let (chain, parent) = MemoryChain::with_genesis(genesis);
        let txs = TxFactory::new(CHAIN_ID);
        let state = MemoryState::default().with_balance(txs.address(SENDER), one_ether());
        Self {
            processor: StateProcessor::new(Arc::new(spec), chain, consensus, factory),
            parent,
            txs,
            state,
        }
    }

    pub(crate) fn sender(&self) -> Address {
        self.txs.address(SENDER)
    }

    /// Header of block 1 on top of genesis.
    pub(crate) fn header(&self) -> Header {
        Header {
            parent_hash: self.parent,
            number: 1,
            timestamp: BLOCK_TIME,
            gas_limit: GAS_LIMIT,
            beneficiary: COINBASE,
            base_fee_per_gas: Some(1),
            ..Default::default()
        }
    }

    pub(crate) fn block(&self, transactions: Vec<Transaction>) -> Block {
        block(self.header(), transactions)
    }

    pub(crate) fn process(&mut self, block: &Block) -> Result<ProcessOutcome, BlockProcessError> {
        self.processor.process(block, &mut self.state, &ExecutionConfig::default())
    }
}
