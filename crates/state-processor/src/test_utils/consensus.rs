use std::collections::BTreeSet;

use alloy_consensus::Transaction as _;
use alloy_primitives::{map::HashMap, Address, B256, U256};
use parking_lot::Mutex;

use crate::{
    Block, ChainContext, ConsensusEngine, ConsensusError, FinalizeCtx, Header, StateStore,
    SystemTxClassifier, Transaction,
};

/// What a [`TestConsensus`] saw when finalizing a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeRecord {
    /// Number of the finalized block.
    pub number: u64,
    /// Hashes of the normal transactions.
    pub txs: Vec<B256>,
    /// Hashes of the system transactions.
    pub system_txs: Vec<B256>,
    /// Number of receipts handed over.
    pub receipts: usize,
    /// Gas used handed over.
    pub used_gas: u64,
}

/// A consensus engine for tests.
///
/// Transactions calling one of the configured system contracts are system transactions.
/// Finalization credits the block reward to the beneficiary and records what it was given.
#[derive(Debug, Default)]
pub struct TestConsensus {
    system_contracts: BTreeSet<Address>,
    reward: U256,
    fail_finalize: bool,
    records: Mutex<Vec<FinalizeRecord>>,
}

impl TestConsensus {
    /// A PoSA-style engine treating calls to `contracts` as system transactions.
    pub fn posa(contracts: impl IntoIterator<Item = Address>) -> Self {
        Self { system_contracts: contracts.into_iter().collect(), ..Default::default() }
    }

    /// Credits `reward` to the beneficiary of every finalized block.
    pub fn with_reward(mut self, reward: U256) -> Self {
        self.reward = reward;
        self
    }

    /// Makes every finalization fail.
    pub fn failing(mut self) -> Self {
        self.fail_finalize = true;
        self
    }

    /// Blocks finalized so far.
    pub fn records(&self) -> Vec<FinalizeRecord> {
        self.records.lock().clone()
    }
}

impl SystemTxClassifier for TestConsensus {
    fn is_system_transaction(
        &self,
        tx: &Transaction,
        _header: &Header,
    ) -> Result<bool, ConsensusError> {
        Ok(tx.to().is_some_and(|to| self.system_contracts.contains(&to)))
    }
}

impl<S: StateStore> ConsensusEngine<S> for TestConsensus {
    fn finalize(&self, ctx: FinalizeCtx<'_, S>) -> Result<(), ConsensusError> {
        self.records.lock().push(FinalizeRecord {
            number: ctx.header.number,
            txs: ctx.txs.iter().map(|tx| *tx.tx_hash()).collect(),
            system_txs: ctx.system_txs.iter().map(|tx| *tx.tx_hash()).collect(),
            receipts: ctx.receipts.len(),
            used_gas: *ctx.used_gas,
        });
        if self.fail_finalize {
            return Err(ConsensusError::InvalidBlock("scripted finalize failure".to_string()));
        }
        if !self.reward.is_zero() {
            ctx.state.add_balance(ctx.header.beneficiary, self.reward);
        }
        Ok(())
    }

    fn system_tx_classifier(&self) -> Option<&dyn SystemTxClassifier> {
        (!self.system_contracts.is_empty()).then_some(self as &dyn SystemTxClassifier)
    }
}

/// A [`ChainContext`] over an in-memory set of blocks.
#[derive(Debug, Clone, Default)]
pub struct MemoryChain {
    blocks: HashMap<B256, Block>,
}

impl MemoryChain {
    /// Adds `block` and returns its hash.
    pub fn insert(&mut self, block: Block) -> B256 {
        let hash = block.header.hash_slow();
        self.blocks.insert(hash, block);
        hash
    }

    /// Creates a chain holding only `genesis`, returning it with the genesis hash.
    pub fn with_genesis(genesis: Header) -> (Self, B256) {
        let mut chain = Self::default();
        let hash = chain.insert(Block { header: genesis, body: Default::default() });
        (chain, hash)
    }
}

impl ChainContext for MemoryChain {
    fn block_by_hash(&self, hash: B256) -> Option<Block> {
        self.blocks.get(&hash).cloned()
    }
}
