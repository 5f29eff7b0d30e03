//! Interfaces of the consensus engine and chain collaborators.

use alloy_primitives::B256;
use auto_impl::auto_impl;

use crate::{Block, Header, Receipt, Transaction, Withdrawals};

/// Errors reported by a consensus engine.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// The block is invalid under the consensus rules.
    #[error("invalid block: {0}")]
    InvalidBlock(String),
    /// Any other consensus failure.
    #[error(transparent)]
    Other(#[from] Box<dyn core::error::Error + Send + Sync>),
}

/// Read access to the canonical chain.
#[auto_impl(&, Box, Arc)]
pub trait ChainContext {
    /// Returns the block with the given hash, if known.
    fn block_by_hash(&self, hash: B256) -> Option<Block>;
}

/// The privileged-transaction capability of PoSA consensus engines.
///
/// System transactions are not executed in the transaction loop. They are collected and handed
/// to the finalizer, which applies them after every normal transaction.
pub trait SystemTxClassifier {
    /// Returns `true` if `tx` is a system transaction of the block with `header`.
    fn is_system_transaction(
        &self,
        tx: &Transaction,
        header: &Header,
    ) -> Result<bool, ConsensusError>;
}

/// Everything the finalizer may read or amend at the end of a block.
pub struct FinalizeCtx<'a, S> {
    /// The chain the block extends.
    pub chain: &'a dyn ChainContext,
    /// Header of the block.
    pub header: &'a Header,
    /// State after every normal transaction.
    pub state: &'a mut S,
    /// The normal transactions executed by the transaction loop.
    pub txs: &'a mut Vec<Transaction>,
    /// Uncle headers of the block.
    pub uncles: &'a [Header],
    /// Withdrawals of the block, from Shanghai on.
    pub withdrawals: Option<&'a Withdrawals>,
    /// Receipts of `txs`. The finalizer appends the receipts of the transactions it applies.
    pub receipts: &'a mut Vec<Receipt>,
    /// The deferred system transactions.
    pub system_txs: &'a mut Vec<Transaction>,
    /// Gas used so far. The finalizer adds the gas of the transactions it applies.
    pub used_gas: &'a mut u64,
}

impl<S> core::fmt::Debug for FinalizeCtx<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FinalizeCtx")
            .field("number", &self.header.number)
            .field("txs", &self.txs.len())
            .field("receipts", &self.receipts.len())
            .field("system_txs", &self.system_txs.len())
            .field("used_gas", &self.used_gas)
            .finish_non_exhaustive()
    }
}

/// Consensus-specific end-of-block processing.
pub trait ConsensusEngine<S> {
    /// Applies rewards, system transactions and any other consensus bookkeeping.
    fn finalize(&self, ctx: FinalizeCtx<'_, S>) -> Result<(), ConsensusError>;

    /// Returns the system-transaction classifier, if this engine has privileged transactions.
    ///
    /// Engines without one have every transaction executed in the transaction loop.
    fn system_tx_classifier(&self) -> Option<&dyn SystemTxClassifier> {
        None
    }
}
