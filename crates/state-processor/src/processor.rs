use std::sync::Arc;

use alloy_consensus::{Transaction as _, TxType};
use alloy_primitives::{Address, B256};
use tracing::{debug, trace};

use crate::{
    apply_dao_hard_fork,
    constants::{DATA_GAS_PER_BLOB, EXPECTED_SYSTEM_TXS, LOG_TARGET},
    inject_beacon_root, upgrade_system_contracts, ApplyTxError, AsyncReceiptBloomGenerator, Block,
    BlockContext, BlockProcessError, BloomFn, ChainContext, ChainSpec, ConsensusEngine,
    EngineFactory, EnginePool, EngineState, ExecutionConfig, ExecutionEngine, FinalizeCtx, GasPool,
    Header, Message, Receipt, ReceiptProcessor, Rules, Signer, StateStore, Transaction, TxContext,
    TxLog,
};

/// Result of processing a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// One receipt per executed transaction, including those appended by the finalizer.
    pub receipts: Vec<Receipt>,
    /// Logs of all receipts, in receipt order.
    pub logs: Vec<TxLog>,
    /// Total gas used by the block.
    pub gas_used: u64,
}

/// The block-level state transition function.
///
/// Takes a block and the state of its parent, and executes the block's transactions on that
/// state. The processor:
///
/// - resolves the active [`Rules`] once per block,
/// - applies the DAO fork and built-in system-contract upgrades when due,
/// - injects the parent beacon root before any transaction,
/// - executes normal transactions sequentially under a shared [`GasPool`], deferring system
///   transactions to the consensus finalizer,
/// - builds fork-dependent [`Receipt`]s whose blooms are derived off the execution path,
/// - and hands the block to the [`ConsensusEngine`] for finalization.
///
/// Execution engines are drawn from an [`EnginePool`] shared by every call on this processor.
///
/// # Generic Parameters
///
/// - `F`: The factory producing execution engines
/// - `C`: The chain context used to look up parent blocks
/// - `K`: The consensus engine finalizing blocks
pub struct StateProcessor<F: EngineFactory, C, K> {
    spec: Arc<ChainSpec>,
    chain: C,
    consensus: K,
    engines: EnginePool<F>,
    bloom_fn: Option<BloomFn>,
}

impl<F: EngineFactory, C, K> core::fmt::Debug for StateProcessor<F, C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateProcessor")
            .field("chain_id", &self.spec.chain_id())
            .field("engines", &self.engines)
            .finish_non_exhaustive()
    }
}

impl<F, C, K> StateProcessor<F, C, K>
where
    F: EngineFactory,
    C: ChainContext,
    K: ConsensusEngine<EngineState<F>>,
{
    /// Creates a new processor.
    pub fn new(spec: Arc<ChainSpec>, chain: C, consensus: K, factory: F) -> Self {
        Self::with_engine_pool(spec, chain, consensus, EnginePool::new(factory))
    }

    /// Creates a new processor drawing engines from `engines`.
    pub const fn with_engine_pool(
        spec: Arc<ChainSpec>,
        chain: C,
        consensus: K,
        engines: EnginePool<F>,
    ) -> Self {
        Self { spec, chain, consensus, engines, bloom_fn: None }
    }

    /// Replaces the bloom derivation run by the receipt worker.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_bloom_fn(mut self, bloom: BloomFn) -> Self {
        self.bloom_fn = Some(bloom);
        self
    }

    /// The chain specification.
    pub fn chain_spec(&self) -> &ChainSpec {
        &self.spec
    }

    /// The consensus engine.
    pub const fn consensus(&self) -> &K {
        &self.consensus
    }

    /// The engine pool.
    pub const fn engines(&self) -> &EnginePool<F> {
        &self.engines
    }

    /// Processes `block` on top of `state`, which must be the state of the block's parent.
    ///
    /// On success `state` holds the post-block state. On error the block is invalid and `state`
    /// is left partially mutated: the caller must discard it.
    pub fn process(
        &self,
        block: &Block,
        state: &mut EngineState<F>,
        config: &ExecutionConfig,
    ) -> Result<ProcessOutcome, BlockProcessError> {
        let header = &block.header;
        let number = header.number;
        let parent = self.chain.block_by_hash(header.parent_hash).ok_or(
            BlockProcessError::MissingParent { number, parent_hash: header.parent_hash },
        )?;
        let rules = self.spec.rules(number, header.timestamp);

        if rules.is_dao_fork_block {
            if let Some(dao) = self.spec.dao_fork() {
                apply_dao_hard_fork(state, dao);
            }
        }
        // From Feynman on, the finalizer performs system-contract upgrades.
        if !rules.is_feynman {
            upgrade_system_contracts(
                &self.spec,
                number,
                parent.header.timestamp,
                header.timestamp,
                state,
            );
        }

        let mut engine = self.engines.checkout(BlockContext::new(header, &rules, None), config);
        if let Some(root) = header.parent_beacon_block_root {
            inject_beacon_root(root, &rules, &mut *engine, state);
        }

        let transactions = &block.body.transactions;
        let classifier = self.consensus.system_tx_classifier();
        let signer = Signer::new(rules);
        let block_hash = header.hash_slow();

        let mut gas_pool = GasPool::new(header.gas_limit);
        let mut used_gas = 0u64;
        let mut receipts = Vec::with_capacity(transactions.len());
        let mut common_txs = Vec::with_capacity(transactions.len());
        let mut system_txs = Vec::with_capacity(EXPECTED_SYSTEM_TXS);
        // Dropping the generator on an early return drains its worker.
        let mut bloom_processor = match self.bloom_fn {
            Some(bloom) => AsyncReceiptBloomGenerator::with_bloom_fn(transactions.len(), bloom)?,
            None => AsyncReceiptBloomGenerator::new(transactions.len())?,
        };

        for (index, tx) in transactions.iter().enumerate() {
            let hash = *tx.tx_hash();
            if let Some(classifier) = classifier {
                let is_system = classifier.is_system_transaction(tx, header).map_err(|source| {
                    BlockProcessError::ClassifySystemTx { index, hash, source }
                })?;
                if is_system {
                    system_txs.push(tx.clone());
                    continue;
                }
            }
            if rules.requires_trailing_system_txs() && !system_txs.is_empty() {
                return Err(BlockProcessError::SystemTxOrdering { index, hash });
            }

            let message = Message::from_transaction(tx, &signer, header.base_fee_per_gas)
                .map_err(|source| BlockProcessError::TxConversion { index, hash, source })?;
            state.set_tx_context(hash, index);

            let receipt = apply_message(
                &message,
                tx,
                &rules,
                &mut gas_pool,
                state,
                number,
                block_hash,
                &mut used_gas,
                &mut *engine,
                &mut [&mut bloom_processor as &mut dyn ReceiptProcessor],
            )
            .map_err(|err| BlockProcessError::from_apply(index, hash, err))?;

            common_txs.push(tx.clone());
            receipts.push(receipt);
        }

        let blooms = bloom_processor.close()?;
        for (receipt, bloom) in receipts.iter_mut().zip(blooms) {
            receipt.bloom = bloom;
        }
        drop(engine);

        let withdrawals = block.body.withdrawals.as_ref();
        if withdrawals.is_some_and(|withdrawals| !withdrawals.is_empty()) &&
            !rules.supports_withdrawals()
        {
            return Err(BlockProcessError::WithdrawalsBeforeShanghai);
        }

        let finalized = self.consensus.finalize(FinalizeCtx {
            chain: &self.chain,
            header,
            state,
            txs: &mut common_txs,
            uncles: &block.body.ommers,
            withdrawals,
            receipts: &mut receipts,
            system_txs: &mut system_txs,
            used_gas: &mut used_gas,
        });

        let logs = collect_logs(&receipts);
        if let Err(source) = finalized {
            return Err(BlockProcessError::Finalization {
                source,
                receipts,
                logs,
                gas_used: used_gas,
            });
        }

        debug!(
            target: LOG_TARGET,
            number,
            %block_hash,
            receipts = receipts.len(),
            system_txs = system_txs.len(),
            gas_used = used_gas,
            "Processed block"
        );
        Ok(ProcessOutcome { receipts, logs, gas_used: used_gas })
    }

    /// Applies a single transaction to `state` in the context of `header`.
    ///
    /// This is the building block of incremental block construction: `gas_pool` and `used_gas`
    /// carry over between calls, and the caller sets the transaction context on `state`
    /// beforehand. `author` overrides the header's beneficiary as fee recipient. Every processor
    /// in `processors` is run on the finished receipt.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_transaction(
        &self,
        author: Option<Address>,
        gas_pool: &mut GasPool,
        state: &mut EngineState<F>,
        header: &Header,
        tx: &Transaction,
        used_gas: &mut u64,
        config: &ExecutionConfig,
        processors: &mut [&mut dyn ReceiptProcessor],
    ) -> Result<Receipt, ApplyTxError> {
        let rules = self.spec.rules(header.number, header.timestamp);
        let message = Message::from_transaction(tx, &Signer::new(rules), header.base_fee_per_gas)?;
        let mut engine = self.engines.checkout(BlockContext::new(header, &rules, author), config);
        apply_message(
            &message,
            tx,
            &rules,
            gas_pool,
            state,
            header.number,
            header.hash_slow(),
            used_gas,
            &mut *engine,
            processors,
        )
    }
}

/// Executes `message` and builds the receipt of `tx`.
#[allow(clippy::too_many_arguments)]
fn apply_message<E: ExecutionEngine>(
    message: &Message,
    tx: &Transaction,
    rules: &Rules,
    gas_pool: &mut GasPool,
    state: &mut E::State,
    block_number: u64,
    block_hash: B256,
    used_gas: &mut u64,
    engine: &mut E,
    processors: &mut [&mut dyn ReceiptProcessor],
) -> Result<Receipt, ApplyTxError> {
    engine.reset(TxContext::from(message));
    let revision = state.snapshot();

    gas_pool.sub_gas(message.gas_limit)?;
    let result = match engine.transact(message, state) {
        Ok(result) => result,
        Err(err) => {
            // A rejected message consumes no block gas.
            gas_pool.add_gas(message.gas_limit);
            return Err(ApplyTxError::Execution(Box::new(err)));
        }
    };
    let gas_used = result.gas_used();
    gas_pool.add_gas(message.gas_limit.saturating_sub(gas_used));

    let post_state = if rules.uses_intermediate_root() {
        Some(state.intermediate_root(rules.is_eip158))
    } else {
        state.finalise(true);
        None
    };
    *used_gas += gas_used;

    let tx_hash = *tx.tx_hash();
    let (blob_gas_used, blob_gas_price) = if tx.tx_type() == TxType::Eip4844 {
        (
            Some(message.blob_hashes.len() as u64 * DATA_GAS_PER_BLOB),
            engine.block_context().blob_base_fee,
        )
    } else {
        (None, None)
    };

    let mut receipt = Receipt {
        tx_type: tx.tx_type(),
        success: result.is_success(),
        post_state,
        cumulative_gas_used: *used_gas,
        gas_used,
        logs: state.logs(tx_hash, block_number, block_hash),
        bloom: Default::default(),
        tx_hash,
        contract_address: message.is_create().then(|| message.from.create(tx.nonce())),
        blob_gas_used,
        blob_gas_price,
        block_hash,
        block_number,
        transaction_index: state.tx_index() as u64,
    };
    for processor in processors.iter_mut() {
        processor.apply(&mut receipt);
    }

    trace!(
        target: LOG_TARGET,
        index = receipt.transaction_index,
        %tx_hash,
        revision,
        gas_used,
        success = receipt.success,
        "Applied transaction"
    );
    Ok(receipt)
}

fn collect_logs(receipts: &[Receipt]) -> Vec<TxLog> {
    receipts.iter().flat_map(|receipt| receipt.logs.iter().cloned()).collect()
}
