use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{map::HashMap, Address, Bytes, Log, LogData, TxKind, U256};

use crate::{
    constants::BEACON_ROOTS_ADDRESS, BlockContext, EngineFactory, ExecutionConfig,
    ExecutionEngine, ExecutionResult, HaltReason, Message, StateStore, TxContext,
};

use super::MemoryState;

/// Gas charged for a plain transfer.
pub const TRANSFER_GAS: u64 = 21_000;
/// Gas charged for a contract creation.
pub const CREATE_GAS: u64 = 53_000;
/// Length of the EIP-4788 ring buffer.
pub const HISTORY_BUFFER_LENGTH: u64 = 8191;

/// Scripted outcome of calling an address on a [`TestEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    /// Reverts after consuming `gas_used`.
    Revert {
        /// Gas consumed.
        gas_used: u64,
    },
    /// Succeeds after consuming `gas_used`, emitting one log per entry of `logs` from the
    /// called address.
    Emit {
        /// Gas consumed.
        gas_used: u64,
        /// Data of the emitted logs.
        logs: Vec<LogData>,
    },
    /// Halts, consuming the whole gas limit.
    Halt,
    /// Fails with an internal engine error.
    Fail,
}

/// Errors of the [`TestEngine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestEngineError {
    /// The message nonce does not match the sender's account nonce.
    #[error("nonce mismatch for {sender}: have {state}, message {message}")]
    NonceMismatch {
        /// Sender.
        sender: Address,
        /// Nonce in state.
        state: u64,
        /// Nonce of the message.
        message: u64,
    },
    /// The sender cannot pay for gas and value.
    #[error("insufficient funds for {sender}")]
    InsufficientFunds {
        /// Sender.
        sender: Address,
    },
    /// A scripted internal failure.
    #[error("scripted engine failure calling {0}")]
    Scripted(Address),
}

/// An [`ExecutionEngine`] with scripted outcomes instead of an interpreter.
///
/// Calls to an address without a [`Behavior`] are plain transfers costing [`TRANSFER_GAS`].
/// Creations cost [`CREATE_GAS`] and install the message data as runtime code. Calls to the
/// beacon-roots contract store the root the way the EIP-4788 contract does.
#[derive(Debug, Clone, Default)]
pub struct TestEngine {
    block: BlockContext,
    tx: TxContext,
    config: ExecutionConfig,
    behaviors: Arc<HashMap<Address, Behavior>>,
}

impl TestEngine {
    /// The execution config the engine was bound with.
    pub const fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    fn run(
        &self,
        state: &mut MemoryState,
        caller: Address,
        to: Address,
        data: &Bytes,
        gas_limit: u64,
        value: U256,
    ) -> Result<ExecutionResult, TestEngineError> {
        if to == BEACON_ROOTS_ADDRESS {
            let timestamp = self.block.timestamp % HISTORY_BUFFER_LENGTH;
            let slot = U256::from(timestamp);
            state.set_storage(to, slot, U256::from(self.block.timestamp));
            state.set_storage(
                to,
                slot + U256::from(HISTORY_BUFFER_LENGTH),
                U256::from_be_slice(data),
            );
            return Ok(ExecutionResult::Success { gas_used: 0, output: Bytes::new() });
        }

        let (gas_used, logs) = match self.behaviors.get(&to) {
            None => (TRANSFER_GAS, Vec::new()),
            Some(Behavior::Emit { gas_used, logs }) => (*gas_used, logs.clone()),
            Some(Behavior::Revert { gas_used }) => {
                return Ok(ExecutionResult::Revert {
                    gas_used: (*gas_used).min(gas_limit),
                    output: Bytes::new(),
                })
            }
            Some(Behavior::Halt) => return Ok(out_of_gas(gas_limit)),
            Some(Behavior::Fail) => return Err(TestEngineError::Scripted(to)),
        };
        if gas_used > gas_limit {
            return Ok(out_of_gas(gas_limit));
        }

        state.sub_balance(caller, value);
        state.add_balance(to, value);
        for data in logs {
            state.add_log(Log { address: to, data });
        }
        Ok(ExecutionResult::Success { gas_used, output: Bytes::new() })
    }
}

impl ExecutionEngine for TestEngine {
    type State = MemoryState;
    type Error = TestEngineError;

    fn block_context(&self) -> &BlockContext {
        &self.block
    }

    fn tx_context(&self) -> &TxContext {
        &self.tx
    }

    fn set_block_context(&mut self, block: BlockContext, config: &ExecutionConfig) {
        self.block = block;
        self.config = config.clone();
    }

    fn reset(&mut self, tx: TxContext) {
        self.tx = tx;
    }

    fn transact(
        &mut self,
        message: &Message,
        state: &mut MemoryState,
    ) -> Result<ExecutionResult, TestEngineError> {
        let sender = message.from;
        let nonce = state.nonce(sender);
        if nonce != message.nonce {
            return Err(TestEngineError::NonceMismatch {
                sender,
                state: nonce,
                message: message.nonce,
            });
        }
        let gas_cost = U256::from(message.gas_limit) * U256::from(message.gas_price);
        if state.balance(sender) < gas_cost + message.value {
            return Err(TestEngineError::InsufficientFunds { sender });
        }
        state.set_nonce(sender, nonce + 1);

        let result = match message.to {
            TxKind::Create => {
                if CREATE_GAS > message.gas_limit {
                    out_of_gas(message.gas_limit)
                } else {
                    let contract = sender.create(message.nonce);
                    state.create_account(contract);
                    state.set_code(contract, message.data.clone());
                    state.sub_balance(sender, message.value);
                    state.add_balance(contract, message.value);
                    ExecutionResult::Success { gas_used: CREATE_GAS, output: message.data.clone() }
                }
            }
            TxKind::Call(to) => {
                self.run(state, sender, to, &message.data, message.gas_limit, message.value)?
            }
        };

        let gas_used = U256::from(result.gas_used());
        state.sub_balance(sender, gas_used * U256::from(message.gas_price));
        let base_fee = if self.config.no_base_fee { 0 } else { self.block.base_fee.unwrap_or(0) };
        let tip = message.gas_price.saturating_sub(u128::from(base_fee));
        state.add_balance(self.block.coinbase, gas_used * U256::from(tip));
        Ok(result)
    }

    fn call(
        &mut self,
        state: &mut MemoryState,
        caller: Address,
        to: Address,
        data: Bytes,
        gas_limit: u64,
        value: U256,
    ) -> Result<ExecutionResult, TestEngineError> {
        self.run(state, caller, to, &data, gas_limit, value)
    }

    fn clear(&mut self) {
        self.tx = TxContext::default();
    }
}

const fn out_of_gas(gas_limit: u64) -> ExecutionResult {
    ExecutionResult::Halt { reason: HaltReason::OutOfGas, gas_used: gas_limit }
}

/// Builds [`TestEngine`]s sharing one set of scripted behaviors.
#[derive(Debug, Default)]
pub struct TestEngineFactory {
    behaviors: Arc<HashMap<Address, Behavior>>,
    created: AtomicUsize,
}

impl TestEngineFactory {
    /// Scripts the outcome of calling `address`.
    pub fn with_behavior(mut self, address: Address, behavior: Behavior) -> Self {
        Arc::make_mut(&mut self.behaviors).insert(address, behavior);
        self
    }

    /// Number of engines created so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

impl EngineFactory for TestEngineFactory {
    type Engine = TestEngine;

    fn create(&self, block: BlockContext, config: &ExecutionConfig) -> TestEngine {
        self.created.fetch_add(1, Ordering::Relaxed);
        TestEngine {
            block,
            tx: TxContext::default(),
            config: config.clone(),
            behaviors: Arc::clone(&self.behaviors),
        }
    }
}
