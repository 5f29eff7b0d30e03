//! The seam between block processing and the EVM interpreter.
//!
//! The interpreter itself is an external collaborator. [`ExecutionEngine`] is the only point of
//! contact with it: the processor hands it a block context once, a fresh [`TxContext`] before
//! every transaction, and a [`Message`] to execute.

use alloy_primitives::{Address, Bytes, U256};

use crate::{Message, StateStore};

mod context;
pub use context::*;

mod pool;
pub use pool::*;

/// Why execution halted without reverting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// Ran out of gas.
    OutOfGas,
    /// Hit an invalid or undefined opcode.
    InvalidOpcode,
    /// Exceeded the call depth or stack limit.
    StackOverflow,
    /// Any other exceptional halt.
    Other(String),
}

/// Result of executing a message that was valid to include in the block.
///
/// Reverts and halts are normal outcomes here: they still consume gas and produce a failed
/// receipt. Only errors returned by the engine invalidate the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Execution finished successfully.
    Success {
        /// Gas consumed after refunds.
        gas_used: u64,
        /// Return data, or the deployed code for creations.
        output: Bytes,
    },
    /// Execution reverted with `REVERT`.
    Revert {
        /// Gas consumed.
        gas_used: u64,
        /// Revert data.
        output: Bytes,
    },
    /// Execution halted exceptionally.
    Halt {
        /// Why execution halted.
        reason: HaltReason,
        /// Gas consumed, usually the full gas limit.
        gas_used: u64,
    },
}

impl ExecutionResult {
    /// Returns `true` if execution succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Gas consumed by the execution.
    pub const fn gas_used(&self) -> u64 {
        match self {
            Self::Success { gas_used, .. } |
            Self::Revert { gas_used, .. } |
            Self::Halt { gas_used, .. } => *gas_used,
        }
    }

    /// Return or revert data, empty for halts.
    pub fn output(&self) -> &Bytes {
        static EMPTY: Bytes = Bytes::new();
        match self {
            Self::Success { output, .. } | Self::Revert { output, .. } => output,
            Self::Halt { .. } => &EMPTY,
        }
    }
}

/// An EVM instance bound to one block.
///
/// The engine is reset with a new [`TxContext`] before every transaction rather than rebuilt.
/// Implementations own the full message-level state transition: nonce and balance checks, gas
/// purchase, execution, refund and fee payment.
pub trait ExecutionEngine {
    /// The state the engine executes against.
    type State: StateStore;
    /// Internal engine failure. Never used for reverts or halts.
    type Error: core::error::Error + Send + Sync + 'static;

    /// The block context the engine is bound to.
    fn block_context(&self) -> &BlockContext;

    /// The context of the transaction currently being executed.
    fn tx_context(&self) -> &TxContext;

    /// Rebinds the engine to another block.
    fn set_block_context(&mut self, block: BlockContext, config: &ExecutionConfig);

    /// Replaces the per-transaction context.
    fn reset(&mut self, tx: TxContext);

    /// Applies `message` to `state`.
    fn transact(
        &mut self,
        message: &Message,
        state: &mut Self::State,
    ) -> Result<ExecutionResult, Self::Error>;

    /// Runs a raw call frame without any of the transaction-level checks or fee handling.
    fn call(
        &mut self,
        state: &mut Self::State,
        caller: Address,
        to: Address,
        data: Bytes,
        gas_limit: u64,
        value: U256,
    ) -> Result<ExecutionResult, Self::Error>;

    /// Drops every per-block and per-transaction cache, ready for reuse by an unrelated caller.
    fn clear(&mut self);
}

/// Builds [`ExecutionEngine`]s.
pub trait EngineFactory {
    /// The engine type produced.
    type Engine: ExecutionEngine;

    /// Creates an engine bound to `block`.
    fn create(&self, block: BlockContext, config: &ExecutionConfig) -> Self::Engine;
}

/// The state type the engines of factory `F` execute against.
pub type EngineState<F> = <<F as EngineFactory>::Engine as ExecutionEngine>::State;

/// The error type of the engines of factory `F`.
pub type EngineError<F> = <<F as EngineFactory>::Engine as ExecutionEngine>::Error;
