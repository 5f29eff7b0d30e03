use alloy_primitives::{BlockNumber, B256};

use crate::{ConsensusError, ConversionError, GasPoolError, PostProcessError, Receipt, TxLog};

/// An error reported by the execution engine, type-erased.
pub type BoxedEngineError = Box<dyn core::error::Error + Send + Sync>;

/// Errors applying a single transaction.
#[derive(Debug, thiserror::Error)]
pub enum ApplyTxError {
    /// The transaction could not be converted into a message.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The transaction's gas limit exceeds what is left in the block.
    #[error(transparent)]
    GasExceeded(#[from] GasPoolError),
    /// The execution engine failed internally.
    #[error("execution engine error: {0}")]
    Execution(#[source] BoxedEngineError),
}

/// Errors that make a block invalid.
///
/// Every variant aborts the whole block: the caller must discard the state it passed in.
#[derive(Debug, thiserror::Error)]
pub enum BlockProcessError {
    /// The parent block is not known to the chain context.
    #[error("missing parent {parent_hash} of block {number}")]
    MissingParent {
        /// Number of the block being processed.
        number: BlockNumber,
        /// Hash of its parent.
        parent_hash: B256,
    },
    /// The consensus engine failed to classify a transaction.
    #[error("could not classify transaction {index} [{hash}]: {source}")]
    ClassifySystemTx {
        /// Index of the transaction in the block.
        index: usize,
        /// Hash of the transaction.
        hash: B256,
        /// The underlying error.
        #[source]
        source: ConsensusError,
    },
    /// A normal transaction follows a system transaction.
    #[error("normal tx {index} [{hash}] after system tx")]
    SystemTxOrdering {
        /// Index of the offending transaction.
        index: usize,
        /// Hash of the offending transaction.
        hash: B256,
    },
    /// A transaction could not be converted into a message.
    #[error("could not apply tx {index} [{hash}]: {source}")]
    TxConversion {
        /// Index of the transaction in the block.
        index: usize,
        /// Hash of the transaction.
        hash: B256,
        /// The underlying error.
        #[source]
        source: ConversionError,
    },
    /// A transaction needs more gas than the block has left.
    #[error("could not apply tx {index} [{hash}]: {source}")]
    GasExceeded {
        /// Index of the transaction in the block.
        index: usize,
        /// Hash of the transaction.
        hash: B256,
        /// The underlying error.
        #[source]
        source: GasPoolError,
    },
    /// The execution engine failed internally.
    #[error("could not apply tx {index} [{hash}]: {source}")]
    Execution {
        /// Index of the transaction in the block.
        index: usize,
        /// Hash of the transaction.
        hash: B256,
        /// The underlying error.
        #[source]
        source: BoxedEngineError,
    },
    /// The block carries withdrawals before Shanghai.
    #[error("withdrawals before shanghai")]
    WithdrawalsBeforeShanghai,
    /// A receipt post-processor failed.
    #[error(transparent)]
    PostProcessor(#[from] PostProcessError),
    /// The consensus finalizer rejected the block. Carries what was computed before it ran.
    #[error("finalization failed: {source}")]
    Finalization {
        /// The underlying error.
        #[source]
        source: ConsensusError,
        /// Receipts computed before finalization.
        receipts: Vec<Receipt>,
        /// Logs of `receipts`.
        logs: Vec<TxLog>,
        /// Gas used before finalization.
        gas_used: u64,
    },
}

impl BlockProcessError {
    /// Attaches the position of the failing transaction to an [`ApplyTxError`].
    pub fn from_apply(index: usize, hash: B256, err: ApplyTxError) -> Self {
        match err {
            ApplyTxError::Conversion(source) => Self::TxConversion { index, hash, source },
            ApplyTxError::GasExceeded(source) => Self::GasExceeded { index, hash, source },
            ApplyTxError::Execution(source) => Self::Execution { index, hash, source },
        }
    }
}
