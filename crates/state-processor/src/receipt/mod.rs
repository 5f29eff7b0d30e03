//! Transaction receipts and the processors deriving their auxiliary artifacts.

use alloy_consensus::{Eip658Value, ReceiptWithBloom, TxType};
use alloy_primitives::{Address, Bloom, Log, B256};
use serde::{Deserialize, Serialize};

mod processor;
pub use processor::*;

/// A log together with the fields linking it to its block and transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Deref)]
#[serde(rename_all = "camelCase")]
pub struct TxLog {
    /// The log as emitted by execution.
    #[deref]
    #[serde(flatten)]
    pub inner: Log,
    /// Number of the block containing the transaction.
    pub block_number: u64,
    /// Hash of the block containing the transaction.
    pub block_hash: B256,
    /// Hash of the emitting transaction.
    pub tx_hash: B256,
    /// Index of the emitting transaction in the block.
    pub tx_index: u64,
    /// Index of the log in the block.
    pub log_index: u64,
}

/// The outcome of one executed transaction.
///
/// `post_state` is only set for blocks before Byzantium. From Byzantium on, `success` carries
/// the EIP-658 status instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Type of the transaction.
    pub tx_type: TxType,
    /// Whether execution succeeded.
    pub success: bool,
    /// Intermediate state root after the transaction.
    pub post_state: Option<B256>,
    /// Gas used by this and all preceding transactions of the block.
    pub cumulative_gas_used: u64,
    /// Gas used by this transaction.
    pub gas_used: u64,
    /// Logs emitted by the transaction.
    pub logs: Vec<TxLog>,
    /// Bloom filter over `logs`. Filled in by a receipt processor.
    pub bloom: Bloom,
    /// Hash of the transaction.
    pub tx_hash: B256,
    /// Address of the created contract, for contract creations.
    pub contract_address: Option<Address>,
    /// Blob gas used, for blob transactions.
    pub blob_gas_used: Option<u64>,
    /// Blob gas price paid, for blob transactions.
    pub blob_gas_price: Option<u128>,
    /// Hash of the containing block.
    pub block_hash: B256,
    /// Number of the containing block.
    pub block_number: u64,
    /// Index of the transaction in the block.
    pub transaction_index: u64,
}

impl Receipt {
    /// The consensus-encoded status field: the post-state root before Byzantium, the status
    /// code afterwards.
    pub fn status_or_post_state(&self) -> Eip658Value {
        match self.post_state {
            Some(root) => Eip658Value::PostState(root),
            None => Eip658Value::Eip658(self.success),
        }
    }

    /// Iterates over the raw logs of this receipt.
    pub fn raw_logs(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter().map(|log| &log.inner)
    }

    /// Converts into the consensus receipt committed to by the block's receipts root.
    pub fn to_consensus(&self) -> ReceiptWithBloom<alloy_consensus::Receipt> {
        ReceiptWithBloom {
            receipt: alloy_consensus::Receipt {
                status: self.status_or_post_state(),
                cumulative_gas_used: self.cumulative_gas_used,
                logs: self.raw_logs().cloned().collect(),
            },
            logs_bloom: self.bloom,
        }
    }
}

/// Computes the bloom filter over `logs`.
pub fn logs_bloom<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Bloom {
    let mut bloom = Bloom::default();
    for log in logs {
        bloom.accrue_log(log);
    }
    bloom
}
