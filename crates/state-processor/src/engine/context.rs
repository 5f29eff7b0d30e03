use alloy_eips::eip7840::BlobParams;
use alloy_primitives::{Address, BlockNumber, BlockTimestamp, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{Header, Message, Rules};

/// Block-level execution environment, built once per block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockContext {
    /// Recipient of the transaction fees.
    pub coinbase: Address,
    /// Block number.
    pub number: BlockNumber,
    /// Block timestamp.
    pub timestamp: BlockTimestamp,
    /// Block gas limit.
    pub gas_limit: u64,
    /// EIP-1559 base fee, from London on.
    pub base_fee: Option<u64>,
    /// EIP-4844 blob base fee, derived from the header's excess blob gas under the blob schedule
    /// of the active fork.
    pub blob_base_fee: Option<u128>,
    /// `PREVRANDAO`, set once the chain runs proof-of-stake (zero difficulty).
    pub prev_randao: Option<B256>,
    /// Block difficulty.
    pub difficulty: U256,
}

impl BlockContext {
    /// Builds the context for `header`. `author` overrides the header's beneficiary as fee
    /// recipient.
    pub fn new(header: &Header, rules: &Rules, author: Option<Address>) -> Self {
        let blob_params = if rules.is_prague { BlobParams::prague() } else { BlobParams::cancun() };
        Self {
            coinbase: author.unwrap_or(header.beneficiary),
            number: header.number,
            timestamp: header.timestamp,
            gas_limit: header.gas_limit,
            base_fee: header.base_fee_per_gas,
            blob_base_fee: header.excess_blob_gas.map(|excess| blob_params.calc_blob_fee(excess)),
            prev_randao: header.difficulty.is_zero().then_some(header.mix_hash),
            difficulty: header.difficulty,
        }
    }
}

/// Transaction-level execution environment, replaced before every transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxContext {
    /// Sender of the transaction (`ORIGIN`).
    pub origin: Address,
    /// Effective gas price (`GASPRICE`).
    pub gas_price: u128,
    /// Versioned blob hashes (`BLOBHASH`).
    pub blob_hashes: Vec<B256>,
    /// Maximum fee per blob gas.
    pub blob_fee_cap: Option<u128>,
}

impl From<&Message> for TxContext {
    fn from(message: &Message) -> Self {
        Self {
            origin: message.from,
            gas_price: message.gas_price,
            blob_hashes: message.blob_hashes.clone(),
            blob_fee_cap: message.blob_gas_fee_cap,
        }
    }
}

/// Per-call switches handed to the execution engine factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionConfig {
    /// Skips the base fee check, for calls that must run at zero gas price.
    pub no_base_fee: bool,
    /// Records SHA3 preimages.
    pub enable_preimage_recording: bool,
    /// Additional EIPs to activate on top of the fork rules.
    pub extra_eips: Vec<u64>,
}
