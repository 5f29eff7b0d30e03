use alloy_consensus::{transaction::SignerRecoverable, Transaction as _, TxType};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};

use crate::{Rules, Transaction};

/// Errors converting a signed transaction into a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The transaction type is not enabled by the active rules.
    #[error("transaction type {0:?} not supported")]
    UnsupportedType(TxType),
    /// The transaction is signed for another chain.
    #[error("invalid chain id for signer: have {got}, want {expected}")]
    ChainIdMismatch {
        /// Chain id of the signer.
        expected: u64,
        /// Chain id of the transaction.
        got: u64,
    },
    /// A replay-protected legacy transaction before EIP-155.
    #[error("replay-protected transaction before EIP-155")]
    ReplayProtectionNotActive,
    /// The sender could not be recovered from the signature.
    #[error("invalid transaction signature")]
    InvalidSignature,
}

/// Validates transaction types against the active rules and recovers senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    chain_id: u64,
    rules: Rules,
}

impl Signer {
    /// Creates the signer for a block with the given `rules`.
    pub const fn new(rules: Rules) -> Self {
        Self { chain_id: rules.chain_id, rules }
    }

    /// Chain id transactions must be signed for.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns whether `tx_type` may be included under the active rules.
    pub const fn supports(&self, tx_type: TxType) -> bool {
        match tx_type {
            TxType::Legacy => true,
            TxType::Eip2930 => self.rules.is_berlin,
            TxType::Eip1559 => self.rules.is_london,
            TxType::Eip4844 => self.rules.is_cancun,
            TxType::Eip7702 => self.rules.is_prague,
        }
    }

    /// Recovers the sender of `tx`.
    pub fn sender(&self, tx: &Transaction) -> Result<Address, ConversionError> {
        let tx_type = tx.tx_type();
        if !self.supports(tx_type) {
            return Err(ConversionError::UnsupportedType(tx_type));
        }
        if let Some(got) = tx.chain_id() {
            if tx_type == TxType::Legacy && !self.rules.is_eip155 {
                return Err(ConversionError::ReplayProtectionNotActive);
            }
            if got != self.chain_id {
                return Err(ConversionError::ChainIdMismatch { expected: self.chain_id, got });
            }
        }
        tx.recover_signer().map_err(|_| ConversionError::InvalidSignature)
    }
}

/// An execution request derived from a transaction or a system call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Sender.
    pub from: Address,
    /// Recipient, or [`TxKind::Create`] for contract creations.
    pub to: TxKind,
    /// Sender nonce.
    pub nonce: u64,
    /// Value transferred.
    pub value: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Effective gas price paid per unit of gas.
    pub gas_price: u128,
    /// Maximum total fee per gas.
    pub gas_fee_cap: u128,
    /// Maximum priority fee per gas.
    pub gas_tip_cap: u128,
    /// Calldata or init code.
    pub data: Bytes,
    /// EIP-2930 access list.
    pub access_list: AccessList,
    /// EIP-4844 versioned blob hashes.
    pub blob_hashes: Vec<B256>,
    /// EIP-4844 maximum fee per blob gas.
    pub blob_gas_fee_cap: Option<u128>,
}

impl Message {
    /// Converts a signed transaction, deriving the effective gas price from `base_fee`.
    pub fn from_transaction(
        tx: &Transaction,
        signer: &Signer,
        base_fee: Option<u64>,
    ) -> Result<Self, ConversionError> {
        let from = signer.sender(tx)?;
        let gas_price = tx.effective_gas_price(base_fee);
        Ok(Self {
            from,
            to: tx.kind(),
            nonce: tx.nonce(),
            value: tx.value(),
            gas_limit: tx.gas_limit(),
            gas_price,
            gas_fee_cap: tx.max_fee_per_gas(),
            gas_tip_cap: tx.max_priority_fee_per_gas().unwrap_or(gas_price),
            data: tx.input().clone(),
            access_list: tx.access_list().cloned().unwrap_or_default(),
            blob_hashes: tx.blob_versioned_hashes().map(<[B256]>::to_vec).unwrap_or_default(),
            blob_gas_fee_cap: tx.max_fee_per_blob_gas(),
        })
    }

    /// A zero-fee message calling `to` from `from`, used for protocol system calls.
    pub fn system_call(from: Address, to: Address, data: Bytes, gas_limit: u64) -> Self {
        Self { from, to: TxKind::Call(to), gas_limit, data, ..Default::default() }
    }

    /// Whether the message deploys a contract.
    pub fn is_create(&self) -> bool {
        self.to.is_create()
    }
}
