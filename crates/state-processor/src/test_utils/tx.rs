use alloy_consensus::{
    SignableTransaction, Signed, TxEip1559, TxEip4844, TxEip4844Variant, TxEnvelope, TxLegacy,
};
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::Transaction;

/// Signs transactions with deterministic keys.
///
/// Key `n` is the secret key whose big-endian encoding is `n`, so senders are stable across test
/// runs.
#[derive(Debug, Clone, Copy)]
pub struct TxFactory {
    chain_id: u64,
}

impl TxFactory {
    /// Gas price of legacy transactions.
    pub const GAS_PRICE: u128 = 10;
    /// Max fee per gas of dynamic-fee transactions.
    pub const MAX_FEE: u128 = 10;
    /// Max priority fee per gas of dynamic-fee transactions.
    pub const MAX_PRIORITY_FEE: u128 = 2;
    /// Max fee per blob gas of blob transactions.
    pub const MAX_BLOB_FEE: u128 = 100;

    /// Creates a factory signing for `chain_id`.
    pub const fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    /// The signer of key `key`.
    pub fn signer(key: u8) -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::with_last_byte(key)).expect("valid test key")
    }

    /// The address of key `key`.
    pub fn address(&self, key: u8) -> Address {
        Self::signer(key).address()
    }

    /// A replay-protected legacy transaction. `to: None` creates a contract.
    pub fn legacy(
        &self,
        key: u8,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
    ) -> Transaction {
        self.legacy_with_chain_id(key, Some(self.chain_id), nonce, to, value, gas_limit)
    }

    /// A legacy transaction signed without replay protection.
    pub fn unprotected(
        &self,
        key: u8,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
    ) -> Transaction {
        self.legacy_with_chain_id(key, None, nonce, to, value, gas_limit)
    }

    fn legacy_with_chain_id(
        &self,
        key: u8,
        chain_id: Option<u64>,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
    ) -> Transaction {
        let tx = TxLegacy {
            chain_id,
            nonce,
            gas_price: Self::GAS_PRICE,
            gas_limit,
            to: to.map_or(TxKind::Create, TxKind::Call),
            value,
            input: Bytes::new(),
        };
        TxEnvelope::Legacy(sign(key, tx))
    }

    /// A dynamic-fee transaction. `to: None` creates a contract.
    pub fn eip1559(
        &self,
        key: u8,
        nonce: u64,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
    ) -> Transaction {
        let tx = TxEip1559 {
            chain_id: self.chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas: Self::MAX_FEE,
            max_priority_fee_per_gas: Self::MAX_PRIORITY_FEE,
            to: to.map_or(TxKind::Create, TxKind::Call),
            value,
            access_list: Default::default(),
            input: Bytes::new(),
        };
        TxEnvelope::Eip1559(sign(key, tx))
    }

    /// A blob transaction carrying `blobs` versioned hashes.
    pub fn eip4844(
        &self,
        key: u8,
        nonce: u64,
        to: Address,
        blobs: u8,
        gas_limit: u64,
    ) -> Transaction {
        let tx = TxEip4844 {
            chain_id: self.chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas: Self::MAX_FEE,
            max_priority_fee_per_gas: Self::MAX_PRIORITY_FEE,
            to,
            value: U256::ZERO,
            access_list: Default::default(),
            blob_versioned_hashes: (1..=blobs).map(B256::with_last_byte).collect(),
            max_fee_per_blob_gas: Self::MAX_BLOB_FEE,
            input: Bytes::new(),
        };
        let (tx, signature, hash) = sign(key, tx).into_parts();
        TxEnvelope::Eip4844(Signed::new_unchecked(TxEip4844Variant::TxEip4844(tx), signature, hash))
    }
}

fn sign<T: SignableTransaction<alloy_primitives::Signature>>(key: u8, tx: T) -> Signed<T> {
    let signature =
        TxFactory::signer(key).sign_hash_sync(&tx.signature_hash()).expect("signing succeeds");
    tx.into_signed(signature)
}
