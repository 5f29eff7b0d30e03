use alloy_primitives::{Address, Bytes, Log, B256, U256};
use auto_impl::auto_impl;

use crate::TxLog;

/// The mutable account and storage state a block is executed against.
///
/// Persistence, tries and proofs live behind this trait. The processor only relies on snapshot
/// markers, finalization, intermediate roots, per-transaction log bookkeeping and the handful of
/// balance and code mutations needed by the hard-fork routines. Implementations are expected to
/// keep their own failure state, the same way the block processing never observes a database
/// error mid-block.
#[auto_impl(&mut, Box)]
pub trait StateStore {
    /// Takes a revision marker the execution engine may revert to.
    fn snapshot(&mut self) -> usize;

    /// Folds the pending changes of the current transaction into the state, optionally removing
    /// touched empty accounts.
    fn finalise(&mut self, delete_empty_objects: bool);

    /// Finalises the pending changes and returns the resulting state root.
    fn intermediate_root(&mut self, delete_empty_objects: bool) -> B256;

    /// Sets the hash and index of the transaction whose effects are being recorded.
    fn set_tx_context(&mut self, tx_hash: B256, index: usize);

    /// Index of the transaction set by [`Self::set_tx_context`].
    fn tx_index(&self) -> usize;

    /// Records a log emitted by the transaction set by [`Self::set_tx_context`].
    fn add_log(&mut self, log: Log);

    /// Returns the logs emitted by `tx_hash`, stamped with the block linkage fields.
    fn logs(&self, tx_hash: B256, block_number: u64, block_hash: B256) -> Vec<TxLog>;

    /// Adds `address` to the access list of the current transaction.
    fn add_address_to_access_list(&mut self, address: Address);

    /// Whether an account exists at `address`.
    fn exist(&self, address: Address) -> bool;

    /// Creates an empty account at `address`.
    fn create_account(&mut self, address: Address);

    /// Balance of `address`, zero if the account does not exist.
    fn balance(&self, address: Address) -> U256;

    /// Credits `amount` to `address`.
    fn add_balance(&mut self, address: Address, amount: U256);

    /// Debits `amount` from `address`.
    fn sub_balance(&mut self, address: Address, amount: U256);

    /// Replaces the runtime code at `address`.
    fn set_code(&mut self, address: Address, code: Bytes);
}
