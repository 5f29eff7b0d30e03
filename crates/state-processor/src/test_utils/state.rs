use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{keccak256, Address, Bytes, Log, B256, U256};

use crate::{StateStore, TxLog};

/// An account of [`MemoryState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryAccount {
    /// Account nonce.
    pub nonce: u64,
    /// Account balance.
    pub balance: U256,
    /// Runtime code, if any.
    pub code: Option<Bytes>,
    /// Storage slots.
    pub storage: BTreeMap<U256, U256>,
}

impl MemoryAccount {
    /// Whether the account is empty in the EIP-161 sense and holds no storage.
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 &&
            self.balance.is_zero() &&
            self.code.as_ref().is_none_or(|code| code.is_empty()) &&
            self.storage.is_empty()
    }
}

/// A [`StateStore`] held entirely in memory.
///
/// The state root is a keccak hash over the ordered account set, which is deterministic but not
/// a Merkle-Patricia root.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    accounts: BTreeMap<Address, MemoryAccount>,
    touched: BTreeSet<Address>,
    access_list: BTreeSet<Address>,
    logs: Vec<(B256, usize, Log)>,
    tx_hash: B256,
    tx_index: usize,
    snapshots: usize,
    finalised: usize,
}

impl MemoryState {
    /// Sets the balance of `address`.
    pub fn fund(&mut self, address: Address, balance: U256) {
        self.account_mut(address).balance = balance;
    }

    /// Builder variant of [`Self::fund`].
    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.fund(address, balance);
        self
    }

    /// Sets the nonce of `address`.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.account_mut(address).nonce = nonce;
    }

    /// Sets a storage slot of `address`.
    pub fn set_storage(&mut self, address: Address, slot: U256, value: U256) {
        self.account_mut(address).storage.insert(slot, value);
    }

    /// Returns the account at `address`.
    pub fn account(&self, address: Address) -> Option<&MemoryAccount> {
        self.accounts.get(&address)
    }

    /// Nonce of `address`.
    pub fn nonce(&self, address: Address) -> u64 {
        self.account(address).map_or(0, |account| account.nonce)
    }

    /// Code of `address`.
    pub fn code(&self, address: Address) -> Option<Bytes> {
        self.account(address).and_then(|account| account.code.clone())
    }

    /// Storage slot of `address`.
    pub fn storage(&self, address: Address, slot: U256) -> U256 {
        self.account(address)
            .and_then(|account| account.storage.get(&slot).copied())
            .unwrap_or_default()
    }

    /// Whether `address` was added to the access list.
    pub fn in_access_list(&self, address: Address) -> bool {
        self.access_list.contains(&address)
    }

    /// Number of [`StateStore::snapshot`] calls.
    pub const fn snapshots(&self) -> usize {
        self.snapshots
    }

    /// Number of [`StateStore::finalise`] calls, including those made by
    /// [`StateStore::intermediate_root`].
    pub const fn finalised(&self) -> usize {
        self.finalised
    }

    /// Every log recorded so far.
    pub fn all_logs(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter().map(|(_, _, log)| log)
    }

    /// Hash of the current account set, without finalising.
    pub fn root(&self) -> B256 {
        let mut buf = Vec::new();
        for (address, account) in &self.accounts {
            buf.extend_from_slice(address.as_slice());
            buf.extend_from_slice(&account.nonce.to_be_bytes());
            buf.extend_from_slice(&account.balance.to_be_bytes::<32>());
            if let Some(code) = &account.code {
                buf.extend_from_slice(keccak256(code).as_slice());
            }
            for (slot, value) in &account.storage {
                buf.extend_from_slice(&slot.to_be_bytes::<32>());
                buf.extend_from_slice(&value.to_be_bytes::<32>());
            }
        }
        keccak256(&buf)
    }

    fn account_mut(&mut self, address: Address) -> &mut MemoryAccount {
        self.touched.insert(address);
        self.accounts.entry(address).or_default()
    }
}

impl StateStore for MemoryState {
    fn snapshot(&mut self) -> usize {
        self.snapshots += 1;
        self.snapshots
    }

    fn finalise(&mut self, delete_empty_objects: bool) {
        self.finalised += 1;
        let touched = core::mem::take(&mut self.touched);
        if delete_empty_objects {
            for address in touched {
                if self.accounts.get(&address).is_some_and(MemoryAccount::is_empty) {
                    self.accounts.remove(&address);
                }
            }
        }
    }

    fn intermediate_root(&mut self, delete_empty_objects: bool) -> B256 {
        self.finalise(delete_empty_objects);
        self.root()
    }

    fn set_tx_context(&mut self, tx_hash: B256, index: usize) {
        self.tx_hash = tx_hash;
        self.tx_index = index;
    }

    fn tx_index(&self) -> usize {
        self.tx_index
    }

    fn add_log(&mut self, log: Log) {
        self.logs.push((self.tx_hash, self.tx_index, log));
    }

    fn logs(&self, tx_hash: B256, block_number: u64, block_hash: B256) -> Vec<TxLog> {
        self.logs
            .iter()
            .enumerate()
            .filter(|(_, (hash, _, _))| *hash == tx_hash)
            .map(|(log_index, (hash, tx_index, log))| TxLog {
                inner: log.clone(),
                block_number,
                block_hash,
                tx_hash: *hash,
                tx_index: *tx_index as u64,
                log_index: log_index as u64,
            })
            .collect()
    }

    fn add_address_to_access_list(&mut self, address: Address) {
        self.access_list.insert(address);
    }

    fn exist(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    fn create_account(&mut self, address: Address) {
        self.account_mut(address);
    }

    fn balance(&self, address: Address) -> U256 {
        self.account(address).map(|account| account.balance).unwrap_or_default()
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_add(amount);
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_sub(amount);
    }

    fn set_code(&mut self, address: Address, code: Bytes) {
        self.account_mut(address).code = Some(code);
    }
}
