//! Protocol constants used by the block processor.
//!
//! Most values are re-exported from `alloy-eips` so that the addresses and gas parameters stay
//! in sync with the rest of the alloy stack.

pub use alloy_eips::{
    eip4788::{BEACON_ROOTS_ADDRESS, SYSTEM_ADDRESS},
    eip4844::DATA_GAS_PER_BLOB,
};

/// Gas allowance of the EIP-4788 beacon-root system call.
pub const BEACON_ROOT_CALL_GAS_LIMIT: u64 = 30_000_000;

/// Expected number of system transactions in a PoSA block (validator set and system reward).
pub const EXPECTED_SYSTEM_TXS: usize = 2;

/// Tracing target shared by every log line of this crate.
pub const LOG_TARGET: &str = "state_processor";
