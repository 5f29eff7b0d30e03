use alloy_consensus::TxEnvelope;

/// The signed transaction type processed by this crate.
pub type Transaction = TxEnvelope;

/// A full block: header plus body (transactions, uncles, optional withdrawals).
///
/// The beacon root travels in [`alloy_consensus::Header::parent_beacon_block_root`].
pub type Block = alloy_consensus::Block<Transaction>;

pub use alloy_consensus::Header;
pub use alloy_eips::eip4895::Withdrawals;
