use alloy_primitives::{BlockNumber, BlockTimestamp};

/// Immutable snapshot of the protocol rules active for one block.
///
/// Produced once per block by [`ChainSpec::rules`](crate::ChainSpec::rules) and passed down to
/// every component that gates behaviour on a fork, so no component compares heights or
/// timestamps on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rules {
    /// Chain id the rules were resolved for.
    pub chain_id: u64,
    /// Block number the rules were resolved for.
    pub number: BlockNumber,
    /// Block timestamp the rules were resolved for.
    pub timestamp: BlockTimestamp,
    /// Homestead.
    pub is_homestead: bool,
    /// EIP-150 (Tangerine Whistle).
    pub is_eip150: bool,
    /// EIP-155 replay protection (Spurious Dragon).
    pub is_eip155: bool,
    /// EIP-158 empty-account clearing (Spurious Dragon).
    pub is_eip158: bool,
    /// Byzantium. Receipts carry a status code instead of an intermediate state root.
    pub is_byzantium: bool,
    /// Constantinople.
    pub is_constantinople: bool,
    /// Petersburg.
    pub is_petersburg: bool,
    /// Istanbul.
    pub is_istanbul: bool,
    /// Berlin. Enables access-list transactions.
    pub is_berlin: bool,
    /// London. Enables dynamic-fee transactions.
    pub is_london: bool,
    /// Shanghai. Enables withdrawals.
    pub is_shanghai: bool,
    /// Cancun. Enables blob transactions and trailing system transactions.
    pub is_cancun: bool,
    /// Prague. Enables set-code transactions.
    pub is_prague: bool,
    /// PoSA Feynman. System-contract upgrades move into block finalization.
    pub is_feynman: bool,
    /// Whether this block is the DAO hard-fork block.
    pub is_dao_fork_block: bool,
    /// Whether the chain runs the PoSA (Parlia) consensus variant.
    pub is_parlia: bool,
}

impl Rules {
    /// Whether blocks may carry withdrawals.
    pub const fn supports_withdrawals(&self) -> bool {
        self.is_shanghai
    }

    /// Whether every system transaction of a block must come after all normal transactions.
    pub const fn requires_trailing_system_txs(&self) -> bool {
        self.is_cancun
    }

    /// Whether receipts embed the intermediate state root rather than a status code.
    pub const fn uses_intermediate_root(&self) -> bool {
        !self.is_byzantium
    }
}
