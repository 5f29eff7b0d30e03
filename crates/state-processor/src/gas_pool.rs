//! Block-level gas accounting.

/// Error returned when a transaction asks for more gas than the block has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("gas limit reached: have {available}, want {requested}")]
pub struct GasPoolError {
    /// Gas remaining in the pool.
    pub available: u64,
    /// Gas requested by the transaction.
    pub requested: u64,
}

/// Tracks the amount of gas still available for transactions in one block.
///
/// The pool is seeded with the block gas limit and only ever decremented by transactions, which
/// return whatever they did not consume once execution finishes. It is single-writer state owned
/// by one block-processing call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasPool {
    remaining: u64,
}

impl GasPool {
    /// Creates a pool seeded with `gas_limit`.
    pub fn new(gas_limit: u64) -> Self {
        let mut pool = Self::default();
        pool.add_gas(gas_limit);
        pool
    }

    /// Makes `amount` gas available for execution.
    pub fn add_gas(&mut self, amount: u64) -> &mut Self {
        self.remaining = self.remaining.saturating_add(amount);
        self
    }

    /// Deducts `amount` gas from the pool, failing without side effects if not enough is left.
    pub fn sub_gas(&mut self, amount: u64) -> Result<(), GasPoolError> {
        if amount > self.remaining {
            return Err(GasPoolError { available: self.remaining, requested: amount });
        }
        self.remaining -= amount;
        Ok(())
    }

    /// Returns the amount of gas remaining in the pool.
    pub const fn gas(&self) -> u64 {
        self.remaining
    }
}

impl core::fmt::Display for GasPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.remaining)
    }
}
