//! Block-level state transition for an EVM execution client.
//!
//! Given a parent state and a candidate block, the [`StateProcessor`] resolves the active fork
//! [`Rules`], applies one-shot hard-fork mutations, injects the beacon-root system call, runs
//! every transaction through the external [`ExecutionEngine`] under a shared [`GasPool`], builds
//! fork-dependent [`Receipt`]s and hands the result to the [`ConsensusEngine`] finalizer.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod chain;
pub use chain::*;

mod consensus;
pub use consensus::*;

mod engine;
pub use engine::*;

mod error;
pub use error::*;

mod gas_pool;
pub use gas_pool::*;

mod message;
pub use message::*;

mod processor;
pub use processor::*;

mod receipt;
pub use receipt::*;

mod state;
pub use state::*;

mod system;
pub use system::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod types;
pub use types::*;
