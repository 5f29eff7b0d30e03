//! Chain configuration and per-block fork resolution.
//!
//! [`ChainConfig`] is the serde-facing genesis-style configuration, [`ChainSpec`] its resolved
//! form, and [`Rules`] the immutable snapshot of which forks are live for one block.

mod config;
mod dao;
mod hardfork;
mod rules;
mod spec;

pub use config::*;
pub use dao::*;
pub use hardfork::*;
pub use rules::*;
pub use spec::*;
