//! Protocol-mandated state mutations that are not ordinary transactions.

mod beacon_root;
pub use beacon_root::*;

mod dao;
pub use dao::*;

mod upgrade;
pub use upgrade::*;
