//! In-memory collaborators for exercising the state processor.

mod consensus;
mod engine;
mod state;
mod tx;

pub use consensus::*;
pub use engine::*;
pub use state::*;
pub use tx::*;
