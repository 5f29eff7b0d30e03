use alloy_primitives::{BlockNumber, BlockTimestamp};
use tracing::info;

use crate::{constants::LOG_TARGET, ChainSpec, StateStore};

/// Installs the built-in system-contract code registered for every fork that activates on this
/// block.
///
/// A block-activated fork transitions on its fork block. A time-activated fork transitions on
/// the first block past its activation time, which is why the parent's timestamp is needed.
/// Returns the number of contracts upgraded.
pub fn upgrade_system_contracts<S: StateStore + ?Sized>(
    spec: &ChainSpec,
    number: BlockNumber,
    parent_timestamp: BlockTimestamp,
    timestamp: BlockTimestamp,
    state: &mut S,
) -> usize {
    let mut upgraded = 0;
    for (fork, upgrades) in spec.contract_upgrades() {
        if !spec.transitions_at(fork, number, parent_timestamp, timestamp) {
            continue;
        }
        for upgrade in upgrades {
            info!(
                target: LOG_TARGET,
                fork,
                number,
                address = %upgrade.address,
                "Upgrading system contract"
            );
            if !state.exist(upgrade.address) {
                state.create_account(upgrade.address);
            }
            state.set_code(upgrade.address, upgrade.code.clone());
            upgraded += 1;
        }
    }
    upgraded
}
