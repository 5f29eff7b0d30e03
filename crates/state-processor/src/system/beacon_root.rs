use alloy_primitives::{Bytes, B256, U256};
use tracing::{trace, warn};

use crate::{
    constants::{BEACON_ROOTS_ADDRESS, BEACON_ROOT_CALL_GAS_LIMIT, LOG_TARGET, SYSTEM_ADDRESS},
    ExecutionEngine, Message, Rules, StateStore, TxContext,
};

/// Stores the parent beacon block root in the EIP-4788 beacon-roots contract.
///
/// The call runs from [`SYSTEM_ADDRESS`] with zero fees and a fixed gas allowance before any
/// transaction of the block. Its outcome is ignored by protocol; the state is finalised
/// afterwards regardless of the active rules. On PoSA chains a zero root means the block has no
/// beacon root at all, and nothing is touched.
pub fn inject_beacon_root<E: ExecutionEngine>(
    root: B256,
    rules: &Rules,
    engine: &mut E,
    state: &mut E::State,
) {
    if root.is_zero() && rules.is_parlia {
        return;
    }

    let message = Message::system_call(
        SYSTEM_ADDRESS,
        BEACON_ROOTS_ADDRESS,
        Bytes::copy_from_slice(root.as_slice()),
        BEACON_ROOT_CALL_GAS_LIMIT,
    );
    engine.reset(TxContext::from(&message));
    state.add_address_to_access_list(BEACON_ROOTS_ADDRESS);

    match engine.call(
        state,
        message.from,
        BEACON_ROOTS_ADDRESS,
        message.data,
        message.gas_limit,
        U256::ZERO,
    ) {
        Ok(result) => trace!(
            target: LOG_TARGET,
            %root,
            success = result.is_success(),
            gas_used = result.gas_used(),
            "Beacon root stored"
        ),
        Err(err) => warn!(target: LOG_TARGET, %root, %err, "Beacon root system call failed"),
    }
    state.finalise(true);
}
