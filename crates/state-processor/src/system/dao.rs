use alloy_primitives::U256;
use tracing::info;

use crate::{constants::LOG_TARGET, DaoFork, StateStore};

/// Moves the balance of every account on the DAO drain list to the refund beneficiary.
///
/// Runs once, on the DAO fork block, before any transaction of that block. Returns the total
/// amount moved.
pub fn apply_dao_hard_fork<S: StateStore + ?Sized>(state: &mut S, dao: &DaoFork) -> U256 {
    if !state.exist(dao.beneficiary) {
        state.create_account(dao.beneficiary);
    }

    let mut drained = U256::ZERO;
    for &account in &dao.drain_list {
        let balance = state.balance(account);
        state.add_balance(dao.beneficiary, balance);
        state.sub_balance(account, balance);
        drained = drained.saturating_add(balance);
    }

    info!(
        target: LOG_TARGET,
        block = dao.block,
        accounts = dao.drain_list.len(),
        %drained,
        "Applied DAO hard fork"
    );
    drained
}
