use alloy_hardforks::{EthereumHardfork, ForkCondition, Hardfork};
use alloy_primitives::{map::HashMap, Address, BlockNumber, BlockTimestamp, Bytes};
use serde::{Deserialize, Serialize};

use crate::{EipGate, ParliaHardfork, Rules};

/// The consensus variant a chain runs.
///
/// Some protocol paths are variant specific, e.g. a zero beacon root is ignored on PoSA chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusKind {
    /// Proof-of-work.
    #[default]
    Ethash,
    /// Proof-of-authority.
    Clique,
    /// Proof-of-stake driven by a beacon chain.
    Beacon,
    /// Proof-of-staked-authority (Parlia).
    Parlia,
}

/// Parameters of the one-shot DAO hard-fork balance migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoFork {
    /// Block at which the migration runs.
    pub block: BlockNumber,
    /// Account receiving the drained balances.
    pub beneficiary: Address,
    /// Accounts whose balances are drained.
    pub drain_list: Vec<Address>,
}

/// New runtime code installed at a system contract address when a fork activates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractUpgrade {
    /// The system contract being upgraded.
    pub address: Address,
    /// The runtime code installed at `address`.
    pub code: Bytes,
}

/// Resolved chain specification.
///
/// Holds the [`ForkCondition`] of every configured hardfork (Ethereum and PoSA alike), the
/// optional DAO-fork parameters, the consensus variant and the built-in system-contract upgrade
/// registry. Forks that are not configured are treated as [`ForkCondition::Never`].
#[derive(Debug, Clone, Default)]
pub struct ChainSpec {
    chain_id: u64,
    hardforks: HashMap<&'static str, ForkCondition>,
    dao_fork: Option<DaoFork>,
    consensus: ConsensusKind,
    contract_upgrades: Vec<(&'static str, Vec<ContractUpgrade>)>,
}

impl ChainSpec {
    /// Creates an empty specification for `chain_id`: no fork is active.
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id, ..Default::default() }
    }

    /// Creates a specification with every Ethereum hardfork up to and including Cancun active
    /// from genesis.
    pub fn cancun(chain_id: u64) -> Self {
        let block_forks = [
            EthereumHardfork::Frontier,
            EthereumHardfork::Homestead,
            EthereumHardfork::Tangerine,
            EthereumHardfork::SpuriousDragon,
            EthereumHardfork::Byzantium,
            EthereumHardfork::Constantinople,
            EthereumHardfork::Petersburg,
            EthereumHardfork::Istanbul,
            EthereumHardfork::Berlin,
            EthereumHardfork::London,
        ];
        let time_forks = [EthereumHardfork::Shanghai, EthereumHardfork::Cancun];

        let mut spec = Self::new(chain_id);
        for fork in block_forks {
            spec.insert(fork, ForkCondition::Block(0));
        }
        for fork in time_forks {
            spec.insert(fork, ForkCondition::Timestamp(0));
        }
        spec
    }

    /// Inserts a hardfork into the specification. If the hardfork is already present, it will
    /// be overwritten.
    pub fn insert(&mut self, hardfork: impl Hardfork, condition: ForkCondition) {
        self.hardforks.insert(hardfork.name(), condition);
    }

    /// Builder variant of [`Self::insert`].
    pub fn with_fork(mut self, hardfork: impl Hardfork, condition: ForkCondition) -> Self {
        self.insert(hardfork, condition);
        self
    }

    /// Removes a hardfork, making it inactive forever.
    pub fn without_fork(mut self, hardfork: impl Hardfork) -> Self {
        self.hardforks.remove(hardfork.name());
        self
    }

    /// Enables the DAO-fork balance migration.
    pub fn with_dao_fork(mut self, dao_fork: DaoFork) -> Self {
        self.insert(EthereumHardfork::Dao, ForkCondition::Block(dao_fork.block));
        self.dao_fork = Some(dao_fork);
        self
    }

    /// Sets the consensus variant.
    pub fn with_consensus(mut self, consensus: ConsensusKind) -> Self {
        self.consensus = consensus;
        self
    }

    /// Registers a system-contract upgrade applied on the block where `hardfork` activates.
    pub fn with_contract_upgrade(
        mut self,
        hardfork: impl Hardfork,
        upgrade: ContractUpgrade,
    ) -> Self {
        let name = hardfork.name();
        match self.contract_upgrades.iter_mut().find(|(fork, _)| *fork == name) {
            Some((_, upgrades)) => upgrades.push(upgrade),
            None => self.contract_upgrades.push((name, vec![upgrade])),
        }
        self
    }

    /// Returns the chain id.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the consensus variant.
    pub const fn consensus(&self) -> ConsensusKind {
        self.consensus
    }

    /// Returns the DAO-fork parameters, if the chain supports the DAO fork.
    pub const fn dao_fork(&self) -> Option<&DaoFork> {
        self.dao_fork.as_ref()
    }

    /// Returns the registered system-contract upgrades, keyed by hardfork name.
    pub fn contract_upgrades(&self) -> impl Iterator<Item = (&'static str, &[ContractUpgrade])> {
        self.contract_upgrades.iter().map(|(fork, upgrades)| (*fork, upgrades.as_slice()))
    }

    /// Retrieves the [`ForkCondition`] of `hardfork`. If it is not present, returns
    /// [`ForkCondition::Never`].
    pub fn fork(&self, hardfork: impl Hardfork) -> ForkCondition {
        self.fork_by_name(hardfork.name())
    }

    fn fork_by_name(&self, name: &str) -> ForkCondition {
        self.hardforks.get(name).copied().unwrap_or(ForkCondition::Never)
    }

    /// Returns `true` if `hardfork` is active for a block with the given number and timestamp.
    ///
    /// Block-activated forks compare against the number, time-activated forks against the
    /// timestamp.
    pub fn is_active(
        &self,
        hardfork: impl Hardfork,
        number: BlockNumber,
        timestamp: BlockTimestamp,
    ) -> bool {
        condition_active(self.fork(hardfork), number, timestamp)
    }

    /// Returns `true` if the hardfork named `name` activates exactly on this block.
    ///
    /// A block-activated fork transitions on its fork block. A time-activated fork transitions on
    /// the first block whose timestamp reaches the activation time while its parent's does not.
    pub fn transitions_at(
        &self,
        name: &str,
        number: BlockNumber,
        parent_timestamp: BlockTimestamp,
        timestamp: BlockTimestamp,
    ) -> bool {
        match self.fork_by_name(name) {
            ForkCondition::Block(block) => block == number,
            condition @ ForkCondition::Timestamp(_) => {
                condition.active_at_timestamp(timestamp) &&
                    !condition.active_at_timestamp(parent_timestamp)
            }
            _ => false,
        }
    }

    /// Resolves the active [`Rules`] for a block with the given number and timestamp.
    pub fn rules(&self, number: BlockNumber, timestamp: BlockTimestamp) -> Rules {
        let eth = |fork: EthereumHardfork| self.is_active(fork, number, timestamp);
        // A separately scheduled EIP wins over Spurious Dragon.
        let eip = |gate: EipGate| match self.fork(gate) {
            ForkCondition::Never => eth(EthereumHardfork::SpuriousDragon),
            condition => condition_active(condition, number, timestamp),
        };
        Rules {
            chain_id: self.chain_id,
            number,
            timestamp,
            is_homestead: eth(EthereumHardfork::Homestead),
            is_eip150: eth(EthereumHardfork::Tangerine),
            is_eip155: eip(EipGate::Eip155),
            is_eip158: eip(EipGate::Eip158),
            is_byzantium: eth(EthereumHardfork::Byzantium),
            is_constantinople: eth(EthereumHardfork::Constantinople),
            is_petersburg: eth(EthereumHardfork::Petersburg),
            is_istanbul: eth(EthereumHardfork::Istanbul),
            is_berlin: eth(EthereumHardfork::Berlin),
            is_london: eth(EthereumHardfork::London),
            is_shanghai: eth(EthereumHardfork::Shanghai),
            is_cancun: eth(EthereumHardfork::Cancun),
            is_prague: eth(EthereumHardfork::Prague),
            is_feynman: self.is_active(ParliaHardfork::Feynman, number, timestamp),
            is_dao_fork_block: self.dao_fork.as_ref().is_some_and(|dao| dao.block == number),
            is_parlia: self.consensus == ConsensusKind::Parlia,
        }
    }
}

fn condition_active(
    condition: ForkCondition,
    number: BlockNumber,
    timestamp: BlockTimestamp,
) -> bool {
    match condition {
        ForkCondition::Block(_) => condition.active_at_block(number),
        ForkCondition::Timestamp(_) => condition.active_at_timestamp(timestamp),
        _ => false,
    }
}
