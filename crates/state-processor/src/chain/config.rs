use alloy_hardforks::{EthereumHardfork, ForkCondition, Hardfork};
use alloy_primitives::{Address, BlockNumber, BlockTimestamp};
use serde::{Deserialize, Serialize};

use crate::{
    ChainSpec, ConsensusKind, DaoFork, EipGate, ParliaHardfork, DAO_DRAIN_LIST, DAO_REFUND_CONTRACT,
};

/// PoSA consensus parameters. Their presence selects [`ConsensusKind::Parlia`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParliaConfig {
    /// Target block interval in seconds.
    #[serde(default)]
    pub period: u64,
    /// Number of blocks between validator-set checkpoints.
    #[serde(default)]
    pub epoch: u64,
}

/// Genesis-style chain configuration, as found in the `config` object of a genesis file.
///
/// Block-activated forks are configured with `*Block` fields and time-activated forks with
/// `*Time` fields. An absent field means the fork never activates. Use [`ChainSpec::from`] to
/// resolve it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainConfig {
    /// Chain id used for replay protection.
    pub chain_id: u64,

    /// Activation block of homestead.
    pub homestead_block: Option<BlockNumber>,
    /// Activation block of dao fork.
    pub dao_fork_block: Option<BlockNumber>,
    /// Whether this chain follows the DAO hard fork.
    pub dao_fork_support: bool,
    /// Accounts drained into [`DAO_REFUND_CONTRACT`] on the DAO block. Empty means
    /// [`DAO_DRAIN_LIST`].
    pub dao_fork_drain_list: Vec<Address>,
    /// Activation block of EIP150.
    #[serde(rename = "eip150Block")]
    pub eip150_block: Option<BlockNumber>,
    /// Activation block of EIP155.
    #[serde(rename = "eip155Block")]
    pub eip155_block: Option<BlockNumber>,
    /// Activation block of EIP158.
    #[serde(rename = "eip158Block")]
    pub eip158_block: Option<BlockNumber>,
    /// Activation block of byzantium.
    pub byzantium_block: Option<BlockNumber>,
    /// Activation block of constantinople.
    pub constantinople_block: Option<BlockNumber>,
    /// Activation block of petersburg.
    pub petersburg_block: Option<BlockNumber>,
    /// Activation block of istanbul.
    pub istanbul_block: Option<BlockNumber>,
    /// Activation block of berlin.
    pub berlin_block: Option<BlockNumber>,
    /// Activation block of london.
    pub london_block: Option<BlockNumber>,

    /// Activation block of ramanujan.
    pub ramanujan_block: Option<BlockNumber>,
    /// Activation block of niels.
    pub niels_block: Option<BlockNumber>,
    /// Activation block of mirror sync.
    pub mirror_sync_block: Option<BlockNumber>,
    /// Activation block of bruno.
    pub bruno_block: Option<BlockNumber>,
    /// Activation block of euler.
    pub euler_block: Option<BlockNumber>,
    /// Activation block of nano.
    pub nano_block: Option<BlockNumber>,
    /// Activation block of moran.
    pub moran_block: Option<BlockNumber>,
    /// Activation block of gibbs.
    pub gibbs_block: Option<BlockNumber>,
    /// Activation block of planck.
    pub planck_block: Option<BlockNumber>,
    /// Activation block of luban.
    pub luban_block: Option<BlockNumber>,
    /// Activation block of plato.
    pub plato_block: Option<BlockNumber>,
    /// Activation block of hertz.
    pub hertz_block: Option<BlockNumber>,
    /// Activation block of hertzfix.
    pub hertzfix_block: Option<BlockNumber>,

    /// Activation timestamp of shanghai.
    pub shanghai_time: Option<BlockTimestamp>,
    /// Activation timestamp of kepler.
    pub kepler_time: Option<BlockTimestamp>,
    /// Activation timestamp of feynman.
    pub feynman_time: Option<BlockTimestamp>,
    /// Activation timestamp of feynman fix.
    pub feynman_fix_time: Option<BlockTimestamp>,
    /// Activation timestamp of cancun.
    pub cancun_time: Option<BlockTimestamp>,
    /// Activation timestamp of haber.
    pub haber_time: Option<BlockTimestamp>,
    /// Activation timestamp of haber fix.
    pub haber_fix_time: Option<BlockTimestamp>,
    /// Activation timestamp of bohr.
    pub bohr_time: Option<BlockTimestamp>,
    /// Activation timestamp of prague.
    pub prague_time: Option<BlockTimestamp>,

    /// PoSA consensus section.
    pub parlia: Option<ParliaConfig>,
}

impl From<ChainConfig> for ChainSpec {
    fn from(config: ChainConfig) -> Self {
        let mut spec = Self::new(config.chain_id)
            .with_fork(EthereumHardfork::Frontier, ForkCondition::Block(0));

        let block = |spec: &mut Self, fork: &dyn Hardfork, number: Option<BlockNumber>| {
            if let Some(number) = number {
                spec.insert(HardforkName(fork.name()), ForkCondition::Block(number));
            }
        };
        block(&mut spec, &EthereumHardfork::Homestead, config.homestead_block);
        block(&mut spec, &EthereumHardfork::Tangerine, config.eip150_block);
        block(&mut spec, &EipGate::Eip155, config.eip155_block);
        block(&mut spec, &EipGate::Eip158, config.eip158_block);
        block(&mut spec, &EthereumHardfork::SpuriousDragon, config.eip158_block);
        block(&mut spec, &EthereumHardfork::Byzantium, config.byzantium_block);
        block(&mut spec, &EthereumHardfork::Constantinople, config.constantinople_block);
        block(&mut spec, &EthereumHardfork::Petersburg, config.petersburg_block);
        block(&mut spec, &EthereumHardfork::Istanbul, config.istanbul_block);
        block(&mut spec, &EthereumHardfork::Berlin, config.berlin_block);
        block(&mut spec, &EthereumHardfork::London, config.london_block);
        block(&mut spec, &ParliaHardfork::Ramanujan, config.ramanujan_block);
        block(&mut spec, &ParliaHardfork::Niels, config.niels_block);
        block(&mut spec, &ParliaHardfork::MirrorSync, config.mirror_sync_block);
        block(&mut spec, &ParliaHardfork::Bruno, config.bruno_block);
        block(&mut spec, &ParliaHardfork::Euler, config.euler_block);
        block(&mut spec, &ParliaHardfork::Nano, config.nano_block);
        block(&mut spec, &ParliaHardfork::Moran, config.moran_block);
        block(&mut spec, &ParliaHardfork::Gibbs, config.gibbs_block);
        block(&mut spec, &ParliaHardfork::Planck, config.planck_block);
        block(&mut spec, &ParliaHardfork::Luban, config.luban_block);
        block(&mut spec, &ParliaHardfork::Plato, config.plato_block);
        block(&mut spec, &ParliaHardfork::Hertz, config.hertz_block);
        block(&mut spec, &ParliaHardfork::HertzFix, config.hertzfix_block);

        let time = |spec: &mut Self, fork: &dyn Hardfork, timestamp: Option<BlockTimestamp>| {
            if let Some(timestamp) = timestamp {
                spec.insert(HardforkName(fork.name()), ForkCondition::Timestamp(timestamp));
            }
        };
        time(&mut spec, &EthereumHardfork::Shanghai, config.shanghai_time);
        time(&mut spec, &ParliaHardfork::Kepler, config.kepler_time);
        time(&mut spec, &ParliaHardfork::Feynman, config.feynman_time);
        time(&mut spec, &ParliaHardfork::FeynmanFix, config.feynman_fix_time);
        time(&mut spec, &EthereumHardfork::Cancun, config.cancun_time);
        time(&mut spec, &ParliaHardfork::Haber, config.haber_time);
        time(&mut spec, &ParliaHardfork::HaberFix, config.haber_fix_time);
        time(&mut spec, &ParliaHardfork::Bohr, config.bohr_time);
        time(&mut spec, &EthereumHardfork::Prague, config.prague_time);

        if config.dao_fork_support {
            if let Some(block) = config.dao_fork_block {
                let drain_list = if config.dao_fork_drain_list.is_empty() {
                    DAO_DRAIN_LIST.to_vec()
                } else {
                    config.dao_fork_drain_list
                };
                spec = spec.with_dao_fork(DaoFork {
                    block,
                    beneficiary: DAO_REFUND_CONTRACT,
                    drain_list,
                });
            }
        }

        if config.parlia.is_some() {
            spec = spec.with_consensus(ConsensusKind::Parlia);
        }
        spec
    }
}

/// Adapter letting a `&dyn Hardfork` be inserted through the generic [`ChainSpec::insert`].
#[derive(Clone)]
struct HardforkName(&'static str);

impl Hardfork for HardforkName {
    fn name(&self) -> &'static str {
        self.0
    }
}
