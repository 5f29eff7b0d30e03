use alloy_hardforks::hardfork;

hardfork! {
    /// The name of PoSA (Parlia-family) hardforks. It is expected to mix with
    /// [`alloy_hardforks::EthereumHardfork`].
    #[derive(serde::Serialize, serde::Deserialize)]
    ParliaHardfork {
        /// Validator-set and slashing contract rollout.
        Ramanujan,
        /// Cross-chain contract upgrade.
        Niels,
        /// Mirror and sync of BEP-20 tokens.
        MirrorSync,
        /// Token burn contract upgrade.
        Bruno,
        /// Validator-set size increase.
        Euler,
        /// Emergency cross-chain pause.
        Nano,
        /// Cross-chain security hardening.
        Moran,
        /// Cross-chain package verification fix.
        Gibbs,
        /// Fast-finality groundwork.
        Planck,
        /// BLS vote addresses in headers.
        Luban,
        /// Fast finality.
        Plato,
        /// Berlin and London alignment.
        Hertz,
        /// Follow-up fix for Hertz.
        HertzFix,
        /// Shanghai alignment.
        Kepler,
        /// Native staking; system-contract upgrades move into block finalization.
        Feynman,
        /// Follow-up fix for Feynman.
        FeynmanFix,
        /// Cancun alignment.
        Haber,
        /// Follow-up fix for Haber.
        HaberFix,
        /// Shorter block interval.
        Bohr,
    }
}

hardfork! {
    /// EIPs a genesis config may schedule apart from the hardfork that bundles them. A gate that
    /// is not configured follows [`alloy_hardforks::EthereumHardfork::SpuriousDragon`].
    #[derive(serde::Serialize, serde::Deserialize)]
    EipGate {
        /// Replay-protected signatures.
        Eip155,
        /// Empty-account clearing.
        Eip158,
    }
}
