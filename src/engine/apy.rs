//! Forward APY simulation.
//!
//! Projects a depositor's bean- and stalk-denominated yield over one year of
//! hourly seasons by compounding a proportional-ownership process: each
//! season the protocol mints `n` beans, split by current stalk-ownership
//! share, while both principal and stalk compound.

use crate::domain::Decimal;

/// Hourly seasons in one year.
pub const SIMULATED_SEASONS: u32 = 8760;

/// Stalk grown per seed per season: 1/10,000.
pub fn stalk_per_seed() -> Decimal {
    Decimal::one() / Decimal::from_int(10_000)
}

/// Inputs to one APY simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApyInputs {
    /// Estimated beans minted per season (EMA output).
    pub beans_per_season: Decimal,
    /// Seeds per BDV rewarded for the asset being projected.
    pub seeds_per_bdv: Decimal,
    /// Seeds per BDV rewarded for the reference asset.
    pub seeds_per_bean_bdv: Decimal,
    /// Protocol-wide stalk total, normalized precision.
    pub total_stalk: Decimal,
    /// Protocol-wide seeds total, normalized precision.
    pub total_seeds: Decimal,
}

/// Projected annual yields, as fractions (0.1 = 10% APY).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Apy {
    pub bean: Decimal,
    pub stalk: Decimal,
}

/// Run the 8760-step forward simulation.
///
/// `beans_per_season == 0` short-circuits to zero yield; a zero stalk total
/// contributes zero ownership rather than a division fault.
pub fn simulate_apy(inputs: ApyInputs) -> Apy {
    let n = inputs.beans_per_season;
    if !n.is_positive() || !inputs.seeds_per_bean_bdv.is_positive() {
        return Apy::default();
    }

    let stalk_per_seed = stalk_per_seed();
    let stalk_per_bean = inputs.seeds_per_bean_bdv / Decimal::from_int(10_000);

    // Totals
    let mut total_seeds = inputs.total_seeds;
    let mut total_stalk = inputs.total_stalk;
    // Farmer, normalized to 1 stalk and seedsPerBDV/seedsPerBeanBDV deposit
    let mut bdv = inputs.seeds_per_bdv / inputs.seeds_per_bean_bdv;
    let mut stalk = Decimal::one();

    let bdv_start = bdv;
    let stalk_start = stalk;

    for _ in 0..SIMULATED_SEASONS {
        let ownership = if total_stalk.is_positive() {
            stalk / total_stalk
        } else {
            Decimal::zero()
        };
        let new_bdv = n * ownership;

        let next_total_seeds = total_seeds + n * inputs.seeds_per_bean_bdv;
        let next_total_stalk = total_stalk + n + stalk_per_seed * total_seeds;
        let next_bdv = bdv + new_bdv;
        let next_stalk = stalk + new_bdv + stalk_per_bean * bdv;

        total_seeds = next_total_seeds;
        total_stalk = next_total_stalk;
        bdv = next_bdv;
        stalk = next_stalk;
    }

    Apy {
        bean: bdv - bdv_start,
        stalk: stalk - stalk_start,
    }
}
