//! Case-indexed seed gauge controller.
//!
//! Every gauge step is driven by a case id that encodes the protocol state
//! buckets (liquidity-to-supply ratio, pod rate, price, demand for soil).
//! The case table maps each id to a percentage-point delta applied to the
//! bean-to-max-LP incentive ratio. Gauge points per LP token then drift one
//! point per season toward each token's optimal deposit share, and seeds per
//! BDV are re-derived from the updated points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Decimal, Season, Token};
use crate::error::EngineError;
use crate::feeds::Feeds;

/// Number of distinct case ids: 4 L2SR buckets x 4 pod-rate buckets x
/// 3 price buckets x 3 demand buckets.
pub const CASE_COUNT: u8 = 144;

const L2SR_STRIDE: u8 = 36;
const POD_RATE_STRIDE: u8 = 9;
const PRICE_STRIDE: u8 = 3;

/// Price bucket 1 means the reference token trades below peg. Buckets 0 and
/// 2 are above peg (2 is the excessive-price bucket and shares bucket 0's
/// ratio response).
const PRICE_BELOW_PEG: u8 = 1;

/// Exact fractional constant in tenths (the table deltas are all multiples
/// of 0.1).
fn tenths(n: i64) -> Decimal {
    Decimal::from_int(n) / Decimal::from_int(10)
}

/// Versioned table of incentive-ratio deltas, in percentage points.
#[derive(Debug, Clone)]
pub struct CaseTable {
    version: u32,
    deltas: BTreeMap<u8, Decimal>,
}

impl CaseTable {
    /// The v1 table. The demand axis never moves the incentive ratio; it
    /// only selects temperature responses outside this engine's scope.
    pub fn v1() -> Self {
        let mut deltas = BTreeMap::new();
        for case_id in 0..CASE_COUNT {
            let l2sr = case_id / L2SR_STRIDE;
            let pod_rate = (case_id % L2SR_STRIDE) / POD_RATE_STRIDE;
            let price = (case_id % POD_RATE_STRIDE) / PRICE_STRIDE;
            let below_peg = price == PRICE_BELOW_PEG;
            let delta = match (l2sr, pod_rate, below_peg) {
                (0, _, _) | (1, 0, _) => Decimal::from_int(-50),
                (1, _, false) => tenths(1),
                (1, _, true) => Decimal::from_int(-1),
                (2, _, false) => Decimal::from_int(1),
                (2, _, true) => Decimal::from_int(-1),
                (3, _, false) => Decimal::from_int(1),
                (3, _, true) => tenths(-5),
                _ => Decimal::zero(),
            };
            deltas.insert(case_id, delta);
        }
        Self { version: 1, deltas }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn ratio_delta(&self, case_id: u8) -> Result<Decimal, EngineError> {
        if case_id >= CASE_COUNT {
            return Err(EngineError::UnknownCaseId(case_id));
        }
        self.deltas
            .get(&case_id)
            .copied()
            .ok_or(EngineError::IncompleteCaseTable(case_id))
    }

    /// Every id in 0..CASE_COUNT must have an entry before the engine runs.
    pub fn verify_complete(&self) -> Result<(), EngineError> {
        for case_id in 0..CASE_COUNT {
            if !self.deltas.contains_key(&case_id) {
                return Err(EngineError::IncompleteCaseTable(case_id));
            }
        }
        Ok(())
    }
}

/// Per-LP-token gauge state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GaugePointState {
    pub token: Token,
    pub gauge_points: Decimal,
    pub optimal_deposit_share: Decimal,
}

/// Full controller state, updated once per gauge step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GaugeState {
    /// Bean-to-max-LP incentive ratio, in percent, clamped to [0, 100].
    pub ratio_pct: Decimal,
    pub lp: BTreeMap<Token, GaugePointState>,
    pub seeds_per_bdv: BTreeMap<Token, Decimal>,
    pub last_case: Option<u8>,
    pub last_season: Option<Season>,
}

impl GaugeState {
    pub fn new(initial_ratio_pct: Decimal) -> Self {
        Self {
            ratio_pct: initial_ratio_pct,
            lp: BTreeMap::new(),
            seeds_per_bdv: BTreeMap::new(),
            last_case: None,
            last_season: None,
        }
    }
}

pub struct SeedGaugeController {
    table: CaseTable,
}

impl SeedGaugeController {
    pub fn new(table: CaseTable) -> Result<Self, EngineError> {
        table.verify_complete()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &CaseTable {
        &self.table
    }

    /// Applies one gauge step: ratio delta for the case, one-point gauge
    /// drift per LP token toward its optimal deposit share, then the seeds
    /// per BDV rederivation.
    pub fn step(
        &self,
        state: &mut GaugeState,
        feeds: &dyn Feeds,
        season: Season,
        case_id: u8,
    ) -> Result<(), EngineError> {
        let delta = self.table.ratio_delta(case_id)?;
        state.ratio_pct = (state.ratio_pct + delta).clamp(Decimal::zero(), Decimal::hundred());

        self.sync_whitelist(state, feeds);
        self.drift_gauge_points(state, feeds, season);
        self.derive_seeds_per_bdv(state, feeds, season);

        state.last_case = Some(case_id);
        state.last_season = Some(season);
        tracing::debug!(
            season = %season,
            case_id,
            ratio_pct = %state.ratio_pct,
            "gauge step applied"
        );
        Ok(())
    }

    /// Picks up newly whitelisted LP tokens with their initial gauge points
    /// and drops tokens no longer whitelisted.
    fn sync_whitelist(&self, state: &mut GaugeState, feeds: &dyn Feeds) {
        let reference = feeds.reference_token();
        let whitelist: Vec<Token> = feeds
            .whitelisted_tokens()
            .into_iter()
            .filter(|t| *t != reference)
            .collect();
        for token in &whitelist {
            state.lp.entry(token.clone()).or_insert_with(|| GaugePointState {
                token: token.clone(),
                gauge_points: feeds.initial_gauge_points(token),
                optimal_deposit_share: feeds.optimal_deposit_share(token),
            });
        }
        state.lp.retain(|token, _| whitelist.contains(token));
        for (token, lp) in state.lp.iter_mut() {
            lp.optimal_deposit_share = feeds.optimal_deposit_share(token);
        }
    }

    /// Each LP token gains one gauge point when its share of deposited LP
    /// BDV is below its optimal share and loses one when above, floored at
    /// zero.
    fn drift_gauge_points(&self, state: &mut GaugeState, feeds: &dyn Feeds, season: Season) {
        let total_lp_bdv: Decimal = state
            .lp
            .keys()
            .map(|token| feeds.deposited_bdv(token, season))
            .fold(Decimal::zero(), |acc, bdv| acc + bdv);
        if !total_lp_bdv.is_positive() {
            return;
        }
        let one = Decimal::one();
        for (token, lp) in state.lp.iter_mut() {
            // Shares and optimal shares are both in percent.
            let share = feeds.deposited_bdv(token, season) / total_lp_bdv * Decimal::hundred();
            if share > lp.optimal_deposit_share {
                lp.gauge_points = (lp.gauge_points - one).max(Decimal::zero());
            } else if share < lp.optimal_deposit_share {
                lp.gauge_points += one;
            }
        }
    }

    /// stalk_issued = avg grown stalk per BDV per season x total deposited
    /// BDV. Each token's seeds per BDV is its share of gauge points applied
    /// to that issuance. The reference token's gauge points per BDV are the
    /// scaled incentive ratio times the largest LP gauge points per BDV.
    fn derive_seeds_per_bdv(&self, state: &mut GaugeState, feeds: &dyn Feeds, season: Season) {
        state.seeds_per_bdv.clear();

        let reference = feeds.reference_token();
        let reference_bdv = feeds.deposited_bdv(&reference, season);
        let mut total_bdv = reference_bdv;
        let mut gp_per_bdv: BTreeMap<Token, Decimal> = BTreeMap::new();
        let mut max_lp_gp_per_bdv = Decimal::zero();
        for (token, lp) in &state.lp {
            let bdv = feeds.deposited_bdv(token, season);
            total_bdv += bdv;
            let per_bdv = if bdv.is_positive() {
                lp.gauge_points / bdv
            } else {
                Decimal::zero()
            };
            max_lp_gp_per_bdv = max_lp_gp_per_bdv.max(per_bdv);
            gp_per_bdv.insert(token.clone(), per_bdv);
        }

        let scaled_ratio = scale_ratio(state.ratio_pct);
        let reference_gp_per_bdv =
            scaled_ratio / Decimal::hundred() * max_lp_gp_per_bdv;
        gp_per_bdv.insert(reference.clone(), reference_gp_per_bdv);

        let mut total_gauge_points: Decimal = state
            .lp
            .values()
            .map(|lp| lp.gauge_points)
            .fold(Decimal::zero(), |acc, gp| acc + gp);
        total_gauge_points += reference_gp_per_bdv * reference_bdv;

        if !total_gauge_points.is_positive() || !total_bdv.is_positive() {
            for token in gp_per_bdv.keys() {
                state.seeds_per_bdv.insert(token.clone(), Decimal::zero());
            }
            return;
        }

        let stalk_issued =
            feeds.average_grown_stalk_per_bdv_per_season(season) * total_bdv;
        for (token, per_bdv) in gp_per_bdv {
            let seeds = stalk_issued / total_gauge_points * per_bdv;
            state.seeds_per_bdv.insert(token, seeds);
        }
    }
}

/// Maps the [0, 100] incentive ratio onto [50, 100] percent: the reference
/// token never earns less than half the best LP rate. Out-of-range inputs
/// are clamped first, so the output is in [50, 100] for any argument.
pub fn scale_ratio(ratio_pct: Decimal) -> Decimal {
    let clamped = ratio_pct.clamp(Decimal::zero(), Decimal::hundred());
    clamped * tenths(5) + Decimal::from_int(50)
}
