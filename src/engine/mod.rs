//! The accounting engine: event dispatch over the ledger, the yield
//! pipeline and the gauge controller.
//!
//! Events are applied strictly in `(block, log_index)` order. Every update is
//! atomic: either all state transitions for an event land or none do, and the
//! event is reported in the replay summary.

pub mod apy;
pub mod ema;
pub mod fert;
pub mod gauge;
pub mod l2sr;
pub mod ledger;

pub use apy::{simulate_apy, Apy, ApyInputs, SIMULATED_SEASONS};
pub use ema::{EmaTracker, WindowEma, EMA_WINDOWS};
pub use fert::fertilizer_yield;
pub use gauge::{CaseTable, GaugePointState, GaugeState, SeedGaugeController};
pub use ledger::{ConstantProductRule, Ledger, PoolState, TradeVolumeRule};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{
    sort_events_deterministic, Decimal, Event, EventKind, EventOrderingKey,
    FertilizerYieldSnapshot, PoolId, Season, SeasonRecord, Token, TokenYieldSnapshot,
    YieldSnapshot,
};
use crate::error::EngineError;
use crate::feeds::Feeds;
use crate::store::{MemoryStore, SnapshotStore};

/// Tunables fixed at engine construction.
#[derive(Debug, Clone)]
pub struct EngineParams {
    /// Seasons at or below this produce zero-sample EMA results.
    pub first_eligible_season: u32,
    /// Seasons at or below this skip yield computation entirely and only
    /// record the whitelist.
    pub cached_season_cutoff: u32,
    /// Starting bean-to-max-LP incentive ratio, in percent.
    pub initial_ratio_pct: Decimal,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            first_eligible_season: 6074,
            cached_season_cutoff: 20_000,
            initial_ratio_pct: Decimal::from_int(50),
        }
    }
}

/// Outcome of replaying an event log. Failed events are reported, never
/// retried; the rest of the log still applies.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub processed: usize,
    pub errors: Vec<(EventOrderingKey, EngineError)>,
}

impl ReplayReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Engine {
    ledger: Ledger,
    ema: EmaTracker,
    controller: SeedGaugeController,
    gauge: GaugeState,
    store: Box<dyn SnapshotStore>,
    last_season: Option<Season>,
}

impl Engine {
    pub fn new(params: EngineParams) -> Result<Self, EngineError> {
        Self::with_store(params, Box::new(MemoryStore::new()))
    }

    pub fn with_store(
        params: EngineParams,
        store: Box<dyn SnapshotStore>,
    ) -> Result<Self, EngineError> {
        Ok(Engine {
            ledger: Ledger::new(),
            ema: EmaTracker::new(params.first_eligible_season, params.cached_season_cutoff),
            controller: SeedGaugeController::new(CaseTable::v1())?,
            gauge: GaugeState::new(params.initial_ratio_pct),
            store,
            last_season: None,
        })
    }

    pub fn register_pool(&mut self, pool: PoolId, tokens: [Token; 2]) {
        self.ledger.register_pool(pool, tokens);
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn gauge(&self) -> &GaugeState {
        &self.gauge
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    pub fn last_season(&self) -> Option<Season> {
        self.last_season
    }

    /// Stored EMA snapshot, or the zero-valued snapshot when none exists.
    pub fn yield_snapshot(&self, season: Season, window: u32) -> YieldSnapshot {
        self.store
            .yield_snapshot(season, window)
            .unwrap_or_else(|| YieldSnapshot::empty(season, window))
    }

    /// Stored APY snapshot, or the zero-valued snapshot when none exists.
    pub fn token_yield_snapshot(
        &self,
        token: &Token,
        season: Season,
        window: u32,
    ) -> TokenYieldSnapshot {
        self.store
            .token_yield_snapshot(token, season, window)
            .unwrap_or_else(|| TokenYieldSnapshot::empty(token.clone(), season, window))
    }

    /// Stored fertilizer yield snapshot, if the season produced one.
    pub fn fertilizer_yield_snapshot(
        &self,
        season: Season,
        window: u32,
    ) -> Option<FertilizerYieldSnapshot> {
        self.store.fertilizer_yield_snapshot(season, window)
    }

    /// Current liquidity-to-supply ratio against the given collaborators.
    pub fn liquidity_to_supply_ratio(&self, feeds: &dyn Feeds, season: Season) -> Decimal {
        l2sr::liquidity_to_supply_ratio(&self.ledger, feeds, season)
    }

    /// Apply a single event. Collaborator reads resolve against `feeds` at
    /// call time, so the caller controls what each event observes.
    pub fn process_event(&mut self, event: &Event, feeds: &dyn Feeds) -> Result<(), EngineError> {
        match &event.kind {
            EventKind::AddLiquidity {
                pool,
                token_amounts,
                lp_minted,
                prices,
            } => self
                .ledger
                .add_liquidity(pool, *token_amounts, *lp_minted, *prices, feeds),
            EventKind::RemoveLiquidity {
                pool,
                token_amounts,
                lp_burned,
                prices,
            } => self
                .ledger
                .remove_liquidity(pool, *token_amounts, *lp_burned, *prices, feeds),
            EventKind::RemoveLiquidityOneSided {
                pool,
                token_index,
                amount,
                lp_burned,
                prices,
            } => self.ledger.remove_liquidity_one_sided(
                pool,
                *token_index,
                *amount,
                *lp_burned,
                *prices,
                feeds,
            ),
            EventKind::Sync {
                pool,
                new_reserves,
                lp_delta,
                prices,
            } => self.ledger.sync(pool, *new_reserves, *lp_delta, *prices, feeds),
            EventKind::SeasonAdvance {
                season,
                timestamp,
                mint_delta,
            } => self.season_advance(*season, *timestamp, *mint_delta, feeds),
            EventKind::GaugeStep {
                season,
                case_id,
                price_deviation_sign,
            } => self.gauge_step(*season, *case_id, *price_deviation_sign, feeds),
        }
    }

    /// Sort the log deterministically, then apply each event, collecting
    /// failures instead of aborting the replay.
    pub fn replay(&mut self, mut events: Vec<Event>, feeds: &dyn Feeds) -> ReplayReport {
        sort_events_deterministic(&mut events);
        let mut report = ReplayReport::default();
        for event in &events {
            match self.process_event(event, feeds) {
                Ok(()) => report.processed += 1,
                Err(err) => {
                    tracing::warn!(key = %event.key, error = %err, "event rejected");
                    report.errors.push((event.key, err));
                }
            }
        }
        report
    }

    fn season_advance(
        &mut self,
        season: Season,
        timestamp: i64,
        mint_delta: Decimal,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        if let Some(last) = self.last_season {
            if season <= last {
                return Err(EngineError::NonMonotonicSeason {
                    incoming: season,
                    last,
                });
            }
        }

        self.store.put_season_record(SeasonRecord {
            season,
            timestamp,
            mint_delta,
        });
        self.last_season = Some(season);

        let whitelist = feeds.whitelisted_tokens();
        let cached = self.ema.is_cached(season);
        for window in EMA_WINDOWS {
            let snapshot = if cached {
                // Early history: carry the whitelist forward, skip the math.
                YieldSnapshot {
                    whitelisted_tokens: whitelist.clone(),
                    created_at: timestamp,
                    ..YieldSnapshot::empty(season, window)
                }
            } else {
                let ema = self.ema.window_ema(self.store.as_ref(), season, window);
                YieldSnapshot {
                    season,
                    window,
                    u: ema.u,
                    beta: ema.beta,
                    beans_per_season_ema: ema.beans_per_season_ema,
                    whitelisted_tokens: whitelist.clone(),
                    created_at: timestamp,
                }
            };
            let beans_per_season = snapshot.beans_per_season_ema;
            if !self.store.put_yield_snapshot(snapshot) {
                tracing::debug!(
                    season = %season,
                    window,
                    "yield snapshot already present, skipped"
                );
                continue;
            }

            // Fertilizer yield rides on the window EMA, early history
            // included (it records humidity and outstanding supply even when
            // the EMA is zero).
            self.store.put_fertilizer_yield_snapshot(fert::fertilizer_yield(
                feeds,
                season,
                window,
                beans_per_season,
                timestamp,
            ));

            if cached {
                continue;
            }

            let reference = feeds.reference_token();
            let seeds_per_bean_bdv = feeds.reward_weight(&reference);
            for token in &whitelist {
                let result = simulate_apy(ApyInputs {
                    beans_per_season,
                    seeds_per_bdv: feeds.reward_weight(token),
                    seeds_per_bean_bdv,
                    total_stalk: feeds.total_stalk(season),
                    total_seeds: feeds.total_seeds(season),
                });
                self.store.put_token_yield_snapshot(TokenYieldSnapshot {
                    token: token.clone(),
                    season,
                    window,
                    bean_apy: result.bean,
                    stalk_apy: result.stalk,
                    created_at: timestamp,
                });
            }
        }

        tracing::info!(season = %season, mint_delta = %mint_delta, "season advanced");
        Ok(())
    }

    fn gauge_step(
        &mut self,
        season: Season,
        case_id: u8,
        price_deviation_sign: i8,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        if !feeds.healthy(season) {
            tracing::warn!(season = %season, "oracle unhealthy, gauge step skipped");
            return Ok(());
        }
        let ratio = l2sr::liquidity_to_supply_ratio(&self.ledger, feeds, season);
        tracing::debug!(
            season = %season,
            case_id,
            price_deviation_sign,
            l2sr = %ratio,
            "gauge step"
        );
        self.controller.step(&mut self.gauge, feeds, season, case_id)
    }

    /// SHA-256 over the canonical JSON serialization of all engine state.
    /// Two replays of the same ordered log produce the same digest.
    pub fn state_digest(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct DigestView<'a> {
            pools: &'a std::collections::BTreeMap<PoolId, PoolState>,
            gauge: &'a GaugeState,
            yields: Vec<YieldSnapshot>,
            token_yields: Vec<TokenYieldSnapshot>,
            fertilizer_yields: Vec<FertilizerYieldSnapshot>,
            last_season: Option<Season>,
        }

        let view = DigestView {
            pools: self.ledger.pools(),
            gauge: &self.gauge,
            yields: self.store.yield_snapshots(),
            token_yields: self.store.token_yield_snapshots(),
            fertilizer_yields: self.store.fertilizer_yield_snapshots(),
            last_season: self.last_season,
        };
        let bytes = serde_json::to_vec(&view)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
