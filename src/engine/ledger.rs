//! Reserve & volume ledger: per-pool state derived from liquidity events.
//!
//! Each event is applied atomically and in log order. Replaying the same
//! ordered log from scratch reproduces identical state.

use crate::domain::{Decimal, PoolId, Token};
use crate::error::EngineError;
use crate::feeds::Feeds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authoritative per-pool ledger state.
///
/// Reserves are integers in token-native units and are never stored negative:
/// a negative result is clamped to zero at the point of computation (the
/// underlying cause is an event-ordering bug left for the caller to diagnose
/// via logs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub pool: PoolId,
    pub tokens: [Token; 2],
    pub reserves: [i128; 2],
    pub reserves_usd: [Decimal; 2],
    pub lp_token_supply: i128,
    pub total_liquidity_usd: Decimal,
    pub cumulative_deposit_count: u64,
    pub cumulative_withdraw_count: u64,
    /// USD volume attributable to imbalance relative to the pool's ratio.
    pub cumulative_trade_volume_usd: Decimal,
    /// Absolute token deltas across every event, balanced or not.
    pub cumulative_transfer_volume_reserves: [i128; 2],
    pub cumulative_transfer_volume_reserves_usd: [Decimal; 2],
    /// Last price used per token; fallback when the feed has no quote.
    pub last_price_usd: [Decimal; 2],
}

impl PoolState {
    fn new(pool: PoolId, tokens: [Token; 2]) -> Self {
        PoolState {
            pool,
            tokens,
            reserves: [0, 0],
            reserves_usd: [Decimal::zero(), Decimal::zero()],
            lp_token_supply: 0,
            total_liquidity_usd: Decimal::zero(),
            cumulative_deposit_count: 0,
            cumulative_withdraw_count: 0,
            cumulative_trade_volume_usd: Decimal::zero(),
            cumulative_transfer_volume_reserves: [0, 0],
            cumulative_transfer_volume_reserves_usd: [Decimal::zero(), Decimal::zero()],
            last_price_usd: [Decimal::zero(), Decimal::zero()],
        }
    }
}

/// Convert a raw token-native amount to human units. Amounts past the
/// numeric range reject the event instead of aborting the replay.
fn to_human(pool: &PoolId, raw: i128, decimals: u32) -> Result<Decimal, EngineError> {
    Decimal::from_raw_units(raw, decimals).ok_or_else(|| {
        EngineError::MalformedEvent(format!(
            "amount {} at {} decimals out of numeric range for pool {}",
            raw, decimals, pool
        ))
    })
}

/// Classification of an event for the deposit/withdraw counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Deposit,
    Withdraw,
}

/// Boundary rule between trade volume and transfer volume.
///
/// The 2-token constant-product rule is the shipped implementation; the
/// n-token generalization is intentionally left behind this trait.
pub trait TradeVolumeRule {
    /// USD trade volume induced by moving human-unit reserves from `before`
    /// to `after`, at the given per-unit USD prices.
    fn trade_volume_usd(
        &self,
        before: [Decimal; 2],
        after: [Decimal; 2],
        prices: [Decimal; 2],
    ) -> Decimal;
}

/// Constant-product rule: an unbalanced liquidity change is equivalent to a
/// balanced change plus a swap. Scaling the post-event reserves back to the
/// pre-event invariant isolates the swap leg; the token effectively bought
/// out of the pool is the trade volume.
#[derive(Debug, Default)]
pub struct ConstantProductRule;

impl TradeVolumeRule for ConstantProductRule {
    fn trade_volume_usd(
        &self,
        before: [Decimal; 2],
        after: [Decimal; 2],
        prices: [Decimal; 2],
    ) -> Decimal {
        // A proportional change leaves the reserve ratio untouched and is
        // pure transfer volume. Checked by cross-multiplication, which is
        // exact where the sqrt below is not.
        if before[0] * after[1] == before[1] * after[0] {
            return Decimal::zero();
        }

        let cp_before = before[0] * before[1];
        let cp_after = after[0] * after[1];
        if !cp_before.is_positive() || !cp_after.is_positive() {
            // Pool empty on either side of the event.
            return Decimal::zero();
        }

        let scale = match (cp_before / cp_after).sqrt() {
            Some(scale) => scale,
            None => return Decimal::zero(),
        };

        let mut volume = Decimal::zero();
        for i in 0..2 {
            let virtual_reserve = after[i] * scale;
            let bought = before[i] - virtual_reserve;
            if bought.is_positive() {
                volume += bought * prices[i];
            }
        }
        volume
    }
}

/// The reserve & volume ledger over all registered pools.
pub struct Ledger {
    pools: BTreeMap<PoolId, PoolState>,
    rule: Box<dyn TradeVolumeRule + Send>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            pools: BTreeMap::new(),
            rule: Box::new(ConstantProductRule),
        }
    }

    /// Replace the trade/transfer boundary rule.
    pub fn with_rule(rule: Box<dyn TradeVolumeRule + Send>) -> Self {
        Ledger {
            pools: BTreeMap::new(),
            rule,
        }
    }

    /// Register a pool with its token pair. Registering an existing pool is
    /// a no-op so that replays are idempotent.
    pub fn register_pool(&mut self, pool: PoolId, tokens: [Token; 2]) {
        self.pools
            .entry(pool.clone())
            .or_insert_with(|| PoolState::new(pool, tokens));
    }

    pub fn pool(&self, pool: &PoolId) -> Option<&PoolState> {
        self.pools.get(pool)
    }

    /// All pool states in key order.
    pub fn pools(&self) -> &BTreeMap<PoolId, PoolState> {
        &self.pools
    }

    pub fn add_liquidity(
        &mut self,
        pool: &PoolId,
        token_amounts: [i128; 2],
        lp_minted: i128,
        prices: Option<[Decimal; 2]>,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        self.apply(pool, token_amounts, lp_minted, Direction::Deposit, prices, feeds)
    }

    pub fn remove_liquidity(
        &mut self,
        pool: &PoolId,
        token_amounts: [i128; 2],
        lp_burned: i128,
        prices: Option<[Decimal; 2]>,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        self.apply(
            pool,
            [-token_amounts[0], -token_amounts[1]],
            -lp_burned,
            Direction::Withdraw,
            prices,
            feeds,
        )
    }

    pub fn remove_liquidity_one_sided(
        &mut self,
        pool: &PoolId,
        token_index: usize,
        amount: i128,
        lp_burned: i128,
        prices: Option<[Decimal; 2]>,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        if token_index >= 2 {
            return Err(EngineError::MalformedEvent(format!(
                "one-sided withdraw token index {} out of range for pool {}",
                token_index, pool
            )));
        }
        let mut deltas = [0i128; 2];
        deltas[token_index] = -amount;
        self.apply(pool, deltas, -lp_burned, Direction::Withdraw, prices, feeds)
    }

    pub fn sync(
        &mut self,
        pool: &PoolId,
        new_reserves: [i128; 2],
        lp_delta: i128,
        prices: Option<[Decimal; 2]>,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        let state = self
            .pools
            .get(pool)
            .ok_or_else(|| EngineError::UnregisteredPool(pool.clone()))?;
        let deltas = [
            new_reserves[0] - state.reserves[0],
            new_reserves[1] - state.reserves[1],
        ];
        // A sync that nets reserves in counts as a deposit, out as a withdraw.
        let resolved = self.resolve_prices(state, prices, feeds);
        let decimals = self.token_decimals(state, feeds);
        let usd_delta = to_human(pool, deltas[0], decimals[0])? * resolved[0]
            + to_human(pool, deltas[1], decimals[1])? * resolved[1];
        let direction = if usd_delta.is_negative() {
            Direction::Withdraw
        } else {
            Direction::Deposit
        };
        self.apply(pool, deltas, lp_delta, direction, prices, feeds)
    }

    fn token_decimals(&self, state: &PoolState, feeds: &dyn Feeds) -> [u32; 2] {
        [
            feeds.decimals(&state.tokens[0]),
            feeds.decimals(&state.tokens[1]),
        ]
    }

    /// Price per token: event override, else feed, else the pool's last known
    /// price. Falling back never mutates cumulative history.
    fn resolve_prices(
        &self,
        state: &PoolState,
        overrides: Option<[Decimal; 2]>,
        feeds: &dyn Feeds,
    ) -> [Decimal; 2] {
        if let Some(prices) = overrides {
            return prices;
        }
        let mut resolved = [Decimal::zero(); 2];
        for i in 0..2 {
            resolved[i] = match feeds.latest_price_usd(&state.tokens[i]) {
                Some(price) => price,
                None => {
                    tracing::debug!(
                        pool = %state.pool,
                        token = %state.tokens[i],
                        "price unavailable, using last known price"
                    );
                    state.last_price_usd[i]
                }
            };
        }
        resolved
    }

    fn apply(
        &mut self,
        pool: &PoolId,
        deltas: [i128; 2],
        lp_delta: i128,
        direction: Direction,
        prices: Option<[Decimal; 2]>,
        feeds: &dyn Feeds,
    ) -> Result<(), EngineError> {
        let state = self
            .pools
            .get(pool)
            .ok_or_else(|| EngineError::UnregisteredPool(pool.clone()))?;
        let resolved = self.resolve_prices(state, prices, feeds);
        let decimals = self.token_decimals(state, feeds);

        let before = state.reserves;
        let mut after = [0i128; 2];
        for i in 0..2 {
            let next = before[i] + deltas[i];
            after[i] = if next < 0 {
                tracing::warn!(
                    pool = %state.pool,
                    token = %state.tokens[i],
                    reserve = next,
                    "negative reserve clamped to zero"
                );
                0
            } else {
                next
            };
        }

        // All raw-unit conversions happen before any mutation: an amount out
        // of numeric range rejects the whole event and pool state is
        // untouched.
        let mut before_human = [Decimal::zero(); 2];
        let mut after_human = [Decimal::zero(); 2];
        let mut delta_abs_human = [Decimal::zero(); 2];
        for i in 0..2 {
            before_human[i] = to_human(pool, before[i], decimals[i])?;
            after_human[i] = to_human(pool, after[i], decimals[i])?;
            delta_abs_human[i] = to_human(pool, deltas[i], decimals[i])?.abs();
        }

        let trade_volume = self
            .rule
            .trade_volume_usd(before_human, after_human, resolved);

        // All fields of the pool are updated together below; nothing before
        // this point mutates state.
        let state = self
            .pools
            .get_mut(pool)
            .ok_or_else(|| EngineError::UnregisteredPool(pool.clone()))?;

        state.reserves = after;
        state.lp_token_supply += lp_delta;

        for i in 0..2 {
            state.reserves_usd[i] = after_human[i] * resolved[i];
        }
        state.total_liquidity_usd = state.reserves_usd[0] + state.reserves_usd[1];

        match direction {
            Direction::Deposit => state.cumulative_deposit_count += 1,
            Direction::Withdraw => state.cumulative_withdraw_count += 1,
        }

        for i in 0..2 {
            state.cumulative_transfer_volume_reserves[i] += deltas[i].abs();
            state.cumulative_transfer_volume_reserves_usd[i] +=
                delta_abs_human[i] * resolved[i];
        }

        state.cumulative_trade_volume_usd += trade_volume;

        state.last_price_usd = resolved;

        tracing::debug!(
            pool = %state.pool,
            reserves0 = state.reserves[0],
            reserves1 = state.reserves[1],
            trade_volume = %trade_volume,
            "applied liquidity event"
        );
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
