//! Liquidity-to-supply ratio.
//!
//! L2SR relates weighted non-reference pool liquidity to the circulating
//! supply that is actually reachable: supply locked behind the redemption
//! mechanism is subtracted first. Division guards resolve to zero, never to
//! an error.

use crate::domain::{Decimal, Season};
use crate::engine::ledger::Ledger;
use crate::feeds::Feeds;

/// Weighted USD value of non-reference tokens across whitelisted pools.
pub fn weighted_liquidity_usd(ledger: &Ledger, feeds: &dyn Feeds) -> Decimal {
    let reference = feeds.reference_token();
    let mut liquidity = Decimal::zero();
    for token in feeds.whitelisted_tokens() {
        let pool_id = match feeds.pool_for(&token) {
            Some(pool_id) => pool_id,
            None => continue,
        };
        let pool = match ledger.pool(&pool_id) {
            Some(pool) => pool,
            None => continue,
        };
        let mut non_reference_usd = Decimal::zero();
        for i in 0..2 {
            if pool.tokens[i] != reference {
                non_reference_usd += pool.reserves_usd[i];
            }
        }
        liquidity += non_reference_usd * feeds.liquidity_weight(&token);
    }
    liquidity
}

/// Supply rendered economically inaccessible by outstanding redemption
/// claims: per class, underlying value x recap fraction x (1 - redemption
/// progress).
///
/// Inputs come exclusively from the `LockedAssetSource`, never from spot pool
/// reserves, so a single-transaction shift of a pool's reserve composition
/// cannot move this number.
pub fn locked_supply(feeds: &dyn Feeds, season: Season) -> Decimal {
    let remaining = Decimal::one() - feeds.redemption_progress(season);
    let mut locked = Decimal::zero();
    for class in feeds.asset_classes() {
        locked += feeds.underlying_value(&class, season)
            * feeds.recap_fraction(&class, season)
            * remaining;
    }
    locked
}

/// liquidity / (supply - locked). Exactly zero when liquidity is zero or the
/// unlocked supply is zero or negative.
pub fn liquidity_to_supply_ratio(ledger: &Ledger, feeds: &dyn Feeds, season: Season) -> Decimal {
    let liquidity = weighted_liquidity_usd(ledger, feeds);
    if !liquidity.is_positive() {
        return Decimal::zero();
    }
    let unlocked = feeds.circulating_supply(season) - locked_supply(feeds, season);
    if !unlocked.is_positive() {
        tracing::debug!(season = %season, "zero or negative unlocked supply, L2SR = 0");
        return Decimal::zero();
    }
    liquidity / unlocked
}
