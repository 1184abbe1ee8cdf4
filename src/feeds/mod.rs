//! Collaborator read interfaces consumed by the core.
//!
//! The engine never mutates collaborator state. All reads are synchronous and
//! resolved before an event's update completes, so the core stays a
//! deterministic batch computation.

pub mod static_feeds;

pub use static_feeds::{LockedClassConfig, StaticFeeds, TokenConfig};

use crate::domain::{AssetClass, Decimal, PoolId, Season, Token};

/// Read-only USD price source.
pub trait PriceFeed {
    /// Latest USD price for one human unit of `token`. None when the feed has
    /// no quote; the ledger then falls back to the last known price.
    fn latest_price_usd(&self, token: &Token) -> Option<Decimal>;

    /// Whether the oracle produced a valid reading for `season`. A failed
    /// season turns the entire gauge step into a no-op.
    fn healthy(&self, season: Season) -> bool;
}

/// Token metadata registry.
pub trait TokenRegistry {
    /// Number of fractional digits in the token's native units.
    fn decimals(&self, token: &Token) -> u32;
}

/// Source of locked-supply inputs from the redemption mechanism.
///
/// Underlying values come from the mechanism's own accounting, never from
/// spot pool reserves; that is what makes locked supply resistant to
/// single-transaction reserve manipulation.
pub trait LockedAssetSource {
    /// Asset classes with outstanding redemption claims.
    fn asset_classes(&self) -> Vec<AssetClass>;

    /// Fraction of the class's pre-exploit value currently redeemable.
    fn recap_fraction(&self, class: &AssetClass, season: Season) -> Decimal;

    /// Overall redemption progress: fertilized / total claims, in [0, 1].
    fn redemption_progress(&self, season: Season) -> Decimal;

    /// Reference-token value underlying the class's outstanding supply.
    fn underlying_value(&self, class: &AssetClass, season: Season) -> Decimal;
}

/// Whitelist configuration for deposit-eligible assets.
pub trait WhitelistConfig {
    /// Whitelisted tokens in configuration order.
    fn whitelisted_tokens(&self) -> Vec<Token>;

    /// The protocol's reference (bean-denominated) token.
    fn reference_token(&self) -> Token;

    /// Seeds rewarded per BDV deposited for `token`.
    fn reward_weight(&self, token: &Token) -> Decimal;

    /// Target share of deposited BDV for `token`, in percent.
    fn optimal_deposit_share(&self, token: &Token) -> Decimal;

    /// Weight applied to the token's pool liquidity in the L2SR numerator.
    fn liquidity_weight(&self, token: &Token) -> Decimal;

    /// Starting gauge points for `token` (LP assets only).
    fn initial_gauge_points(&self, token: &Token) -> Decimal;

    /// Pool backing the token, if it is an LP asset.
    fn pool_for(&self, token: &Token) -> Option<PoolId>;
}

/// Protocol-wide deposit totals (silo state).
pub trait DepositsSource {
    fn total_stalk(&self, season: Season) -> Decimal;

    fn total_seeds(&self, season: Season) -> Decimal;

    /// BDV of `token` deposits.
    fn deposited_bdv(&self, token: &Token, season: Season) -> Decimal;

    /// Average stalk grown per deposited BDV per season.
    fn average_grown_stalk_per_bdv_per_season(&self, season: Season) -> Decimal;

    /// Circulating supply of the reference token, before locked-supply
    /// subtraction.
    fn circulating_supply(&self, season: Season) -> Decimal;
}

/// Fertilizer-program state.
pub trait FertilizerSource {
    /// Current humidity in thousandths (500 = 50%). None when the upstream
    /// read fails; callers fall back to the launch humidity of 500.
    fn current_humidity_millis(&self, season: Season) -> Option<Decimal>;

    /// Unfertilized fertilizer tokens outstanding.
    fn outstanding_fertilizer(&self, season: Season) -> Decimal;
}

/// Aggregate collaborator handle the engine consumes.
pub trait Feeds:
    PriceFeed + TokenRegistry + LockedAssetSource + WhitelistConfig + DepositsSource + FertilizerSource
{
}

impl<T> Feeds for T where
    T: PriceFeed
        + TokenRegistry
        + LockedAssetSource
        + WhitelistConfig
        + DepositsSource
        + FertilizerSource
{
}
