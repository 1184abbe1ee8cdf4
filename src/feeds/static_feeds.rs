//! In-memory collaborator implementation.
//!
//! `StaticFeeds` backs the replay binary (deserialized from the replay file)
//! and the test suites. Mutators let a caller reshape collaborator state
//! between events, which is how oracle failures and supply changes are
//! exercised deterministically.

use crate::domain::{AssetClass, Decimal, PoolId, Season, Token};
use crate::feeds::{
    DepositsSource, FertilizerSource, LockedAssetSource, PriceFeed, TokenRegistry, WhitelistConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_decimals() -> u32 {
    6
}

fn default_liquidity_weight() -> Decimal {
    Decimal::one()
}

/// Per-token whitelist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default)]
    pub reward_weight: Decimal,
    /// Target share of deposited BDV, in percent.
    #[serde(default)]
    pub optimal_deposit_share: Decimal,
    #[serde(default = "default_liquidity_weight")]
    pub liquidity_weight: Decimal,
    #[serde(default)]
    pub initial_gauge_points: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolId>,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default)]
    pub deposited_bdv: Decimal,
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            reward_weight: Decimal::zero(),
            optimal_deposit_share: Decimal::zero(),
            liquidity_weight: default_liquidity_weight(),
            initial_gauge_points: Decimal::zero(),
            pool: None,
            decimals: default_decimals(),
            deposited_bdv: Decimal::zero(),
        }
    }
}

/// Configuration for one asset class in the redemption mechanism.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LockedClassConfig {
    /// Fraction of pre-exploit value currently redeemable.
    pub recap_fraction: Decimal,
    /// Reference-token value underlying the class's outstanding supply.
    pub underlying_value: Decimal,
}

/// Static, serde-loadable implementation of every collaborator trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticFeeds {
    pub reference_token: Token,
    /// Whitelisted tokens in configuration order.
    pub whitelist: Vec<Token>,
    #[serde(default)]
    pub tokens: BTreeMap<Token, TokenConfig>,
    #[serde(default)]
    pub prices: BTreeMap<Token, Decimal>,
    /// Seasons for which the oracle reported failure.
    #[serde(default)]
    pub failed_seasons: BTreeSet<Season>,
    #[serde(default)]
    pub locked_classes: BTreeMap<AssetClass, LockedClassConfig>,
    /// Redemption progress in [0, 1].
    #[serde(default)]
    pub redemption_progress: Decimal,
    #[serde(default)]
    pub total_stalk: Decimal,
    #[serde(default)]
    pub total_seeds: Decimal,
    #[serde(default)]
    pub average_grown_stalk_per_bdv_per_season: Decimal,
    #[serde(default)]
    pub circulating_supply: Decimal,
    /// Current humidity in thousandths; None models a failed upstream read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_millis: Option<Decimal>,
    #[serde(default)]
    pub outstanding_fertilizer: Decimal,
}

impl StaticFeeds {
    pub fn new(reference_token: Token) -> Self {
        StaticFeeds {
            reference_token,
            whitelist: Vec::new(),
            tokens: BTreeMap::new(),
            prices: BTreeMap::new(),
            failed_seasons: BTreeSet::new(),
            locked_classes: BTreeMap::new(),
            redemption_progress: Decimal::zero(),
            total_stalk: Decimal::zero(),
            total_seeds: Decimal::zero(),
            average_grown_stalk_per_bdv_per_season: Decimal::zero(),
            circulating_supply: Decimal::zero(),
            humidity_millis: None,
            outstanding_fertilizer: Decimal::zero(),
        }
    }

    /// Whitelist a token with its configuration.
    pub fn whitelist_token(&mut self, token: Token, config: TokenConfig) {
        if !self.whitelist.contains(&token) {
            self.whitelist.push(token.clone());
        }
        self.tokens.insert(token, config);
    }

    pub fn set_price(&mut self, token: Token, price: Decimal) {
        self.prices.insert(token, price);
    }

    pub fn clear_price(&mut self, token: &Token) {
        self.prices.remove(token);
    }

    /// Mark the oracle as failed for `season`.
    pub fn fail_season(&mut self, season: Season) {
        self.failed_seasons.insert(season);
    }

    pub fn set_circulating_supply(&mut self, supply: Decimal) {
        self.circulating_supply = supply;
    }

    pub fn set_deposited_bdv(&mut self, token: &Token, bdv: Decimal) {
        self.tokens.entry(token.clone()).or_default().deposited_bdv = bdv;
    }

    pub fn add_locked_class(&mut self, class: AssetClass, config: LockedClassConfig) {
        self.locked_classes.insert(class, config);
    }

    pub fn set_redemption_progress(&mut self, progress: Decimal) {
        self.redemption_progress = progress;
    }

    pub fn set_humidity_millis(&mut self, humidity: Decimal) {
        self.humidity_millis = Some(humidity);
    }

    /// Model a failed humidity read.
    pub fn clear_humidity(&mut self) {
        self.humidity_millis = None;
    }

    pub fn set_outstanding_fertilizer(&mut self, supply: Decimal) {
        self.outstanding_fertilizer = supply;
    }

    fn token_config(&self, token: &Token) -> Option<&TokenConfig> {
        self.tokens.get(token)
    }
}

impl PriceFeed for StaticFeeds {
    fn latest_price_usd(&self, token: &Token) -> Option<Decimal> {
        self.prices.get(token).copied()
    }

    fn healthy(&self, season: Season) -> bool {
        !self.failed_seasons.contains(&season)
    }
}

impl TokenRegistry for StaticFeeds {
    fn decimals(&self, token: &Token) -> u32 {
        self.token_config(token)
            .map(|config| config.decimals)
            .unwrap_or_else(default_decimals)
    }
}

impl LockedAssetSource for StaticFeeds {
    fn asset_classes(&self) -> Vec<AssetClass> {
        self.locked_classes.keys().cloned().collect()
    }

    fn recap_fraction(&self, class: &AssetClass, _season: Season) -> Decimal {
        self.locked_classes
            .get(class)
            .map(|config| config.recap_fraction)
            .unwrap_or_else(Decimal::zero)
    }

    fn redemption_progress(&self, _season: Season) -> Decimal {
        self.redemption_progress
    }

    fn underlying_value(&self, class: &AssetClass, _season: Season) -> Decimal {
        self.locked_classes
            .get(class)
            .map(|config| config.underlying_value)
            .unwrap_or_else(Decimal::zero)
    }
}

impl WhitelistConfig for StaticFeeds {
    fn whitelisted_tokens(&self) -> Vec<Token> {
        self.whitelist.clone()
    }

    fn reference_token(&self) -> Token {
        self.reference_token.clone()
    }

    fn reward_weight(&self, token: &Token) -> Decimal {
        self.token_config(token)
            .map(|config| config.reward_weight)
            .unwrap_or_else(Decimal::zero)
    }

    fn optimal_deposit_share(&self, token: &Token) -> Decimal {
        self.token_config(token)
            .map(|config| config.optimal_deposit_share)
            .unwrap_or_else(Decimal::zero)
    }

    fn liquidity_weight(&self, token: &Token) -> Decimal {
        self.token_config(token)
            .map(|config| config.liquidity_weight)
            .unwrap_or_else(default_liquidity_weight)
    }

    fn initial_gauge_points(&self, token: &Token) -> Decimal {
        self.token_config(token)
            .map(|config| config.initial_gauge_points)
            .unwrap_or_else(Decimal::zero)
    }

    fn pool_for(&self, token: &Token) -> Option<PoolId> {
        self.token_config(token).and_then(|config| config.pool.clone())
    }
}

impl FertilizerSource for StaticFeeds {
    fn current_humidity_millis(&self, _season: Season) -> Option<Decimal> {
        self.humidity_millis
    }

    fn outstanding_fertilizer(&self, _season: Season) -> Decimal {
        self.outstanding_fertilizer
    }
}

impl DepositsSource for StaticFeeds {
    fn total_stalk(&self, _season: Season) -> Decimal {
        self.total_stalk
    }

    fn total_seeds(&self, _season: Season) -> Decimal {
        self.total_seeds
    }

    fn deposited_bdv(&self, token: &Token, _season: Season) -> Decimal {
        self.token_config(token)
            .map(|config| config.deposited_bdv)
            .unwrap_or_else(Decimal::zero)
    }

    fn average_grown_stalk_per_bdv_per_season(&self, _season: Season) -> Decimal {
        self.average_grown_stalk_per_bdv_per_season
    }

    fn circulating_supply(&self, _season: Season) -> Decimal {
        self.circulating_supply
    }
}
