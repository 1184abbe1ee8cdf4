//! Season-keyed records produced and consumed by the yield pipeline.

use crate::domain::{Decimal, Season, Token};
use serde::{Deserialize, Serialize};

/// Per-season record of the protocol-wide mint delta. The EMA tracker reads
/// these back when recomputing a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub season: Season,
    pub timestamp: i64,
    pub mint_delta: Decimal,
}

/// Per-(season, window) EMA record. Write-once: replaying the log never
/// mutates a snapshot that already exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldSnapshot {
    pub season: Season,
    /// Rolling window in seasons (24, 168 or 720).
    pub window: u32,
    /// Effective sample count: min(season - first eligible, window).
    pub u: u32,
    /// Smoothing factor 2 / (u + 1).
    pub beta: Decimal,
    pub beans_per_season_ema: Decimal,
    /// Whitelist at snapshot time, in configuration order.
    pub whitelisted_tokens: Vec<Token>,
    pub created_at: i64,
}

impl YieldSnapshot {
    /// Zero-initialized snapshot for a (season, window) with no data yet.
    pub fn empty(season: Season, window: u32) -> Self {
        YieldSnapshot {
            season,
            window,
            u: 0,
            beta: Decimal::zero(),
            beans_per_season_ema: Decimal::zero(),
            whitelisted_tokens: Vec::new(),
            created_at: 0,
        }
    }
}

/// Per-(season, window) yield on unfertilized fertilizer: the mint-rate EMA
/// apportioned over outstanding fertilizer, annualized against the humidity
/// payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerYieldSnapshot {
    pub season: Season,
    pub window: u32,
    /// Humidity as a fraction (raw thousandths divided by 1000).
    pub humidity: Decimal,
    pub outstanding_fertilizer: Decimal,
    pub beans_per_season_ema: Decimal,
    /// Beans minted per season per outstanding fertilizer token.
    pub delta_bpf: Decimal,
    pub simple_apy: Decimal,
    pub created_at: i64,
}

/// Per-(token, season, window) projected yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenYieldSnapshot {
    pub token: Token,
    pub season: Season,
    pub window: u32,
    pub bean_apy: Decimal,
    pub stalk_apy: Decimal,
    pub created_at: i64,
}

impl TokenYieldSnapshot {
    /// Zero-initialized snapshot for a token with no data yet.
    pub fn empty(token: Token, season: Season, window: u32) -> Self {
        TokenYieldSnapshot {
            token,
            season,
            window,
            bean_apy: Decimal::zero(),
            stalk_apy: Decimal::zero(),
            created_at: 0,
        }
    }
}
