//! Input event types for the indexing engine.
//!
//! Events arrive as an ordered log keyed by (block, log index). Liquidity
//! events drive the reserve/volume ledger; season advances drive the EMA and
//! APY pipeline; gauge steps drive the seed gauge controller.

use crate::domain::{Decimal, PoolId, Season};
use serde::{Deserialize, Serialize};

/// A single event from the ordered protocol log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Position of the event in the log.
    pub key: EventOrderingKey,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Stable ordering key for events.
///
/// Processing order is block height, then log index. Order-sensitivity is a
/// contract: trade/transfer classification and EMA recomputation both depend
/// on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EventOrderingKey {
    pub block: u64,
    pub log_index: u32,
}

impl EventOrderingKey {
    pub fn new(block: u64, log_index: u32) -> Self {
        EventOrderingKey { block, log_index }
    }
}

impl std::fmt::Display for EventOrderingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.block, self.log_index)
    }
}

/// The payload of an event.
///
/// Token amounts are integers in token-native units. `prices` carries the
/// per-token USD prices observed in the same transaction, when the emitting
/// layer had them; otherwise the ledger falls back to the price feed and then
/// to the pool's last known price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    AddLiquidity {
        pool: PoolId,
        token_amounts: [i128; 2],
        lp_minted: i128,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prices: Option<[Decimal; 2]>,
    },
    RemoveLiquidity {
        pool: PoolId,
        token_amounts: [i128; 2],
        lp_burned: i128,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prices: Option<[Decimal; 2]>,
    },
    RemoveLiquidityOneSided {
        pool: PoolId,
        /// Index of the withdrawn token within the pool's token pair.
        token_index: usize,
        amount: i128,
        lp_burned: i128,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prices: Option<[Decimal; 2]>,
    },
    Sync {
        pool: PoolId,
        new_reserves: [i128; 2],
        lp_delta: i128,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prices: Option<[Decimal; 2]>,
    },
    SeasonAdvance {
        season: Season,
        timestamp: i64,
        /// Protocol-wide mint delta for this season (human units).
        mint_delta: Decimal,
    },
    GaugeStep {
        season: Season,
        /// Case identifier derived externally from
        /// (L2SR bucket x pod-rate bucket x price-deviation sign).
        case_id: u8,
        /// Sign of the price deviation that fed into the case id.
        price_deviation_sign: i8,
    },
}

impl Event {
    pub fn new(key: EventOrderingKey, kind: EventKind) -> Self {
        Event { key, kind }
    }
}
