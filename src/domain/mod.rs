//! Domain types and determinism layer for the seasonal yield engine.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: Season, Token, PoolId, AssetClass
//! - Event types with canonical serialization
//! - Stable (block, log index) ordering for deterministic replay
//! - Season-keyed snapshot records

pub mod decimal;
pub mod event;
pub mod ordering;
pub mod primitives;
pub mod snapshot;

pub use decimal::Decimal;
pub use event::{Event, EventKind, EventOrderingKey};
pub use ordering::sort_events_deterministic;
pub use primitives::{AssetClass, PoolId, Season, Token};
pub use snapshot::{FertilizerYieldSnapshot, SeasonRecord, TokenYieldSnapshot, YieldSnapshot};
