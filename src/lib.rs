pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod feeds;
pub mod replay;
pub mod store;

pub use config::Config;
pub use domain::{
    AssetClass, Decimal, Event, EventKind, EventOrderingKey, FertilizerYieldSnapshot, PoolId,
    Season, SeasonRecord, Token, TokenYieldSnapshot, YieldSnapshot,
};
pub use engine::{Engine, EngineParams, ReplayReport};
pub use error::EngineError;
pub use feeds::{Feeds, StaticFeeds};
pub use store::{MemoryStore, SnapshotStore};
