//! Snapshot store: repository abstraction over season-keyed records.
//!
//! Core logic talks to `SnapshotStore` only; any key-value backend can sit
//! behind it. The shipped implementation is an in-memory BTreeMap store with
//! deterministic iteration order.

use crate::domain::{
    FertilizerYieldSnapshot, Season, SeasonRecord, Token, TokenYieldSnapshot, YieldSnapshot,
};
use std::collections::BTreeMap;

/// Key-value repository for season records and yield snapshots.
///
/// Missing entries are `None`; callers treat them as zero-initialized
/// defaults, never as errors.
pub trait SnapshotStore {
    fn season_record(&self, season: Season) -> Option<SeasonRecord>;

    fn put_season_record(&mut self, record: SeasonRecord);

    fn latest_season(&self) -> Option<Season>;

    fn yield_snapshot(&self, season: Season, window: u32) -> Option<YieldSnapshot>;

    /// Insert a yield snapshot. Returns false (and stores nothing) if a
    /// snapshot already exists for the (season, window) key: snapshots are
    /// write-once.
    fn put_yield_snapshot(&mut self, snapshot: YieldSnapshot) -> bool;

    fn token_yield_snapshot(
        &self,
        token: &Token,
        season: Season,
        window: u32,
    ) -> Option<TokenYieldSnapshot>;

    fn put_token_yield_snapshot(&mut self, snapshot: TokenYieldSnapshot);

    fn fertilizer_yield_snapshot(
        &self,
        season: Season,
        window: u32,
    ) -> Option<FertilizerYieldSnapshot>;

    fn put_fertilizer_yield_snapshot(&mut self, snapshot: FertilizerYieldSnapshot);

    /// All yield snapshots in key order, for digesting and export.
    fn yield_snapshots(&self) -> Vec<YieldSnapshot>;

    /// All token yield snapshots in key order.
    fn token_yield_snapshots(&self) -> Vec<TokenYieldSnapshot>;

    /// All fertilizer yield snapshots in key order.
    fn fertilizer_yield_snapshots(&self) -> Vec<FertilizerYieldSnapshot>;
}

/// BTreeMap-backed store. Iteration order is the key order, which keeps
/// digests and exports deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    seasons: BTreeMap<u32, SeasonRecord>,
    yields: BTreeMap<(u32, u32), YieldSnapshot>,
    token_yields: BTreeMap<(Token, u32, u32), TokenYieldSnapshot>,
    fertilizer_yields: BTreeMap<(u32, u32), FertilizerYieldSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn season_record(&self, season: Season) -> Option<SeasonRecord> {
        self.seasons.get(&season.as_u32()).cloned()
    }

    fn put_season_record(&mut self, record: SeasonRecord) {
        self.seasons.insert(record.season.as_u32(), record);
    }

    fn latest_season(&self) -> Option<Season> {
        self.seasons.keys().next_back().map(|&index| Season::new(index))
    }

    fn yield_snapshot(&self, season: Season, window: u32) -> Option<YieldSnapshot> {
        self.yields.get(&(season.as_u32(), window)).cloned()
    }

    fn put_yield_snapshot(&mut self, snapshot: YieldSnapshot) -> bool {
        let key = (snapshot.season.as_u32(), snapshot.window);
        if self.yields.contains_key(&key) {
            return false;
        }
        self.yields.insert(key, snapshot);
        true
    }

    fn token_yield_snapshot(
        &self,
        token: &Token,
        season: Season,
        window: u32,
    ) -> Option<TokenYieldSnapshot> {
        self.token_yields
            .get(&(token.clone(), season.as_u32(), window))
            .cloned()
    }

    fn put_token_yield_snapshot(&mut self, snapshot: TokenYieldSnapshot) {
        let key = (snapshot.token.clone(), snapshot.season.as_u32(), snapshot.window);
        self.token_yields.insert(key, snapshot);
    }

    fn fertilizer_yield_snapshot(
        &self,
        season: Season,
        window: u32,
    ) -> Option<FertilizerYieldSnapshot> {
        self.fertilizer_yields
            .get(&(season.as_u32(), window))
            .cloned()
    }

    fn put_fertilizer_yield_snapshot(&mut self, snapshot: FertilizerYieldSnapshot) {
        let key = (snapshot.season.as_u32(), snapshot.window);
        self.fertilizer_yields.insert(key, snapshot);
    }

    fn yield_snapshots(&self) -> Vec<YieldSnapshot> {
        self.yields.values().cloned().collect()
    }

    fn token_yield_snapshots(&self) -> Vec<TokenYieldSnapshot> {
        self.token_yields.values().cloned().collect()
    }

    fn fertilizer_yield_snapshots(&self) -> Vec<FertilizerYieldSnapshot> {
        self.fertilizer_yields.values().cloned().collect()
    }
}
