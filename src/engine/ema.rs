//! Rolling EMA of protocol-wide mint rates.
//!
//! For a target season `t` and window `w`, the tracker recomputes the EMA
//! over the whole effective sample rather than updating incrementally: while
//! fewer than `w` seasons of history exist, beta itself changes with every
//! season, so an incremental update would be wrong. The O(window) recompute
//! per call is intentional.

use crate::domain::{Decimal, Season};
use crate::store::SnapshotStore;

pub const ROLLING_24_WINDOW: u32 = 24;
pub const ROLLING_7_DAY_WINDOW: u32 = 168;
pub const ROLLING_30_DAY_WINDOW: u32 = 720;

/// All rolling windows tracked per season.
pub const EMA_WINDOWS: [u32; 3] = [ROLLING_24_WINDOW, ROLLING_7_DAY_WINDOW, ROLLING_30_DAY_WINDOW];

/// Result of one window computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEma {
    /// Effective sample count: min(t - first eligible season, window).
    pub u: u32,
    /// Smoothing factor 2 / (u + 1).
    pub beta: Decimal,
    pub beans_per_season_ema: Decimal,
}

/// EMA tracker over the per-season mint-delta series in the snapshot store.
#[derive(Debug, Clone, Copy)]
pub struct EmaTracker {
    /// Season before the first one carrying a usable mint delta.
    pub first_eligible_season: u32,
    /// Seasons at or below this index defer to pre-computed cached values;
    /// only the whitelist is propagated into their snapshots.
    pub cached_season_cutoff: u32,
}

impl EmaTracker {
    pub fn new(first_eligible_season: u32, cached_season_cutoff: u32) -> Self {
        EmaTracker {
            first_eligible_season,
            cached_season_cutoff,
        }
    }

    /// Whether `season` predates dense history and should skip computation.
    pub fn is_cached(&self, season: Season) -> bool {
        season.as_u32() <= self.cached_season_cutoff
    }

    /// Compute (u, beta, EMA) for `season` over `window`.
    ///
    /// Missing season records read as a zero mint delta. Seasons at or below
    /// the first eligible season produce a zero-sample result.
    pub fn window_ema(&self, store: &dyn SnapshotStore, season: Season, window: u32) -> WindowEma {
        let t = season.as_u32();
        if t <= self.first_eligible_season {
            return WindowEma {
                u: 0,
                beta: Decimal::zero(),
                beans_per_season_ema: Decimal::zero(),
            };
        }

        let available = t - self.first_eligible_season;
        let u = available.min(window);
        let beta = Decimal::from_int(2) / Decimal::from_int(u as i64 + 1);

        // When less than `window` data points are available, smooth over
        // whatever exists (beta has changed, so start from the first eligible
        // season). Otherwise use exactly the most recent `window` seasons.
        let start = if u < window {
            self.first_eligible_season + 1
        } else {
            t - window + 1
        };

        let mut prior = Decimal::zero();
        for i in start..=t {
            let delta = store
                .season_record(Season::new(i))
                .map(|record| record.mint_delta)
                .unwrap_or_else(Decimal::zero);
            prior = (delta - prior) * beta + prior;
        }

        WindowEma {
            u,
            beta,
            beans_per_season_ema: prior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeasonRecord;
    use crate::store::MemoryStore;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn store_with_constant_deltas(first: u32, last: u32, delta: Decimal) -> MemoryStore {
        let mut store = MemoryStore::new();
        for season in first..=last {
            store.put_season_record(SeasonRecord {
                season: Season::new(season),
                timestamp: season as i64 * 3600,
                mint_delta: delta,
            });
        }
        store
    }

    #[test]
    fn test_u_and_beta_with_partial_history() {
        let tracker = EmaTracker::new(100, 0);
        let store = store_with_constant_deltas(101, 110, d("5"));

        let result = tracker.window_ema(&store, Season::new(110), ROLLING_24_WINDOW);
        assert_eq!(result.u, 10);
        assert_eq!(result.beta, d("2") / d("11"));
    }

    #[test]
    fn test_u_caps_at_window() {
        let tracker = EmaTracker::new(100, 0);
        let store = store_with_constant_deltas(101, 200, d("5"));

        let result = tracker.window_ema(&store, Season::new(200), ROLLING_24_WINDOW);
        assert_eq!(result.u, 24);
        assert_eq!(result.beta, d("2") / d("25"));
    }

    #[test]
    fn test_constant_series_reaches_steady_state() {
        let tracker = EmaTracker::new(100, 0);
        let store = store_with_constant_deltas(101, 900, d("42"));

        // Each recompute smooths 24 constant samples from zero, so every
        // saturated season lands on 42 * (1 - 0.92^24), just over 36.3.
        let result = tracker.window_ema(&store, Season::new(900), ROLLING_24_WINDOW);
        assert!(result.beans_per_season_ema > d("36"));
        assert!(result.beans_per_season_ema < d("37"));

        let earlier = tracker.window_ema(&store, Season::new(500), ROLLING_24_WINDOW);
        assert_eq!(earlier.beans_per_season_ema, result.beans_per_season_ema);
    }

    #[test]
    fn test_missing_seasons_read_as_zero() {
        let tracker = EmaTracker::new(100, 0);
        let store = MemoryStore::new();

        let result = tracker.window_ema(&store, Season::new(150), ROLLING_24_WINDOW);
        assert_eq!(result.beans_per_season_ema, Decimal::zero());
        assert_eq!(result.u, 24);
    }

    #[test]
    fn test_season_at_or_before_first_eligible() {
        let tracker = EmaTracker::new(100, 0);
        let store = MemoryStore::new();

        let result = tracker.window_ema(&store, Season::new(100), ROLLING_24_WINDOW);
        assert_eq!(result.u, 0);
        assert_eq!(result.beta, Decimal::zero());
        assert_eq!(result.beans_per_season_ema, Decimal::zero());
    }

    #[test]
    fn test_cached_cutoff() {
        let tracker = EmaTracker::new(6074, 20_000);
        assert!(tracker.is_cached(Season::new(20_000)));
        assert!(!tracker.is_cached(Season::new(20_001)));
    }
}
