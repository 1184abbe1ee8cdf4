//! Fertilizer yield: the share of seasonal mints accruing to unfertilized
//! fertilizer, annualized against the humidity payout.

use crate::domain::{Decimal, FertilizerYieldSnapshot, Season};
use crate::feeds::Feeds;

use super::apy::SIMULATED_SEASONS;

/// Humidity applied when the upstream read fails, in thousandths.
pub const LAUNCH_HUMIDITY_MILLIS: i64 = 500;

/// Compute the fertilizer yield snapshot for one (season, window) pair.
///
/// `delta_bpf` is the window's mint-rate EMA spread over outstanding
/// fertilizer; zero outstanding fertilizer resolves to zero rather than an
/// error. The simple APY annualizes the time to repay `1 + humidity` beans
/// per fertilizer at that rate.
pub fn fertilizer_yield(
    feeds: &dyn Feeds,
    season: Season,
    window: u32,
    beans_per_season_ema: Decimal,
    created_at: i64,
) -> FertilizerYieldSnapshot {
    let humidity = feeds
        .current_humidity_millis(season)
        .unwrap_or_else(|| Decimal::from_int(LAUNCH_HUMIDITY_MILLIS))
        / Decimal::from_int(1000);
    let outstanding_fertilizer = feeds.outstanding_fertilizer(season);

    let delta_bpf = if outstanding_fertilizer.is_positive() {
        beans_per_season_ema / outstanding_fertilizer
    } else {
        Decimal::zero()
    };

    let simple_apy = if delta_bpf.is_zero() {
        Decimal::zero()
    } else {
        let seasons_per_year = Decimal::from_int(SIMULATED_SEASONS as i64);
        humidity / ((Decimal::one() + humidity) / delta_bpf / seasons_per_year)
    };

    FertilizerYieldSnapshot {
        season,
        window,
        humidity,
        outstanding_fertilizer,
        beans_per_season_ema,
        delta_bpf,
        simple_apy,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::StaticFeeds;
    use crate::Token;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_humidity_falls_back_to_launch_value() {
        let feeds = StaticFeeds::new(Token::new("BEAN"));
        let snapshot = fertilizer_yield(&feeds, Season::new(25_000), 24, Decimal::zero(), 0);
        assert_eq!(snapshot.humidity, d("0.5"));
    }

    #[test]
    fn test_zero_outstanding_fertilizer_resolves_to_zero() {
        let mut feeds = StaticFeeds::new(Token::new("BEAN"));
        feeds.set_humidity_millis(Decimal::from_int(250));
        let snapshot =
            fertilizer_yield(&feeds, Season::new(25_000), 24, Decimal::from_int(100), 0);
        assert_eq!(snapshot.delta_bpf, Decimal::zero());
        assert_eq!(snapshot.simple_apy, Decimal::zero());
    }

    #[test]
    fn test_simple_apy_annualizes_the_payback_rate() {
        let mut feeds = StaticFeeds::new(Token::new("BEAN"));
        feeds.set_humidity_millis(Decimal::from_int(500));
        feeds.set_outstanding_fertilizer(Decimal::from_int(1000));
        let snapshot =
            fertilizer_yield(&feeds, Season::new(25_000), 24, Decimal::from_int(1), 0);
        assert_eq!(snapshot.delta_bpf, d("0.001"));
        // 0.5 / ((1.5 / 0.001) / 8760) = 2.92
        assert!(snapshot.simple_apy > d("2.9199"));
        assert!(snapshot.simple_apy < d("2.9201"));
    }

    #[test]
    fn test_zero_ema_yields_zero_apy() {
        let mut feeds = StaticFeeds::new(Token::new("BEAN"));
        feeds.set_humidity_millis(Decimal::from_int(500));
        feeds.set_outstanding_fertilizer(Decimal::from_int(1000));
        let snapshot = fertilizer_yield(&feeds, Season::new(25_000), 24, Decimal::zero(), 0);
        assert_eq!(snapshot.simple_apy, Decimal::zero());
        assert_eq!(snapshot.outstanding_fertilizer, Decimal::from_int(1000));
    }
}
