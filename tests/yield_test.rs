use seedgauge::domain::{Event, EventKind, EventOrderingKey};
use seedgauge::engine::ema::{ROLLING_24_WINDOW, ROLLING_30_DAY_WINDOW, ROLLING_7_DAY_WINDOW};
use seedgauge::engine::{Engine, EngineParams};
use seedgauge::feeds::{StaticFeeds, TokenConfig};
use seedgauge::{Decimal, Season, Token};

fn params() -> EngineParams {
    EngineParams {
        first_eligible_season: 0,
        cached_season_cutoff: 0,
        initial_ratio_pct: Decimal::from_int(50),
    }
}

fn bean() -> Token {
    Token::new("BEAN")
}

fn feeds() -> StaticFeeds {
    let mut feeds = StaticFeeds::new(bean());
    feeds.whitelist_token(
        bean(),
        TokenConfig {
            reward_weight: Decimal::from_int(3),
            ..Default::default()
        },
    );
    feeds.total_stalk = Decimal::from_int(1_000_000);
    feeds.total_seeds = Decimal::from_int(2_000_000);
    feeds
}

fn season_event(season: u32, mint_delta: i64) -> Event {
    Event::new(
        EventOrderingKey::new(season as u64, 0),
        EventKind::SeasonAdvance {
            season: Season::new(season),
            timestamp: 1_700_000_000 + season as i64 * 3600,
            mint_delta: Decimal::from_int(mint_delta),
        },
    )
}

#[test]
fn test_first_sample_equals_its_mint_delta() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    engine.process_event(&season_event(1, 250), &feeds).unwrap();

    for window in [ROLLING_24_WINDOW, ROLLING_7_DAY_WINDOW, ROLLING_30_DAY_WINDOW] {
        let snapshot = engine.yield_snapshot(Season::new(1), window);
        assert_eq!(snapshot.u, 1);
        assert_eq!(snapshot.beta, Decimal::one());
        assert_eq!(snapshot.beans_per_season_ema, Decimal::from_int(250));
    }
}

#[test]
fn test_constant_mint_reaches_steady_state() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    for season in 1..=60 {
        engine.process_event(&season_event(season, 100), &feeds).unwrap();
    }

    for season in 1..=60 {
        let ema = engine
            .yield_snapshot(Season::new(season), ROLLING_24_WINDOW)
            .beans_per_season_ema;
        assert!(ema.is_positive());
        assert!(ema <= Decimal::from_int(100));
    }
    // Once the window saturates the smoothing is fixed and every season sees
    // the same 24 constant samples: 100 * (1 - 0.92^24), just over 86.
    let settled = engine
        .yield_snapshot(Season::new(24), ROLLING_24_WINDOW)
        .beans_per_season_ema;
    assert!(settled > Decimal::from_int(86));
    assert!(settled < Decimal::from_int(87));
    for season in 25..=60 {
        let ema = engine
            .yield_snapshot(Season::new(season), ROLLING_24_WINDOW)
            .beans_per_season_ema;
        assert_eq!(ema, settled, "steady state broken at season {season}");
    }
}

#[test]
fn test_window_saturates_sample_count() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    for season in 1..=30 {
        engine.process_event(&season_event(season, 100), &feeds).unwrap();
    }

    let snapshot = engine.yield_snapshot(Season::new(30), ROLLING_24_WINDOW);
    assert_eq!(snapshot.u, 24);
    assert_eq!(
        snapshot.beta,
        Decimal::from_int(2) / Decimal::from_int(25)
    );
    // The 30-day window is not yet saturated.
    let snapshot = engine.yield_snapshot(Season::new(30), ROLLING_30_DAY_WINDOW);
    assert_eq!(snapshot.u, 30);
}

#[test]
fn test_skipped_seasons_read_as_zero_mint() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    engine.process_event(&season_event(1, 100), &feeds).unwrap();
    engine.process_event(&season_event(5, 100), &feeds).unwrap();

    // Seasons 2-4 never happened; they dilute the average as zero samples.
    let ema = engine
        .yield_snapshot(Season::new(5), ROLLING_24_WINDOW)
        .beans_per_season_ema;
    assert!(ema.is_positive());
    assert!(ema < Decimal::from_int(100));
}

#[test]
fn test_positive_mint_produces_positive_apy() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    for season in 1..=24 {
        engine.process_event(&season_event(season, 1000), &feeds).unwrap();
    }

    let snapshot = engine.token_yield_snapshot(&bean(), Season::new(24), ROLLING_24_WINDOW);
    assert!(snapshot.bean_apy.is_positive());
    assert!(snapshot.stalk_apy.is_positive());
}

#[test]
fn test_zero_mint_produces_zero_apy() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    engine.process_event(&season_event(1, 0), &feeds).unwrap();

    let snapshot = engine.token_yield_snapshot(&bean(), Season::new(1), ROLLING_24_WINDOW);
    assert_eq!(snapshot.bean_apy, Decimal::zero());
    assert_eq!(snapshot.stalk_apy, Decimal::zero());
}

#[test]
fn test_fertilizer_yield_tracks_the_window_ema() {
    let mut engine = Engine::new(params()).unwrap();
    let mut feeds = feeds();
    feeds.set_humidity_millis(Decimal::from_int(500));
    feeds.set_outstanding_fertilizer(Decimal::from_int(1000));
    engine.process_event(&season_event(1, 100), &feeds).unwrap();

    let fert = engine
        .fertilizer_yield_snapshot(Season::new(1), ROLLING_24_WINDOW)
        .unwrap();
    assert_eq!(fert.humidity, Decimal::from_int(1) / Decimal::from_int(2));
    assert_eq!(fert.outstanding_fertilizer, Decimal::from_int(1000));
    // First sample: EMA equals the mint delta, spread over 1000 fert.
    assert_eq!(fert.beans_per_season_ema, Decimal::from_int(100));
    assert_eq!(fert.delta_bpf, Decimal::from_int(1) / Decimal::from_int(10));
    // 0.5 / ((1.5 / 0.1) / 8760) = 292
    assert!(fert.simple_apy > Decimal::from_int(291));
    assert!(fert.simple_apy < Decimal::from_int(293));
}

#[test]
fn test_fertilizer_humidity_read_failure_falls_back() {
    let mut engine = Engine::new(params()).unwrap();
    let mut feeds = feeds();
    feeds.clear_humidity();
    feeds.set_outstanding_fertilizer(Decimal::from_int(1000));
    engine.process_event(&season_event(1, 100), &feeds).unwrap();

    let fert = engine
        .fertilizer_yield_snapshot(Season::new(1), ROLLING_24_WINDOW)
        .unwrap();
    assert_eq!(fert.humidity, Decimal::from_int(1) / Decimal::from_int(2));
    assert!(fert.simple_apy.is_positive());
}

#[test]
fn test_no_outstanding_fertilizer_yields_zero_not_an_error() {
    let mut engine = Engine::new(params()).unwrap();
    let feeds = feeds();
    engine.process_event(&season_event(1, 100), &feeds).unwrap();

    let fert = engine
        .fertilizer_yield_snapshot(Season::new(1), ROLLING_24_WINDOW)
        .unwrap();
    assert_eq!(fert.delta_bpf, Decimal::zero());
    assert_eq!(fert.simple_apy, Decimal::zero());
}

#[test]
fn test_unknown_snapshot_reads_as_empty() {
    let engine = Engine::new(params()).unwrap();
    let snapshot = engine.yield_snapshot(Season::new(999), ROLLING_24_WINDOW);
    assert_eq!(snapshot.u, 0);
    assert_eq!(snapshot.beans_per_season_ema, Decimal::zero());
}
