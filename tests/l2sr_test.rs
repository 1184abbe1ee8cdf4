use seedgauge::domain::AssetClass;
use seedgauge::engine::l2sr::{liquidity_to_supply_ratio, locked_supply, weighted_liquidity_usd};
use seedgauge::engine::ledger::Ledger;
use seedgauge::feeds::{LockedClassConfig, StaticFeeds, TokenConfig};
use seedgauge::{Decimal, PoolId, Season, Token};

const BEAN_6: i128 = 1_000_000;
const WETH_18: i128 = 1_000_000_000_000_000_000;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn bean() -> Token {
    Token::new("BEAN")
}

fn weth() -> Token {
    Token::new("WETH")
}

fn wsteth() -> Token {
    Token::new("WSTETH")
}

/// Two whitelisted LP tokens backed by one pool each.
fn feeds() -> StaticFeeds {
    let mut feeds = StaticFeeds::new(bean());
    feeds.whitelist_token(bean(), TokenConfig::default());
    feeds.whitelist_token(
        Token::new("BEAN:WETH"),
        TokenConfig {
            pool: Some(PoolId::new("pool-weth")),
            ..Default::default()
        },
    );
    feeds.whitelist_token(
        Token::new("BEAN:WSTETH"),
        TokenConfig {
            pool: Some(PoolId::new("pool-wsteth")),
            ..Default::default()
        },
    );
    feeds.whitelist_token(
        weth(),
        TokenConfig {
            decimals: 18,
            ..Default::default()
        },
    );
    feeds.whitelist_token(
        wsteth(),
        TokenConfig {
            decimals: 18,
            ..Default::default()
        },
    );
    feeds.set_price(bean(), d("1"));
    feeds.set_price(weth(), d("1000"));
    feeds.set_price(wsteth(), d("1000"));
    feeds
}

/// Each pool holds one million USD of non-reference liquidity, at different
/// reserve ratios (1000:1 and 1:1) and token decimals.
fn ledger(feeds: &StaticFeeds) -> Ledger {
    let mut ledger = Ledger::new();
    ledger.register_pool(PoolId::new("pool-weth"), [bean(), weth()]);
    ledger.register_pool(PoolId::new("pool-wsteth"), [bean(), wsteth()]);
    ledger
        .add_liquidity(
            &PoolId::new("pool-weth"),
            [1_000_000 * BEAN_6, 1000 * WETH_18],
            1_000_000 * BEAN_6,
            None,
            feeds,
        )
        .unwrap();
    ledger
        .add_liquidity(
            &PoolId::new("pool-wsteth"),
            [1000 * BEAN_6, 1000 * WETH_18],
            1000 * BEAN_6,
            None,
            feeds,
        )
        .unwrap();
    ledger
}

#[test]
fn test_supply_fully_backed_by_liquidity() {
    let mut feeds = feeds();
    feeds.set_circulating_supply(Decimal::from_int(2_000_000));
    let ledger = ledger(&feeds);

    assert_eq!(
        weighted_liquidity_usd(&ledger, &feeds),
        Decimal::from_int(2_000_000)
    );
    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        Decimal::one()
    );
}

#[test]
fn test_supply_scaling_moves_the_ratio_inversely() {
    let mut feeds = feeds();
    feeds.set_circulating_supply(Decimal::from_int(4_000_000));
    let ledger = ledger(&feeds);
    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        d("0.5")
    );

    feeds.set_circulating_supply(Decimal::from_int(1_000_000));
    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        Decimal::from_int(2)
    );
}

#[test]
fn test_zero_liquidity_is_zero_not_an_error() {
    let mut feeds = feeds();
    feeds.set_circulating_supply(Decimal::from_int(2_000_000));
    let mut ledger = Ledger::new();
    ledger.register_pool(PoolId::new("pool-weth"), [bean(), weth()]);
    ledger.register_pool(PoolId::new("pool-wsteth"), [bean(), wsteth()]);

    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        Decimal::zero()
    );
}

#[test]
fn test_zero_supply_is_zero_not_an_error() {
    let feeds = feeds();
    let ledger = ledger(&feeds);
    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        Decimal::zero()
    );
}

#[test]
fn test_liquidity_weight_scales_the_numerator() {
    let mut feeds = feeds();
    feeds.set_circulating_supply(Decimal::from_int(2_000_000));
    feeds.tokens.get_mut(&Token::new("BEAN:WSTETH")).unwrap().liquidity_weight = d("0.5");
    let ledger = ledger(&feeds);

    assert_eq!(
        weighted_liquidity_usd(&ledger, &feeds),
        Decimal::from_int(1_500_000)
    );
}

#[test]
fn test_locked_supply_reduces_the_denominator() {
    let mut feeds = feeds();
    feeds.set_circulating_supply(Decimal::from_int(3_000_000));
    feeds.add_locked_class(
        AssetClass::new("urBEAN"),
        LockedClassConfig {
            recap_fraction: d("0.5"),
            underlying_value: Decimal::from_int(2_000_000),
        },
    );
    let ledger = ledger(&feeds);

    // 2M underlying * 0.5 recap * (1 - 0) progress leaves 1M locked.
    assert_eq!(
        locked_supply(&feeds, Season::new(100)),
        Decimal::from_int(1_000_000)
    );
    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        Decimal::one()
    );

    // Fully redeemed claims release the locked supply.
    feeds.set_redemption_progress(Decimal::one());
    assert_eq!(locked_supply(&feeds, Season::new(100)), Decimal::zero());
    assert_eq!(
        liquidity_to_supply_ratio(&ledger, &feeds, Season::new(100)),
        d("0.6666666666666666666666666667")
    );
}

#[test]
fn test_locked_supply_ignores_spot_reserves() {
    let mut feeds = feeds();
    feeds.set_circulating_supply(Decimal::from_int(3_000_000));
    feeds.add_locked_class(
        AssetClass::new("urBEAN"),
        LockedClassConfig {
            recap_fraction: d("0.5"),
            underlying_value: Decimal::from_int(2_000_000),
        },
    );
    let mut ledger = ledger(&feeds);
    let before = locked_supply(&feeds, Season::new(100));

    // A large one-sided deposit distorts the pool, not the locked supply.
    ledger
        .add_liquidity(
            &PoolId::new("pool-weth"),
            [50_000_000 * BEAN_6, 0],
            0,
            None,
            &feeds,
        )
        .unwrap();

    assert_eq!(locked_supply(&feeds, Season::new(100)), before);
}
