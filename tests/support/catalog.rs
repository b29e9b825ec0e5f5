use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crossedge::adapter::outbound::sqlite::SqliteStore;
use crossedge::domain::{Market, MarketMatch, MarketOption, OptionMatch, PriceSnapshot};
use crossedge::port::outbound::store::{CatalogStore, MaintenanceStore};

/// One side of a matched pair: a market with a single option.
pub struct Leg<'a> {
    pub market: &'a str,
    pub option: &'a str,
    pub platform: &'a str,
    /// Latest yes/no quote on the platform's native scale, if any.
    pub quote: Option<(Decimal, Decimal)>,
}

impl<'a> Leg<'a> {
    pub fn priced(
        market: &'a str,
        option: &'a str,
        platform: &'a str,
        yes: Decimal,
        no: Decimal,
    ) -> Self {
        Self {
            market,
            option,
            platform,
            quote: Some((yes, no)),
        }
    }

    pub fn unpriced(market: &'a str, option: &'a str, platform: &'a str) -> Self {
        Self {
            market,
            option,
            platform,
            quote: None,
        }
    }
}

pub fn at_hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 4, hour, 0, 0).unwrap()
}

pub async fn seed_market(store: &SqliteStore, id: &str, platform: &str) {
    let market = Market::new(id, format!("Market {id}"), platform, None);
    store.upsert_market(&market).await.expect("upsert market");
}

pub async fn seed_option(store: &SqliteStore, option: &str, market: &str) {
    let option = MarketOption::new(option, market, format!("Option {option}"));
    store.upsert_option(&option).await.expect("upsert option");
}

pub async fn seed_quote(store: &SqliteStore, option: &str, hour: u32, yes: Decimal, no: Decimal) {
    let snapshot = PriceSnapshot::try_new(option, at_hour(hour), dec!(100), yes, no)
        .expect("valid snapshot");
    store.append_snapshot(&snapshot).await.expect("append snapshot");
}

pub async fn seed_leg(store: &SqliteStore, leg: &Leg<'_>) {
    seed_market(store, leg.market, leg.platform).await;
    seed_option(store, leg.option, leg.market).await;
    if let Some((yes, no)) = leg.quote {
        seed_quote(store, leg.option, 12, yes, no).await;
    }
}

pub fn option_match(event_id: i32, option_1: &str, option_2: &str) -> OptionMatch {
    OptionMatch {
        event_id,
        option_id_1: option_1.into(),
        name_1: format!("Option {option_1}"),
        option_id_2: option_2.into(),
        name_2: format!("Option {option_2}"),
    }
}

/// Seed both legs, the market match between them and the option match.
pub async fn seed_pair(store: &SqliteStore, event_id: i32, a: Leg<'_>, b: Leg<'_>) {
    seed_leg(store, &a).await;
    seed_leg(store, &b).await;

    let market_match = MarketMatch {
        event_id,
        market_id_1: a.market.into(),
        description_1: format!("Market {}", a.market),
        platform_1: a.platform.into(),
        market_id_2: b.market.into(),
        description_2: format!("Market {}", b.market),
        platform_2: b.platform.into(),
    };
    store
        .upsert_market_match(&market_match)
        .await
        .expect("upsert market match");
    store
        .save_option_matches(&[option_match(event_id, a.option, b.option)])
        .await
        .expect("save option match");
}
