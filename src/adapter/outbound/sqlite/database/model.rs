//! Database model types for Diesel ORM.
//!
//! Decimals are stored as TEXT so prices and profits round-trip exactly.
//! Timestamps are RFC 3339 TEXT with a fixed width so that lexical order
//! matches chronological order.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{
    arbitrage_bet_sides, arbitrage_opportunities, market_matches, markets, option_matches,
    options, price_snapshots,
};
use crate::domain::{
    ArbitrageId, ArbitrageOpportunity, BetSide, Market, MarketMatch, MarketOption, NewOpportunity,
    OptionMatch, PriceSnapshot, RecordedSides,
};
use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::Parse(format!("decimal {raw:?}: {e}")))
}

fn parse_side(raw: &str) -> Result<BetSide> {
    BetSide::from_str(raw).map_err(Error::from)
}

/// Database row for a market.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub market_id: String,
    pub title: String,
    pub expiration_date: Option<String>,
    pub platform: String,
    pub status: String,
    pub is_arbitrage: String,
}

impl MarketRow {
    pub fn from_domain(market: &Market) -> Self {
        Self {
            market_id: market.id.to_string(),
            title: market.title.clone(),
            expiration_date: market
                .expiration_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            platform: market.platform.to_string(),
            status: market.status.as_str().to_string(),
            is_arbitrage: market.is_arbitrage.as_str().to_string(),
        }
    }

    pub fn into_domain(self) -> Result<Market> {
        let expiration_date = self
            .expiration_date
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                    .map_err(|e| Error::Parse(format!("date {raw:?}: {e}")))
            })
            .transpose()?;
        Ok(Market {
            id: self.market_id.into(),
            title: self.title,
            expiration_date,
            platform: self.platform.into(),
            status: self.status.parse()?,
            is_arbitrage: self.is_arbitrage.parse()?,
        })
    }
}

/// Database row for an option.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = options)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OptionRow {
    pub option_id: String,
    pub market_id: String,
    pub name: String,
    pub outcome: String,
}

impl OptionRow {
    pub fn from_domain(option: &MarketOption) -> Self {
        Self {
            option_id: option.id.to_string(),
            market_id: option.market_id.to_string(),
            name: option.name.clone(),
            outcome: option.outcome.as_str().to_string(),
        }
    }

    pub fn into_domain(self) -> Result<MarketOption> {
        Ok(MarketOption {
            id: self.option_id.into(),
            market_id: self.market_id.into(),
            name: self.name,
            outcome: self.outcome.parse()?,
        })
    }
}

/// Database row for a price snapshot.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = price_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotRow {
    pub option_id: String,
    pub timestamp: String,
    pub volume: String,
    pub yes_price: String,
    pub no_price: String,
}

impl SnapshotRow {
    pub fn from_domain(snapshot: &PriceSnapshot) -> Self {
        Self {
            option_id: snapshot.option_id.to_string(),
            timestamp: format_timestamp(&snapshot.timestamp),
            volume: snapshot.volume.to_string(),
            yes_price: snapshot.yes_price.to_string(),
            no_price: snapshot.no_price.to_string(),
        }
    }

    pub fn into_domain(self) -> Result<PriceSnapshot> {
        Ok(PriceSnapshot {
            option_id: self.option_id.into(),
            timestamp: parse_timestamp(&self.timestamp)?,
            volume: parse_decimal(&self.volume)?,
            yes_price: parse_decimal(&self.yes_price)?,
            no_price: parse_decimal(&self.no_price)?,
        })
    }
}

/// Database row for a market match.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = market_matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketMatchRow {
    pub event_id: i32,
    pub market_id_1: String,
    pub description_1: String,
    pub platform_1: String,
    pub market_id_2: String,
    pub description_2: String,
    pub platform_2: String,
}

impl MarketMatchRow {
    pub fn from_domain(m: &MarketMatch) -> Self {
        Self {
            event_id: m.event_id,
            market_id_1: m.market_id_1.to_string(),
            description_1: m.description_1.clone(),
            platform_1: m.platform_1.to_string(),
            market_id_2: m.market_id_2.to_string(),
            description_2: m.description_2.clone(),
            platform_2: m.platform_2.to_string(),
        }
    }

    pub fn into_domain(self) -> MarketMatch {
        MarketMatch {
            event_id: self.event_id,
            market_id_1: self.market_id_1.into(),
            description_1: self.description_1,
            platform_1: self.platform_1.into(),
            market_id_2: self.market_id_2.into(),
            description_2: self.description_2,
            platform_2: self.platform_2.into(),
        }
    }
}

/// Database row for an option match (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = option_matches)]
pub struct NewOptionMatchRow {
    pub event_id: i32,
    pub option_id_1: String,
    pub name_1: String,
    pub option_id_2: String,
    pub name_2: String,
}

impl NewOptionMatchRow {
    pub fn from_domain(m: &OptionMatch) -> Self {
        Self {
            event_id: m.event_id,
            option_id_1: m.option_id_1.to_string(),
            name_1: m.name_1.clone(),
            option_id_2: m.option_id_2.to_string(),
            name_2: m.name_2.clone(),
        }
    }
}

/// Database row for an option match (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = option_matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OptionMatchRow {
    pub id: Option<i32>,
    pub event_id: i32,
    pub option_id_1: String,
    pub name_1: String,
    pub option_id_2: String,
    pub name_2: String,
}

impl OptionMatchRow {
    pub fn into_domain(self) -> OptionMatch {
        OptionMatch {
            event_id: self.event_id,
            option_id_1: self.option_id_1.into(),
            name_1: self.name_1,
            option_id_2: self.option_id_2.into(),
            name_2: self.name_2,
        }
    }
}

/// Database row for an arbitrage opportunity (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = arbitrage_opportunities)]
pub struct NewOpportunityRow {
    pub contract_id_1: String,
    pub contract_id_2: String,
    pub profit: String,
    pub timestamp: String,
}

impl NewOpportunityRow {
    pub fn from_domain(opportunity: &NewOpportunity) -> Self {
        Self {
            contract_id_1: opportunity.contract_1.to_string(),
            contract_id_2: opportunity.contract_2.to_string(),
            profit: opportunity.profit.to_string(),
            timestamp: format_timestamp(&opportunity.detected_at),
        }
    }
}

/// Database row for an arbitrage opportunity (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = arbitrage_opportunities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OpportunityRow {
    pub arb_id: Option<i32>,
    pub contract_id_1: String,
    pub contract_id_2: String,
    pub profit: String,
    pub timestamp: String,
}

impl OpportunityRow {
    pub fn into_domain(self, sides: RecordedSides) -> Result<ArbitrageOpportunity> {
        let arb_id = self
            .arb_id
            .ok_or_else(|| Error::Database("opportunity row without arb_id".into()))?;
        Ok(ArbitrageOpportunity {
            arb_id: ArbitrageId::new(arb_id),
            contract_id_1: self.contract_id_1.into(),
            contract_id_2: self.contract_id_2.into(),
            side_1: sides.side_1,
            side_2: sides.side_2,
            profit: parse_decimal(&self.profit)?,
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

/// Database row for the sides of an arbitrage opportunity.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = arbitrage_bet_sides)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BetSidesRow {
    pub arb_id: i32,
    pub side_1: String,
    pub side_2: String,
}

impl BetSidesRow {
    pub fn new(arb_id: i32, side_1: BetSide, side_2: BetSide) -> Self {
        Self {
            arb_id,
            side_1: side_1.as_str().to_string(),
            side_2: side_2.as_str().to_string(),
        }
    }

    pub fn into_domain(self) -> Result<RecordedSides> {
        Ok(RecordedSides {
            side_1: parse_side(&self.side_1)?,
            side_2: parse_side(&self.side_2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 11, 2, 3, 4, 5).unwrap();
        assert!(format_timestamp(&early) < format_timestamp(&late));
        assert_eq!(parse_timestamp(&format_timestamp(&early)).unwrap(), early);
    }

    #[test]
    fn market_row_keeps_expiration_and_flags() {
        let market = Market::new(
            "m-1",
            "Fed cuts in March",
            "kalshi",
            NaiveDate::from_ymd_opt(2024, 3, 20),
        );
        let back = MarketRow::from_domain(&market).into_domain().unwrap();
        assert_eq!(back, market);
    }

    #[test]
    fn snapshot_row_preserves_decimal_precision() {
        let snapshot = PriceSnapshot::try_new(
            "o-1",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            dec!(1250),
            dec!(0.4025),
            dec!(0.5975),
        )
        .unwrap();
        let row = SnapshotRow::from_domain(&snapshot);
        assert_eq!(row.yes_price, "0.4025");
        assert_eq!(row.into_domain().unwrap(), snapshot);
    }

    #[test]
    fn unknown_side_text_is_rejected() {
        let row = BetSidesRow {
            arb_id: 1,
            side_1: "MAYBE".into(),
            side_2: "NO".into(),
        };
        assert!(row.into_domain().is_err());
    }
}
