//! Markets (contracts) tracked by a single platform.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{MarketId, Platform};

/// Lifecycle status of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Still trading.
    #[default]
    Open,
    /// Expiration date has elapsed.
    Closed,
}

impl MarketStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(DomainError::UnknownVariant {
                kind: "market status",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether a market has ever produced a recorded arbitrage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArbitrageFlag {
    Yes,
    #[default]
    No,
}

impl ArbitrageFlag {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl FromStr for ArbitrageFlag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            other => Err(DomainError::UnknownVariant {
                kind: "arbitrage flag",
                value: other.to_string(),
            }),
        }
    }
}

/// A real-world binary-outcome event tracked by one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub title: String,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    pub platform: Platform,
    #[serde(default)]
    pub status: MarketStatus,
    #[serde(default)]
    pub is_arbitrage: ArbitrageFlag,
}

impl Market {
    /// Create an open market that has not yet produced an arbitrage.
    pub fn new(
        id: impl Into<MarketId>,
        title: impl Into<String>,
        platform: impl Into<Platform>,
        expiration_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            expiration_date,
            platform: platform.into(),
            status: MarketStatus::Open,
            is_arbitrage: ArbitrageFlag::No,
        }
    }

    /// True when the market is open and its expiration date is before `today`.
    ///
    /// Markets without an expiration date never expire.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.status == MarketStatus::Open
            && self.expiration_date.is_some_and(|date| date < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn expires_strictly_after_expiration_date() {
        let market = Market::new("m1", "Fed decision", "kalshi", Some(date("2024-12-18")));

        assert!(!market.is_expired(date("2024-12-18")));
        assert!(market.is_expired(date("2024-12-19")));
    }

    #[test]
    fn market_without_expiration_never_expires() {
        let market = Market::new("m1", "Open ended", "polymarket", None);
        assert!(!market.is_expired(date("2099-01-01")));
    }

    #[test]
    fn closed_market_is_not_reported_expired() {
        let mut market = Market::new("m1", "Fed", "kalshi", Some(date("2024-01-01")));
        market.status = MarketStatus::Closed;
        assert!(!market.is_expired(date("2025-01-01")));
    }

    #[test]
    fn status_parses_storage_form() {
        assert_eq!("open".parse::<MarketStatus>().unwrap(), MarketStatus::Open);
        assert_eq!("closed".parse::<MarketStatus>().unwrap(), MarketStatus::Closed);
        assert!("archived".parse::<MarketStatus>().is_err());
    }

    #[test]
    fn market_deserializes_with_defaults() {
        let market: Market = serde_json::from_str(
            r#"{"id":"m1","title":"Senate AZ","platform":"Polymarket","expiration_date":"2024-11-05"}"#,
        )
        .unwrap();

        assert_eq!(market.status, MarketStatus::Open);
        assert_eq!(market.is_arbitrage, ArbitrageFlag::No);
        assert_eq!(market.platform.as_str(), "polymarket");
    }
}
