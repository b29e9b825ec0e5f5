//! Price observations and normalized costs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OptionId, Platform};

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// A timestamped observation of an option's market price.
///
/// Prices are on the platform-native scale (0-100 or 0-1). Snapshots are
/// append-only; the latest one per option is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub option_id: OptionId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub volume: Decimal,
    pub yes_price: Price,
    pub no_price: Price,
}

impl PriceSnapshot {
    /// Create a snapshot, rejecting negative prices.
    ///
    /// # Errors
    /// Returns [`DomainError::NegativePrice`] if either price is below zero.
    pub fn try_new(
        option_id: impl Into<OptionId>,
        timestamp: DateTime<Utc>,
        volume: Decimal,
        yes_price: Price,
        no_price: Price,
    ) -> Result<Self, DomainError> {
        let snapshot = Self {
            option_id: option_id.into(),
            timestamp,
            volume,
            yes_price,
            no_price,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the price invariants of an already-built snapshot.
    ///
    /// # Errors
    /// Returns [`DomainError::NegativePrice`] if either price is below zero.
    pub fn validate(&self) -> Result<(), DomainError> {
        for price in [self.yes_price, self.no_price] {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(DomainError::NegativePrice { price });
            }
        }
        Ok(())
    }
}

/// Latest snapshot of an option together with the platform it trades on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionQuote {
    pub platform: Platform,
    pub snapshot: PriceSnapshot,
}

/// Total cost of buying each side of one option, on the common 0-100 scale,
/// fees included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegCosts {
    pub yes: Price,
    pub no: Price,
}

impl LegCosts {
    #[must_use]
    pub const fn new(yes: Price, no: Price) -> Self {
        Self { yes, no }
    }
}
