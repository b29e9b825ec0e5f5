//! Arbitrage opportunity types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ArbitrageId, MarketId};

/// Guaranteed payout of one contract pair on the common cost scale.
pub const PAYOUT: Decimal = Decimal::ONE_HUNDRED;

/// Side of a binary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetSide {
    Yes,
    No,
}

impl BetSide {
    /// Storage and display representation (`YES` / `NO`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }

    /// The opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl fmt::Display for BetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetSide {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(DomainError::UnknownVariant {
                kind: "bet side",
                value: s.to_string(),
            }),
        }
    }
}

/// Which of the two cross bets was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioKind {
    /// YES on A, NO on B.
    YesANoB,
    /// NO on A, YES on B.
    NoAYesB,
}

/// A profitable cross bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub side_a: BetSide,
    pub side_b: BetSide,
    /// Combined cost of both legs, fees included.
    pub cost: Decimal,
    /// `PAYOUT - cost`, always positive.
    pub profit: Decimal,
}

/// Result of evaluating a matched option pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoOpportunity,
    Opportunity(Scenario),
}

impl Outcome {
    #[must_use]
    pub const fn is_opportunity(&self) -> bool {
        matches!(self, Self::Opportunity(_))
    }

    #[must_use]
    pub const fn scenario(&self) -> Option<&Scenario> {
        match self {
            Self::Opportunity(scenario) => Some(scenario),
            Self::NoOpportunity => None,
        }
    }
}

/// Unordered pair of contracts, stored in canonical (sorted) order.
///
/// `ContractPair::new(a, b) == ContractPair::new(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractPair {
    low: MarketId,
    high: MarketId,
}

impl ContractPair {
    pub fn new(a: MarketId, b: MarketId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[must_use]
    pub fn low(&self) -> &MarketId {
        &self.low
    }

    #[must_use]
    pub fn high(&self) -> &MarketId {
        &self.high
    }
}

impl fmt::Display for ContractPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.low, self.high)
    }
}

/// Opportunity ready to be written, with contracts already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOpportunity {
    pub contract_1: MarketId,
    pub contract_2: MarketId,
    pub side_1: BetSide,
    pub side_2: BetSide,
    pub profit: Decimal,
    pub detected_at: DateTime<Utc>,
}

impl NewOpportunity {
    #[must_use]
    pub fn pair(&self) -> ContractPair {
        ContractPair::new(self.contract_1.clone(), self.contract_2.clone())
    }
}

/// The side taken on each contract of a recorded opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedSides {
    pub side_1: BetSide,
    pub side_2: BetSide,
}

/// A persisted, profitable pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbitrageOpportunity {
    pub arb_id: ArbitrageId,
    pub contract_id_1: MarketId,
    pub contract_id_2: MarketId,
    pub side_1: BetSide,
    pub side_2: BetSide,
    pub profit: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    #[must_use]
    pub fn sides(&self) -> RecordedSides {
        RecordedSides {
            side_1: self.side_1,
            side_2: self.side_2,
        }
    }
}
