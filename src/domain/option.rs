//! Options: the tradable instruments inside a market.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{MarketId, OptionId};

/// Settlement outcome of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    #[default]
    Pending,
    Win,
    Lose,
}

impl Settlement {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }
}

impl FromStr for Settlement {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "win" => Ok(Self::Win),
            "lose" => Ok(Self::Lose),
            other => Err(DomainError::UnknownVariant {
                kind: "settlement",
                value: other.to_string(),
            }),
        }
    }
}

/// One side of a market's outcome space, bought either "yes" or "no".
///
/// Belongs to exactly one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOption {
    pub id: OptionId,
    pub market_id: MarketId,
    pub name: String,
    #[serde(default)]
    pub outcome: Settlement,
}

impl MarketOption {
    /// Create a pending option.
    pub fn new(
        id: impl Into<OptionId>,
        market_id: impl Into<MarketId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            market_id: market_id.into(),
            name: name.into(),
            outcome: Settlement::Pending,
        }
    }
}
