//! Cross-platform match assertions.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{MarketId, OptionId, Platform};

/// Assertion that two markets on different platforms describe the same
/// real-world event.
///
/// Produced by an external similarity process and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMatch {
    pub event_id: i32,
    pub market_id_1: MarketId,
    #[serde(default)]
    pub description_1: String,
    pub platform_1: Platform,
    pub market_id_2: MarketId,
    #[serde(default)]
    pub description_2: String,
    pub platform_2: Platform,
}

impl MarketMatch {
    /// True when both sides are on the same platform.
    #[must_use]
    pub fn is_same_platform(&self) -> bool {
        self.platform_1 == self.platform_2
    }
}

/// Pairing of two options, one from each side of a [`MarketMatch`].
///
/// Both display names are retained for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMatch {
    pub event_id: i32,
    pub option_id_1: OptionId,
    pub name_1: String,
    pub option_id_2: OptionId,
    pub name_2: String,
}

/// Textual label of an option offered to the candidate matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLabel {
    pub id: OptionId,
    pub text: String,
    pub platform: Platform,
}

impl OptionLabel {
    pub fn new(
        id: impl Into<OptionId>,
        text: impl Into<String>,
        platform: impl Into<Platform>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            platform: platform.into(),
        }
    }
}

/// A proposed option pairing with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub option_a: OptionId,
    pub option_b: OptionId,
    pub score: f64,
}

/// Reject a pairing whose two sides trade on the same platform.
///
/// # Errors
/// Returns [`DomainError::SamePlatform`] when `platform_a == platform_b`.
pub fn ensure_cross_platform(
    option_a: &OptionId,
    platform_a: &Platform,
    option_b: &OptionId,
    platform_b: &Platform,
) -> Result<(), DomainError> {
    if platform_a == platform_b {
        return Err(DomainError::SamePlatform {
            option_a: option_a.to_string(),
            option_b: option_b.to_string(),
            platform: platform_a.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_platform_is_rejected_case_insensitively() {
        let result = ensure_cross_platform(
            &OptionId::new("a"),
            &Platform::new("Kalshi"),
            &OptionId::new("b"),
            &Platform::new("kalshi"),
        );
        assert!(matches!(result, Err(DomainError::SamePlatform { .. })));
    }

    #[test]
    fn different_platforms_pass() {
        let result = ensure_cross_platform(
            &OptionId::new("a"),
            &Platform::new("kalshi"),
            &OptionId::new("b"),
            &Platform::new("polymarket"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn market_match_detects_same_platform() {
        let m = MarketMatch {
            event_id: 1,
            market_id_1: MarketId::new("k1"),
            description_1: "Fed decision in December".into(),
            platform_1: Platform::new("kalshi"),
            market_id_2: MarketId::new("k2"),
            description_2: "Fed funds rate in December?".into(),
            platform_2: Platform::new("KALSHI"),
        };
        assert!(m.is_same_platform());
    }
}
