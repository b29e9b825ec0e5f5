//! Price normalization onto the common 0-100 cost scale.
//!
//! Each platform reports prices on its own scale: some already in cents
//! (0-100), others as a fraction (0-1). Fee-charging platforms add a
//! quadratic fee `ceil(θ · p · (1 − p) · 100)` per contract, always rounded
//! up to the next whole cent so the reported cost is never below the
//! true cost.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LegCosts, OptionId, OptionQuote, Platform, Price};
use crate::error::Result;
use crate::port::outbound::store::PriceSource;

/// Native price scale of a platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceScale {
    /// Prices already in cents (0-100).
    #[default]
    Percent,
    /// Prices as a 0-1 fraction.
    Fraction,
}

impl PriceScale {
    /// Multiplier bringing a native price onto the 0-100 scale.
    #[must_use]
    pub fn factor(self) -> Decimal {
        match self {
            Self::Percent => Decimal::ONE,
            Self::Fraction => Decimal::ONE_HUNDRED,
        }
    }
}

/// Pricing and fee settings of one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub scale: PriceScale,

    /// Whether the platform charges a per-contract fee.
    #[serde(default)]
    pub fees: bool,

    /// Fee coefficient θ. Required when `fees` is true.
    #[serde(default)]
    pub fee_coefficient: Option<Decimal>,
}

/// Configuration problems that make a platform's prices unusable.
///
/// Fatal for the pairs touching that platform only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no pricing configuration for platform {platform}")]
    UnknownPlatform { platform: String },

    #[error("platform {platform} charges fees but has no fee_coefficient")]
    MissingFeeCoefficient { platform: String },
}

/// Quadratic platform fee on the 0-100 scale, rounded up to a whole cent.
///
/// Prices at or outside the bounds carry no fee.
#[must_use]
pub fn quadratic_fee(price: Price, theta: Decimal) -> Decimal {
    if price <= Decimal::ZERO || price >= Decimal::ONE_HUNDRED {
        return Decimal::ZERO;
    }
    let p = price / Decimal::ONE_HUNDRED;
    (theta * p * (Decimal::ONE - p) * Decimal::ONE_HUNDRED).ceil()
}

/// Converts platform-native prices into total costs on the 0-100 scale.
#[derive(Debug, Clone, Default)]
pub struct PriceNormalizer {
    platforms: HashMap<Platform, PlatformConfig>,
}

impl PriceNormalizer {
    #[must_use]
    pub fn new(platforms: HashMap<Platform, PlatformConfig>) -> Self {
        Self { platforms }
    }

    /// Register or replace a platform's configuration.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<Platform>, config: PlatformConfig) -> Self {
        self.platforms.insert(platform.into(), config);
        self
    }

    /// Total cost of buying one contract at `raw_price`, fees included.
    ///
    /// # Errors
    /// Returns [`NormalizeError`] when the platform is not configured or
    /// charges fees without a coefficient.
    pub fn normalize_cost(
        &self,
        raw_price: Price,
        platform: &Platform,
    ) -> std::result::Result<Decimal, NormalizeError> {
        let config =
            self.platforms
                .get(platform)
                .ok_or_else(|| NormalizeError::UnknownPlatform {
                    platform: platform.to_string(),
                })?;

        let price = raw_price * config.scale.factor();
        if !config.fees {
            return Ok(price);
        }

        let theta = config
            .fee_coefficient
            .ok_or_else(|| NormalizeError::MissingFeeCoefficient {
                platform: platform.to_string(),
            })?;
        Ok(price + quadratic_fee(price, theta))
    }

    /// Normalized yes and no costs of one quote. Fees apply to each leg.
    ///
    /// # Errors
    /// See [`PriceNormalizer::normalize_cost`].
    pub fn leg_costs(&self, quote: &OptionQuote) -> std::result::Result<LegCosts, NormalizeError> {
        Ok(LegCosts::new(
            self.normalize_cost(quote.snapshot.yes_price, &quote.platform)?,
            self.normalize_cost(quote.snapshot.no_price, &quote.platform)?,
        ))
    }

    /// Costs from the latest snapshot of an option.
    ///
    /// `Ok(None)` means no snapshot exists; callers skip the pair instead of
    /// treating absence as a zero price.
    ///
    /// # Errors
    /// Returns store errors from `source` and [`NormalizeError`] wrapped in
    /// [`crate::error::Error::Normalize`].
    pub async fn latest_costs<P: PriceSource>(
        &self,
        source: &P,
        option: &OptionId,
    ) -> Result<Option<LegCosts>> {
        match source.latest_quote(option).await? {
            Some(quote) => Ok(Some(self.leg_costs(&quote)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceSnapshot;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn normalizer() -> PriceNormalizer {
        PriceNormalizer::default()
            .with_platform(
                "kalshi",
                PlatformConfig {
                    scale: PriceScale::Percent,
                    fees: true,
                    fee_coefficient: Some(dec!(0.07)),
                },
            )
            .with_platform(
                "polymarket",
                PlatformConfig {
                    scale: PriceScale::Fraction,
                    fees: false,
                    fee_coefficient: None,
                },
            )
    }

    #[test]
    fn fee_example_rounds_up_to_two_cents() {
        // 0.07 * 0.4 * 0.6 * 100 = 1.68 -> 2
        assert_eq!(quadratic_fee(dec!(40), dec!(0.07)), dec!(2));
        let cost = normalizer()
            .normalize_cost(dec!(40), &Platform::new("kalshi"))
            .unwrap();
        assert_eq!(cost, dec!(42));
    }

    #[test]
    fn fee_is_zero_at_bounds() {
        assert_eq!(quadratic_fee(dec!(0), dec!(0.07)), Decimal::ZERO);
        assert_eq!(quadratic_fee(dec!(100), dec!(0.07)), Decimal::ZERO);
    }

    #[test]
    fn fee_never_underestimates() {
        let theta = dec!(0.07);
        let mut price = dec!(0.5);
        while price < dec!(100) {
            let p = price / dec!(100);
            let exact = theta * p * (Decimal::ONE - p) * dec!(100);
            let fee = quadratic_fee(price, theta);
            assert!(fee >= exact, "fee {fee} below exact {exact} at {price}");
            assert!(fee - exact < Decimal::ONE);
            price += dec!(0.5);
        }
    }

    #[test]
    fn small_exact_fee_still_rounds_up() {
        // 0.07 * 0.01 * 0.99 * 100 = 0.0693 -> 1
        assert_eq!(quadratic_fee(dec!(1), dec!(0.07)), dec!(1));
    }

    #[test]
    fn fraction_platform_is_scaled_without_fee() {
        let cost = normalizer()
            .normalize_cost(dec!(0.55), &Platform::new("Polymarket"))
            .unwrap();
        assert_eq!(cost, dec!(55));
    }

    #[test]
    fn unknown_platform_is_a_config_error() {
        let result = normalizer().normalize_cost(dec!(50), &Platform::new("predictit"));
        assert!(matches!(result, Err(NormalizeError::UnknownPlatform { .. })));
    }

    #[test]
    fn missing_fee_coefficient_is_a_config_error() {
        let normalizer = PriceNormalizer::default().with_platform(
            "kalshi",
            PlatformConfig {
                scale: PriceScale::Percent,
                fees: true,
                fee_coefficient: None,
            },
        );
        let result = normalizer.normalize_cost(dec!(50), &Platform::new("kalshi"));
        assert!(matches!(
            result,
            Err(NormalizeError::MissingFeeCoefficient { .. })
        ));
    }

    #[test]
    fn leg_costs_apply_fee_to_each_leg() {
        let quote = OptionQuote {
            platform: Platform::new("kalshi"),
            snapshot: PriceSnapshot::try_new("o1", Utc::now(), dec!(1), dec!(40), dec!(55))
                .unwrap(),
        };
        let costs = normalizer().leg_costs(&quote).unwrap();
        // 55: 0.07 * 0.55 * 0.45 * 100 = 1.7325 -> 2
        assert_eq!(costs, LegCosts::new(dec!(42), dec!(57)));
    }
}
