use rust_decimal_macros::dec;

use crossedge::application::normalizer::{PlatformConfig, PriceNormalizer, PriceScale};

/// Percent-scale platform without fees.
pub fn plain() -> PlatformConfig {
    PlatformConfig {
        scale: PriceScale::Percent,
        fees: false,
        fee_coefficient: None,
    }
}

/// Percent-scale platform charging the quadratic fee with θ = 0.07.
pub fn kalshi() -> PlatformConfig {
    PlatformConfig {
        scale: PriceScale::Percent,
        fees: true,
        fee_coefficient: Some(dec!(0.07)),
    }
}

/// Fraction-scale platform without fees.
pub fn polymarket() -> PlatformConfig {
    PlatformConfig {
        scale: PriceScale::Fraction,
        fees: false,
        fee_coefficient: None,
    }
}

pub fn normalizer() -> PriceNormalizer {
    PriceNormalizer::default()
        .with_platform("alpha", plain())
        .with_platform("beta", plain())
        .with_platform("kalshi", kalshi())
        .with_platform("polymarket", polymarket())
}
