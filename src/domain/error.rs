//! Domain validation errors for core domain types.
//!
//! These errors are returned when stored or ingested values violate a
//! domain rule, such as an unknown enum spelling or a negative price.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A stored string does not name any variant of the enum.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// Human-readable name of the enum.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Prices must not be negative.
    #[error("price must not be negative, got {price}")]
    NegativePrice {
        /// The invalid price.
        price: rust_decimal::Decimal,
    },

    /// An option match must join options from two different platforms.
    #[error("options {option_a} and {option_b} are both on {platform}")]
    SamePlatform {
        option_a: String,
        option_b: String,
        platform: String,
    },
}
