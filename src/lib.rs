//! Crossedge - cross-platform prediction market arbitrage detection.
//!
//! Pairs binary options listed on different platforms, normalizes their
//! latest prices onto a common 0-100 cost scale with platform fees, and
//! records every cross bet whose combined cost is below the 100 payout.
//!
//! # Architecture
//!
//! - [`domain`] - Markets, options, prices, matches and opportunities
//! - [`port`] - Store traits the application depends on
//! - [`application`] - Normalizer, matcher, evaluator, ledger and the batch runner
//! - [`adapter`] - SQLite persistence and the command-line interface
//! - [`infrastructure`] - Configuration and logging
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use crossedge::application::evaluator::evaluate;
//! use crossedge::domain::{BetSide, LegCosts};
//! use rust_decimal_macros::dec;
//!
//! let a = LegCosts::new(dec!(72), dec!(35));
//! let b = LegCosts::new(dec!(30), dec!(25));
//! let scenario = evaluate(&a, &b).scenario().copied().unwrap();
//! assert_eq!((scenario.side_a, scenario.side_b), (BetSide::No, BetSide::Yes));
//! assert_eq!(scenario.profit, dec!(35));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
