//! Platform-agnostic domain types.
//!
//! Markets, options, price snapshots, match assertions and arbitrage
//! opportunities. Nothing in here performs I/O.

pub mod error;
pub mod id;
pub mod market;
pub mod matching;
pub mod opportunity;
pub mod option;
pub mod price;

pub use id::{ArbitrageId, MarketId, OptionId, Platform};
pub use market::{ArbitrageFlag, Market, MarketStatus};
pub use matching::{Candidate, MarketMatch, OptionLabel, OptionMatch};
pub use opportunity::{
    ArbitrageOpportunity, BetSide, ContractPair, NewOpportunity, Outcome, RecordedSides, Scenario,
    ScenarioKind, PAYOUT,
};
pub use option::{MarketOption, Settlement};
pub use price::{LegCosts, OptionQuote, Price, PriceSnapshot};
