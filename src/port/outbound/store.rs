//! Persistence ports for markets, prices, matches and opportunities.

use std::future::Future;

use crate::domain::{
    ArbitrageId, ArbitrageOpportunity, ContractPair, Market, MarketId, MarketMatch, MarketOption,
    NewOpportunity, OptionId, OptionMatch, OptionQuote, PriceSnapshot, RecordedSides,
};
use crate::error::Result;

/// Source of the latest price observation per option.
pub trait PriceSource: Send + Sync {
    /// Latest snapshot of an option with its platform, or `None` when the
    /// option has never been priced.
    fn latest_quote(
        &self,
        option: &OptionId,
    ) -> impl Future<Output = Result<Option<OptionQuote>>> + Send;
}

/// Read access to markets, options and match assertions.
pub trait CatalogStore: Send + Sync {
    /// Get a market by ID.
    fn market(&self, id: &MarketId) -> impl Future<Output = Result<Option<Market>>> + Send;

    /// All options belonging to a market.
    fn options_for_market(
        &self,
        id: &MarketId,
    ) -> impl Future<Output = Result<Vec<MarketOption>>> + Send;

    /// Market owning an option, or `None` when the option or its market is
    /// not on file.
    fn option_market(
        &self,
        option: &OptionId,
    ) -> impl Future<Output = Result<Option<Market>>> + Send;

    /// All market match assertions.
    fn market_matches(&self) -> impl Future<Output = Result<Vec<MarketMatch>>> + Send;

    /// All option match candidates.
    fn option_matches(&self) -> impl Future<Output = Result<Vec<OptionMatch>>> + Send;

    /// Insert option matches, ignoring ones already present. Returns count inserted.
    fn save_option_matches(
        &self,
        matches: &[OptionMatch],
    ) -> impl Future<Output = Result<usize>> + Send;
}

/// Outcome of a transactional opportunity insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Both the opportunity row and the sides row were committed.
    Inserted(ArbitrageId),
    /// An opportunity for the same unordered contract pair already exists.
    Duplicate,
}

/// Storage operations backing the opportunity ledger.
pub trait OpportunityStore: Send + Sync {
    /// Owning contract of an option.
    fn resolve_contract(
        &self,
        option: &OptionId,
    ) -> impl Future<Output = Result<Option<MarketId>>> + Send;

    /// Whether a market record exists.
    fn market_exists(&self, id: &MarketId) -> impl Future<Output = Result<bool>> + Send;

    /// Check for an existing opportunity on the unordered pair and, if none,
    /// write the opportunity and its sides in one transaction.
    fn insert_opportunity(
        &self,
        opportunity: &NewOpportunity,
    ) -> impl Future<Output = Result<InsertOutcome>> + Send;

    /// Recorded opportunity for an unordered contract pair.
    fn find_by_pair(
        &self,
        pair: &ContractPair,
    ) -> impl Future<Output = Result<Option<ArbitrageOpportunity>>> + Send;

    /// Sides row of a recorded opportunity.
    fn sides(&self, id: ArbitrageId)
        -> impl Future<Output = Result<Option<RecordedSides>>> + Send;

    /// All recorded opportunities, newest first.
    fn list_opportunities(&self) -> impl Future<Output = Result<Vec<ArbitrageOpportunity>>> + Send;
}

/// Write access used by ingestion and market lifecycle maintenance.
pub trait MaintenanceStore: Send + Sync {
    /// Insert or replace a market.
    fn upsert_market(&self, market: &Market) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace an option.
    fn upsert_option(&self, option: &MarketOption) -> impl Future<Output = Result<()>> + Send;

    /// Append a snapshot. Returns false when `(option_id, timestamp)` already exists.
    fn append_snapshot(&self, snapshot: &PriceSnapshot)
        -> impl Future<Output = Result<bool>> + Send;

    /// Insert or replace a market match.
    fn upsert_market_match(&self, m: &MarketMatch) -> impl Future<Output = Result<()>> + Send;

    /// All markets currently open.
    fn open_markets(&self) -> impl Future<Output = Result<Vec<Market>>> + Send;

    /// Move the given markets to `closed`. Returns count updated.
    fn close_markets(&self, ids: &[MarketId]) -> impl Future<Output = Result<usize>> + Send;
}
