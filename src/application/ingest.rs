//! Loading collaborator rows into the store.
//!
//! Scrapers and the similarity process hand their output over as one JSON
//! document per batch. Markets and options are upserted, price snapshots are
//! appended, and matches are inserted.

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{Market, MarketMatch, MarketOption, OptionMatch, PriceSnapshot};
use crate::error::Result;
use crate::port::outbound::store::{CatalogStore, MaintenanceStore};

/// One ingestion document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestBatch {
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub options: Vec<MarketOption>,
    #[serde(default)]
    pub prices: Vec<PriceSnapshot>,
    #[serde(default)]
    pub market_matches: Vec<MarketMatch>,
    #[serde(default)]
    pub option_matches: Vec<OptionMatch>,
}

impl IngestBatch {
    /// Parse a JSON ingestion document.
    ///
    /// # Errors
    /// Returns a JSON error for malformed input.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Counts from one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub markets: usize,
    pub options: usize,
    pub prices: usize,
    pub duplicate_prices: usize,
    pub rejected_prices: usize,
    pub market_matches: usize,
    pub option_matches: usize,
}

/// Write a batch to the store.
///
/// Snapshots with negative prices are rejected and counted; the rest of the
/// batch proceeds.
///
/// # Errors
/// Returns store errors.
pub async fn ingest<S>(store: &S, batch: &IngestBatch) -> Result<IngestSummary>
where
    S: MaintenanceStore + CatalogStore,
{
    let mut summary = IngestSummary::default();

    for market in &batch.markets {
        store.upsert_market(market).await?;
        summary.markets += 1;
    }
    for option in &batch.options {
        store.upsert_option(option).await?;
        summary.options += 1;
    }
    for snapshot in &batch.prices {
        if let Err(e) = snapshot.validate() {
            warn!(option_id = %snapshot.option_id, error = %e, "Rejected price snapshot");
            summary.rejected_prices += 1;
            continue;
        }
        if store.append_snapshot(snapshot).await? {
            summary.prices += 1;
        } else {
            summary.duplicate_prices += 1;
        }
    }
    for market_match in &batch.market_matches {
        store.upsert_market_match(market_match).await?;
        summary.market_matches += 1;
    }
    summary.option_matches = store.save_option_matches(&batch.option_matches).await?;

    info!(
        markets = summary.markets,
        options = summary.options,
        prices = summary.prices,
        duplicate_prices = summary.duplicate_prices,
        market_matches = summary.market_matches,
        option_matches = summary.option_matches,
        "Ingested batch"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_document() {
        let batch = IngestBatch::from_json(
            r#"{
                "markets": [{"id": "k1", "title": "Fed in December", "platform": "kalshi"}],
                "prices": [{
                    "option_id": "o1",
                    "timestamp": "2024-12-01T12:00:00Z",
                    "yes_price": "40",
                    "no_price": 55
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(batch.markets.len(), 1);
        assert_eq!(batch.prices.len(), 1);
        assert!(batch.options.is_empty());
        assert!(batch.option_matches.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(IngestBatch::from_json("{ not json").is_err());
    }
}
