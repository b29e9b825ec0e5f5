//! Handlers for catalog maintenance: `ingest`, `match`, `close-expired`.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde_json::json;

use super::context::open_store;
use crate::adapter::inbound::cli::output;
use crate::application::ingest::{ingest, IngestBatch};
use crate::application::lifecycle::close_expired;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `ingest <file>`.
pub async fn execute_ingest(config: &Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let batch = IngestBatch::from_json(&content)?;
    let store = open_store(config)?;
    let summary = ingest(store.as_ref(), &batch).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "ingest",
            "file": file.display().to_string(),
            "summary": {
                "markets": summary.markets,
                "options": summary.options,
                "prices": summary.prices,
                "duplicate_prices": summary.duplicate_prices,
                "rejected_prices": summary.rejected_prices,
                "market_matches": summary.market_matches,
                "option_matches": summary.option_matches,
            },
        }));
        return Ok(());
    }

    output::section("Ingest");
    output::field("Markets", summary.markets);
    output::field("Options", summary.options);
    output::field("Prices", summary.prices);
    output::field("Duplicate prices", summary.duplicate_prices);
    output::field("Market matches", summary.market_matches);
    output::field("Option matches", summary.option_matches);
    if summary.rejected_prices > 0 {
        output::warning(&format!(
            "{} price snapshot(s) rejected",
            summary.rejected_prices
        ));
    }
    Ok(())
}

/// Execute `match`.
pub async fn execute_match(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let summary = config.matcher().match_markets(store.as_ref()).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "match",
            "summary": {
                "market_matches": summary.market_matches,
                "skipped_same_platform": summary.skipped_same_platform,
                "candidates": summary.candidates,
                "inserted": summary.inserted,
            },
        }));
        return Ok(());
    }

    output::section("Option matching");
    output::field("Market matches", summary.market_matches);
    output::field("Candidates", summary.candidates);
    output::field("New option matches", summary.inserted);
    if summary.skipped_same_platform > 0 {
        output::warning(&format!(
            "{} market match(es) join a platform to itself",
            summary.skipped_same_platform
        ));
    }
    Ok(())
}

/// Execute `close-expired`.
pub async fn execute_close_expired(config: &Config, today: Option<NaiveDate>) -> Result<()> {
    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let store = open_store(config)?;
    let closed = close_expired(store.as_ref(), today).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "close-expired",
            "today": today.to_string(),
            "closed": closed,
        }));
        return Ok(());
    }

    output::success(&format!("Closed {closed} expired market(s)"));
    Ok(())
}
