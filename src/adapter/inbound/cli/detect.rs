//! Handler for `detect`.

use std::sync::Arc;

use serde_json::json;

use super::command::DetectArgs;
use super::context::open_store;
use crate::adapter::inbound::cli::output;
use crate::application::batch::{BatchSummary, DetectionBatch};
use crate::application::cache::SidesCache;
use crate::application::ledger::OpportunityLedger;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;

/// Execute `detect`.
///
/// Fails after printing the summary when any opportunity could not be
/// persisted.
pub async fn execute(config: &Config, args: &DetectArgs) -> Result<()> {
    for platform in config.platforms_missing_fee_coefficient() {
        output::warning(&format!(
            "platform {platform} charges fees but has no fee_coefficient; its pairs will fail"
        ));
    }

    let store = open_store(config)?;
    let ledger = OpportunityLedger::new(Arc::clone(&store), Arc::new(SidesCache::new()));

    let mut settings = config.batch.settings();
    settings.rematch |= args.rematch;
    settings.close_expired &= !args.keep_expired;

    let batch = DetectionBatch::new(
        store,
        config.normalizer(),
        config.matcher(),
        ledger,
        settings,
    );
    let summary = batch.run().await?;

    print_summary(&summary)?;

    if summary.has_persistence_failures() {
        return Err(Error::Database(format!(
            "{} opportunity record(s) failed to persist",
            summary.persistence_errors
        )));
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "detect",
            "summary": serde_json::to_value(summary)?,
        }));
        return Ok(());
    }

    output::section("Detection run");
    output::field("Run", &summary.run_id);
    output::field("Closed markets", summary.closed_markets);
    output::field("Candidates", summary.candidates);
    output::field("Evaluated", summary.evaluated);
    output::field("Profitable", output::positive(summary.profitable));
    output::field("Recorded", output::positive(summary.recorded));
    output::field("Already recorded", summary.duplicates);
    output::field("Missing price data", summary.skipped_missing_data);
    output::field("Same platform", summary.skipped_same_platform);
    output::field("On closed markets", summary.skipped_closed);

    if !summary.failures.is_empty() {
        output::section("Failures");
        for failure in &summary.failures {
            output::warning(&format!(
                "{} / {}: {}",
                failure.option_id_1, failure.option_id_2, failure.message
            ));
        }
    }
    Ok(())
}
