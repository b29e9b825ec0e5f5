//! Handler for `opportunities`.

use serde_json::json;
use tabled::{Table, Tabled};

use super::context::open_store;
use crate::adapter::inbound::cli::output;
use crate::domain::ArbitrageOpportunity;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::OpportunityStore;

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Contract 1")]
    contract_1: String,
    #[tabled(rename = "Side 1")]
    side_1: &'static str,
    #[tabled(rename = "Contract 2")]
    contract_2: String,
    #[tabled(rename = "Side 2")]
    side_2: &'static str,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Detected")]
    detected: String,
}

impl From<&ArbitrageOpportunity> for OpportunityRow {
    fn from(o: &ArbitrageOpportunity) -> Self {
        Self {
            id: o.arb_id.value(),
            contract_1: o.contract_id_1.to_string(),
            side_1: o.side_1.as_str(),
            contract_2: o.contract_id_2.to_string(),
            side_2: o.side_2.as_str(),
            profit: o.profit.to_string(),
            detected: o.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute `opportunities`.
pub async fn execute(config: &Config, limit: Option<usize>) -> Result<()> {
    if output::is_quiet() && !output::is_json() {
        return Ok(());
    }

    let store = open_store(config)?;
    let mut opportunities = store.list_opportunities().await?;
    if let Some(limit) = limit {
        opportunities.truncate(limit);
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "opportunities",
            "opportunities": serde_json::to_value(&opportunities)?,
        }));
        return Ok(());
    }

    output::section("Arbitrage opportunities");
    if opportunities.is_empty() {
        output::note("(none recorded)");
        output::hint(&format!(
            "run {} to evaluate matched options",
            output::highlight("crossedge detect")
        ));
        return Ok(());
    }

    let rows: Vec<OpportunityRow> = opportunities.iter().map(OpportunityRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
