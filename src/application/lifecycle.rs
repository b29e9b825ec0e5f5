//! Market lifecycle maintenance.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::MarketId;
use crate::error::Result;
use crate::port::outbound::store::MaintenanceStore;

/// Close every open market whose expiration date is before `today`.
///
/// Markets are never deleted. Returns the number of markets closed.
///
/// # Errors
/// Returns store errors.
pub async fn close_expired<S: MaintenanceStore>(store: &S, today: NaiveDate) -> Result<usize> {
    let expired: Vec<MarketId> = store
        .open_markets()
        .await?
        .into_iter()
        .filter(|m| m.is_expired(today))
        .map(|m| m.id)
        .collect();

    if expired.is_empty() {
        debug!(%today, "No expired markets");
        return Ok(0);
    }

    let closed = store.close_markets(&expired).await?;
    info!(closed, %today, "Closed expired markets");
    Ok(closed)
}
