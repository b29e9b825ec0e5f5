//! Opportunity ledger: de-duplicated, transactional recording.
//!
//! Opportunities are keyed by the unordered pair of owning contracts, not
//! by option. Two different matched options that resolve to the same two
//! contracts therefore produce a single record.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{
    ArbitrageId, BetSide, MarketId, NewOpportunity, OptionId, RecordedSides,
};
use crate::port::outbound::store::{InsertOutcome, OpportunityStore};

use super::cache::SidesCache;

/// Failures reported by [`OpportunityLedger::record`].
///
/// Cross-reference failures point at upstream data-integrity problems, such
/// as a stale option referencing a deleted market.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("option {option} does not resolve to a contract")]
    UnresolvedOption { option: OptionId },

    #[error("contract {contract} has no market record")]
    UnknownContract { contract: MarketId },

    #[error("options resolve to the same contract {contract}")]
    SameContract { contract: MarketId },

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// True for cross-reference failures (as opposed to store failures).
    #[must_use]
    pub const fn is_cross_reference(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

/// Result of a successful [`OpportunityLedger::record`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(ArbitrageId),
    AlreadyRecorded,
}

/// Records opportunities at most once per unordered contract pair.
pub struct OpportunityLedger<S> {
    store: Arc<S>,
    cache: Arc<SidesCache>,
}

impl<S: OpportunityStore> OpportunityLedger<S> {
    pub fn new(store: Arc<S>, cache: Arc<SidesCache>) -> Self {
        Self { store, cache }
    }

    /// The injected sides cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<SidesCache> {
        &self.cache
    }

    async fn contract_for(&self, option: &OptionId) -> Result<MarketId, LedgerError> {
        let contract = self
            .store
            .resolve_contract(option)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?
            .ok_or_else(|| LedgerError::UnresolvedOption {
                option: option.clone(),
            })?;

        let exists = self
            .store
            .market_exists(&contract)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        if !exists {
            return Err(LedgerError::UnknownContract { contract });
        }
        Ok(contract)
    }

    /// Record a profitable pairing of two options.
    ///
    /// Resolves both options to their contracts, then lets the store check
    /// for an existing record on the pair (either order) and write the
    /// opportunity and its sides in a single transaction.
    ///
    /// # Errors
    /// Returns [`LedgerError`] for unresolved options, missing markets and
    /// store failures. A duplicate is not an error.
    pub async fn record(
        &self,
        option_a: &OptionId,
        option_b: &OptionId,
        side_a: BetSide,
        side_b: BetSide,
        profit: Decimal,
    ) -> Result<RecordOutcome, LedgerError> {
        let contract_1 = self.contract_for(option_a).await?;
        let contract_2 = self.contract_for(option_b).await?;
        if contract_1 == contract_2 {
            return Err(LedgerError::SameContract {
                contract: contract_1,
            });
        }

        let opportunity = NewOpportunity {
            contract_1,
            contract_2,
            side_1: side_a,
            side_2: side_b,
            profit,
            detected_at: Utc::now(),
        };

        let outcome = self
            .store
            .insert_opportunity(&opportunity)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;

        match outcome {
            InsertOutcome::Inserted(id) => {
                self.cache.insert(
                    id,
                    RecordedSides {
                        side_1: side_a,
                        side_2: side_b,
                    },
                );
                info!(
                    arb_id = %id,
                    pair = %opportunity.pair(),
                    side_1 = %side_a,
                    side_2 = %side_b,
                    profit = %profit,
                    "Recorded arbitrage opportunity"
                );
                Ok(RecordOutcome::Recorded(id))
            }
            InsertOutcome::Duplicate => {
                debug!(pair = %opportunity.pair(), "Opportunity already recorded");
                Ok(RecordOutcome::AlreadyRecorded)
            }
        }
    }

    /// Sides of a recorded opportunity, served from the cache when present.
    ///
    /// # Errors
    /// Returns [`LedgerError::Persistence`] if the store lookup fails.
    pub async fn sides(&self, id: ArbitrageId) -> Result<Option<RecordedSides>, LedgerError> {
        if let Some(sides) = self.cache.get(id) {
            return Ok(Some(sides));
        }
        self.store
            .sides(id)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArbitrageOpportunity, ContractPair};
    use crate::error::{Error, Result};
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        options: HashMap<OptionId, MarketId>,
        markets: Vec<MarketId>,
        rows: Mutex<Vec<(ArbitrageId, NewOpportunity)>>,
        fail_insert: bool,
    }

    impl MemoryStore {
        fn with_pair() -> Self {
            let mut store = Self::default();
            store.options.insert(OptionId::new("o-a"), MarketId::new("m-a"));
            store.options.insert(OptionId::new("o-b"), MarketId::new("m-b"));
            store.options.insert(OptionId::new("o-b2"), MarketId::new("m-b"));
            store.options.insert(OptionId::new("o-ghost"), MarketId::new("m-ghost"));
            store.markets = vec![MarketId::new("m-a"), MarketId::new("m-b")];
            store
        }
    }

    impl OpportunityStore for MemoryStore {
        async fn resolve_contract(&self, option: &OptionId) -> Result<Option<MarketId>> {
            Ok(self.options.get(option).cloned())
        }

        async fn market_exists(&self, id: &MarketId) -> Result<bool> {
            Ok(self.markets.contains(id))
        }

        async fn insert_opportunity(&self, opportunity: &NewOpportunity) -> Result<InsertOutcome> {
            if self.fail_insert {
                return Err(Error::Database("disk I/O error".into()));
            }
            let mut rows = self.rows.lock();
            if rows.iter().any(|(_, r)| r.pair() == opportunity.pair()) {
                return Ok(InsertOutcome::Duplicate);
            }
            let id = ArbitrageId::new(rows.len() as i32 + 1);
            rows.push((id, opportunity.clone()));
            Ok(InsertOutcome::Inserted(id))
        }

        async fn find_by_pair(&self, _pair: &ContractPair) -> Result<Option<ArbitrageOpportunity>> {
            Ok(None)
        }

        async fn sides(&self, id: ArbitrageId) -> Result<Option<RecordedSides>> {
            Ok(self.rows.lock().iter().find(|(i, _)| *i == id).map(|(_, r)| RecordedSides {
                side_1: r.side_1,
                side_2: r.side_2,
            }))
        }

        async fn list_opportunities(&self) -> Result<Vec<ArbitrageOpportunity>> {
            Ok(Vec::new())
        }
    }

    fn ledger(store: MemoryStore) -> OpportunityLedger<MemoryStore> {
        OpportunityLedger::new(Arc::new(store), Arc::new(SidesCache::new()))
    }

    #[tokio::test]
    async fn second_record_on_swapped_pair_is_duplicate() {
        let ledger = ledger(MemoryStore::with_pair());
        let a = OptionId::new("o-a");
        let b = OptionId::new("o-b");

        let first = ledger
            .record(&a, &b, BetSide::No, BetSide::Yes, dec!(35))
            .await
            .unwrap();
        let second = ledger
            .record(&b, &a, BetSide::Yes, BetSide::No, dec!(35))
            .await
            .unwrap();

        assert!(matches!(first, RecordOutcome::Recorded(_)));
        assert_eq!(second, RecordOutcome::AlreadyRecorded);
        assert_eq!(ledger.store.rows.lock().len(), 1);
    }

    #[tokio::test]
    async fn different_options_on_same_contracts_are_duplicates() {
        let ledger = ledger(MemoryStore::with_pair());
        ledger
            .record(
                &OptionId::new("o-a"),
                &OptionId::new("o-b"),
                BetSide::Yes,
                BetSide::No,
                dec!(3),
            )
            .await
            .unwrap();
        let outcome = ledger
            .record(
                &OptionId::new("o-a"),
                &OptionId::new("o-b2"),
                BetSide::Yes,
                BetSide::No,
                dec!(4),
            )
            .await
            .unwrap();
        assert_eq!(outcome, RecordOutcome::AlreadyRecorded);
    }

    #[tokio::test]
    async fn unresolved_option_is_reported() {
        let ledger = ledger(MemoryStore::with_pair());
        let err = ledger
            .record(
                &OptionId::new("o-a"),
                &OptionId::new("nope"),
                BetSide::Yes,
                BetSide::No,
                dec!(1),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnresolvedOption {
                option: OptionId::new("nope")
            }
        );
        assert!(err.is_cross_reference());
    }

    #[tokio::test]
    async fn missing_market_is_reported() {
        let ledger = ledger(MemoryStore::with_pair());
        let err = ledger
            .record(
                &OptionId::new("o-ghost"),
                &OptionId::new("o-b"),
                BetSide::Yes,
                BetSide::No,
                dec!(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownContract { .. }));
    }

    #[tokio::test]
    async fn store_failure_is_persistence_error_and_leaves_cache_empty() {
        let mut store = MemoryStore::with_pair();
        store.fail_insert = true;
        let ledger = ledger(store);
        let err = ledger
            .record(
                &OptionId::new("o-a"),
                &OptionId::new("o-b"),
                BetSide::Yes,
                BetSide::No,
                dec!(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        assert!(!err.is_cross_reference());
        assert!(ledger.cache().is_empty());
    }

    #[tokio::test]
    async fn sides_served_from_cache_then_store() {
        let ledger = ledger(MemoryStore::with_pair());
        let RecordOutcome::Recorded(id) = ledger
            .record(
                &OptionId::new("o-a"),
                &OptionId::new("o-b"),
                BetSide::No,
                BetSide::Yes,
                dec!(2),
            )
            .await
            .unwrap()
        else {
            panic!("expected a new record");
        };

        let expected = RecordedSides {
            side_1: BetSide::No,
            side_2: BetSide::Yes,
        };
        assert_eq!(ledger.sides(id).await.unwrap(), Some(expected));

        ledger.cache().clear();
        assert_eq!(ledger.sides(id).await.unwrap(), Some(expected));
    }
}
