//! One detection run over the full candidate set.
//!
//! Pricing and evaluation of option pairs run concurrently since no pair
//! depends on another. Recording happens from the single consumer of the
//! evaluation stream, so ledger writes are serialized; the store's unique
//! pair index backs this up. One bad pair never aborts the run: it is
//! counted in the [`BatchSummary`] and the run moves on.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::matching::ensure_cross_platform;
use crate::domain::{MarketStatus, OptionId, OptionMatch, Outcome};
use crate::error::Result;
use crate::port::outbound::store::{CatalogStore, MaintenanceStore, OpportunityStore, PriceSource};

use super::evaluator::{Evaluation, OpportunityEvaluator};
use super::ledger::{OpportunityLedger, RecordOutcome};
use super::lifecycle::close_expired;
use super::matcher::CandidateMatcher;
use super::normalizer::PriceNormalizer;

/// Everything a detection run needs from storage.
pub trait BatchStore: PriceSource + CatalogStore + OpportunityStore + MaintenanceStore {}

impl<T> BatchStore for T where
    T: PriceSource + CatalogStore + OpportunityStore + MaintenanceStore
{
}

/// Tunables of a run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Pairs priced and evaluated at once.
    pub concurrency: usize,
    /// Per-lookup price fetch timeout.
    pub fetch_timeout: Duration,
    /// Close expired markets before evaluating.
    pub close_expired: bool,
    /// Refresh option matches from market matches before evaluating.
    pub rematch: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            fetch_timeout: Duration::from_secs(5),
            close_expired: true,
            rematch: false,
        }
    }
}

/// Category of a per-pair failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    CrossReference,
    Persistence,
}

/// A pair that could not be evaluated or recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairFailure {
    pub option_id_1: OptionId,
    pub option_id_2: OptionId,
    pub kind: FailureKind,
    pub message: String,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub run_id: String,
    pub closed_markets: usize,
    pub candidates: usize,
    pub evaluated: usize,
    pub profitable: usize,
    pub recorded: usize,
    pub duplicates: usize,
    pub skipped_missing_data: usize,
    pub skipped_same_platform: usize,
    pub skipped_closed: usize,
    pub config_errors: usize,
    pub cross_reference_errors: usize,
    pub persistence_errors: usize,
    pub failures: Vec<PairFailure>,
}

impl BatchSummary {
    /// True when any opportunity failed to be committed this run.
    #[must_use]
    pub fn has_persistence_failures(&self) -> bool {
        self.persistence_errors > 0
    }

    fn fail(&mut self, pair: &OptionMatch, kind: FailureKind, message: String) {
        match kind {
            FailureKind::Configuration => self.config_errors += 1,
            FailureKind::CrossReference => self.cross_reference_errors += 1,
            FailureKind::Persistence => self.persistence_errors += 1,
        }
        self.failures.push(PairFailure {
            option_id_1: pair.option_id_1.clone(),
            option_id_2: pair.option_id_2.clone(),
            kind,
            message,
        });
    }
}

/// Result of pricing and evaluating one pair.
enum Assessment {
    SamePlatform,
    Closed,
    MissingData,
    Failed(FailureKind, String),
    Evaluated(Outcome),
}

/// Runs matching, evaluation and recording over every candidate pair.
pub struct DetectionBatch<S> {
    store: Arc<S>,
    normalizer: PriceNormalizer,
    matcher: CandidateMatcher,
    ledger: OpportunityLedger<S>,
    settings: BatchSettings,
}

impl<S: BatchStore> DetectionBatch<S> {
    pub fn new(
        store: Arc<S>,
        normalizer: PriceNormalizer,
        matcher: CandidateMatcher,
        ledger: OpportunityLedger<S>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            store,
            normalizer,
            matcher,
            ledger,
            settings,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &OpportunityLedger<S> {
        &self.ledger
    }

    async fn assess(&self, pair: &OptionMatch) -> Assessment {
        let market_1 = self.store.option_market(&pair.option_id_1).await;
        let market_2 = self.store.option_market(&pair.option_id_2).await;
        let (market_1, market_2) = match (market_1, market_2) {
            (Ok(Some(m1)), Ok(Some(m2))) => (m1, m2),
            (Ok(None), _) => {
                return Assessment::Failed(
                    FailureKind::CrossReference,
                    format!("option {} has no market", pair.option_id_1),
                )
            }
            (_, Ok(None)) => {
                return Assessment::Failed(
                    FailureKind::CrossReference,
                    format!("option {} has no market", pair.option_id_2),
                )
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Market lookup failed");
                return Assessment::MissingData;
            }
        };

        if let Err(e) = ensure_cross_platform(
            &pair.option_id_1,
            &market_1.platform,
            &pair.option_id_2,
            &market_2.platform,
        ) {
            debug!(error = %e, "Skipping same-platform pair");
            return Assessment::SamePlatform;
        }

        if market_1.status == MarketStatus::Closed || market_2.status == MarketStatus::Closed {
            debug!(
                option_id_1 = %pair.option_id_1,
                option_id_2 = %pair.option_id_2,
                "Skipping pair on a closed market"
            );
            return Assessment::Closed;
        }

        let evaluator = OpportunityEvaluator::new(&self.normalizer, self.store.as_ref())
            .with_fetch_timeout(self.settings.fetch_timeout);
        match evaluator.assess(&pair.option_id_1, &pair.option_id_2).await {
            Evaluation::Evaluated(outcome) => Assessment::Evaluated(outcome),
            Evaluation::Missing => Assessment::MissingData,
            Evaluation::Unconfigured(message) => {
                Assessment::Failed(FailureKind::Configuration, message)
            }
        }
    }

    /// Execute one run.
    ///
    /// # Errors
    /// Returns an error only when the candidate set cannot be loaded.
    /// Per-pair problems are reported in the summary.
    pub async fn run(&self) -> Result<BatchSummary> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("detect", run_id = %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: String) -> Result<BatchSummary> {
        let mut summary = BatchSummary {
            run_id,
            ..Default::default()
        };

        self.ledger.cache().clear();

        if self.settings.close_expired {
            match close_expired(self.store.as_ref(), Utc::now().date_naive()).await {
                Ok(closed) => summary.closed_markets = closed,
                Err(e) => warn!(error = %e, "Closing expired markets failed"),
            }
        }

        if self.settings.rematch {
            if let Err(e) = self.matcher.match_markets(self.store.as_ref()).await {
                warn!(error = %e, "Option matching failed, evaluating existing matches");
            }
        }

        let candidates = self.store.option_matches().await?;
        summary.candidates = candidates.len();
        info!(candidates = candidates.len(), "Evaluating candidates");

        let mut assessments = stream::iter(candidates.iter())
            .map(|pair| async move { (pair, self.assess(pair).await) })
            .buffer_unordered(self.settings.concurrency.max(1));

        while let Some((pair, assessment)) = assessments.next().await {
            match assessment {
                Assessment::SamePlatform => summary.skipped_same_platform += 1,
                Assessment::Closed => summary.skipped_closed += 1,
                Assessment::MissingData => summary.skipped_missing_data += 1,
                Assessment::Failed(kind, message) => {
                    warn!(
                        option_id_1 = %pair.option_id_1,
                        option_id_2 = %pair.option_id_2,
                        error = %message,
                        "Pair failed"
                    );
                    summary.fail(pair, kind, message);
                }
                Assessment::Evaluated(Outcome::NoOpportunity) => summary.evaluated += 1,
                Assessment::Evaluated(Outcome::Opportunity(scenario)) => {
                    summary.evaluated += 1;
                    summary.profitable += 1;
                    let recorded = self
                        .ledger
                        .record(
                            &pair.option_id_1,
                            &pair.option_id_2,
                            scenario.side_a,
                            scenario.side_b,
                            scenario.profit,
                        )
                        .await;
                    match recorded {
                        Ok(RecordOutcome::Recorded(_)) => summary.recorded += 1,
                        Ok(RecordOutcome::AlreadyRecorded) => summary.duplicates += 1,
                        Err(e) => {
                            let kind = if e.is_cross_reference() {
                                FailureKind::CrossReference
                            } else {
                                FailureKind::Persistence
                            };
                            warn!(
                                option_id_1 = %pair.option_id_1,
                                option_id_2 = %pair.option_id_2,
                                error = %e,
                                "Recording failed"
                            );
                            summary.fail(pair, kind, e.to_string());
                        }
                    }
                }
            }
        }

        info!(
            evaluated = summary.evaluated,
            profitable = summary.profitable,
            recorded = summary.recorded,
            duplicates = summary.duplicates,
            skipped_missing_data = summary.skipped_missing_data,
            skipped_same_platform = summary.skipped_same_platform,
            skipped_closed = summary.skipped_closed,
            errors = summary.failures.len(),
            "Detection run complete"
        );
        Ok(summary)
    }
}
