//! Cross-platform arbitrage evaluation.
//!
//! Two matched binary options A and B admit two opposite-side bets:
//!
//! - YES on A + NO on B
//! - NO on A + YES on B
//!
//! Exactly one leg of either bet pays out 100, so a bet whose combined cost
//! is strictly below 100 locks in `100 - cost` per contract pair.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::opportunity::ScenarioKind;
use crate::domain::{BetSide, LegCosts, OptionId, Outcome, Scenario, PAYOUT};
use crate::error::{Error, Result};
use crate::port::outbound::store::PriceSource;

use super::normalizer::PriceNormalizer;

fn scenario(kind: ScenarioKind, cost: Decimal) -> Option<Scenario> {
    if cost >= PAYOUT {
        return None;
    }
    let (side_a, side_b) = match kind {
        ScenarioKind::YesANoB => (BetSide::Yes, BetSide::No),
        ScenarioKind::NoAYesB => (BetSide::No, BetSide::Yes),
    };
    Some(Scenario {
        kind,
        side_a,
        side_b,
        cost,
        profit: PAYOUT - cost,
    })
}

/// Pick the profitable cross bet, if any.
///
/// The cheaper bet wins; on an exact tie YES-on-A/NO-on-B is chosen.
/// Swapping `a` and `b` keeps the profit and mirrors the sides, except on
/// an exact tie: the tie-break follows argument order, so both calls put
/// YES on their first argument.
#[must_use]
pub fn evaluate(a: &LegCosts, b: &LegCosts) -> Outcome {
    let first = scenario(ScenarioKind::YesANoB, a.yes + b.no);
    let second = scenario(ScenarioKind::NoAYesB, a.no + b.yes);

    match (first, second) {
        (Some(s1), Some(s2)) if s2.cost < s1.cost => Outcome::Opportunity(s2),
        (Some(s1), _) => Outcome::Opportunity(s1),
        (None, Some(s2)) => Outcome::Opportunity(s2),
        (None, None) => Outcome::NoOpportunity,
    }
}

/// Normalized costs of one option, or why there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegQuote {
    Costs(LegCosts),
    /// No snapshot, or the lookup failed or timed out.
    Missing,
    /// The option's platform cannot be priced with the loaded configuration.
    Unconfigured(String),
}

/// Result of evaluating a pair whose prices may be unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Evaluated(Outcome),
    Missing,
    Unconfigured(String),
}

/// Evaluates matched options against their latest prices.
pub struct OpportunityEvaluator<'a, P> {
    normalizer: &'a PriceNormalizer,
    prices: &'a P,
    fetch_timeout: Option<Duration>,
}

impl<'a, P: PriceSource> OpportunityEvaluator<'a, P> {
    pub fn new(normalizer: &'a PriceNormalizer, prices: &'a P) -> Self {
        Self {
            normalizer,
            prices,
            fetch_timeout: None,
        }
    }

    /// Bound every price lookup; a lookup that runs over counts as missing.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    async fn lookup(&self, option: &OptionId) -> Option<Result<Option<LegCosts>>> {
        let costs = self.normalizer.latest_costs(self.prices, option);
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, costs).await.ok(),
            None => Some(costs.await),
        }
    }

    /// Latest normalized costs of one option.
    ///
    /// Store failures and timeouts are logged and reported as
    /// [`LegQuote::Missing`].
    pub async fn quote(&self, option: &OptionId) -> LegQuote {
        match self.lookup(option).await {
            Some(Ok(Some(costs))) => LegQuote::Costs(costs),
            Some(Ok(None)) => {
                debug!(option_id = %option, "No price snapshot");
                LegQuote::Missing
            }
            Some(Err(Error::Normalize(e))) => LegQuote::Unconfigured(e.to_string()),
            Some(Err(e)) => {
                warn!(option_id = %option, error = %e, "Price lookup failed");
                LegQuote::Missing
            }
            None => {
                warn!(
                    option_id = %option,
                    timeout_ms = self.fetch_timeout.unwrap_or_default().as_millis() as u64,
                    "Price lookup timed out"
                );
                LegQuote::Missing
            }
        }
    }

    /// Evaluate two options, reporting unavailable data instead of failing.
    pub async fn assess(&self, option_a: &OptionId, option_b: &OptionId) -> Evaluation {
        let a = match self.quote(option_a).await {
            LegQuote::Costs(costs) => costs,
            LegQuote::Missing => return Evaluation::Missing,
            LegQuote::Unconfigured(message) => return Evaluation::Unconfigured(message),
        };
        let b = match self.quote(option_b).await {
            LegQuote::Costs(costs) => costs,
            LegQuote::Missing => return Evaluation::Missing,
            LegQuote::Unconfigured(message) => return Evaluation::Unconfigured(message),
        };
        Evaluation::Evaluated(evaluate(&a, &b))
    }

    /// Evaluate two options. Missing prices yield `NoOpportunity`.
    ///
    /// # Errors
    /// Returns store errors and platform configuration errors.
    pub async fn evaluate(&self, option_a: &OptionId, option_b: &OptionId) -> Result<Outcome> {
        let Some(a) = self.normalizer.latest_costs(self.prices, option_a).await? else {
            return Ok(Outcome::NoOpportunity);
        };
        let Some(b) = self.normalizer.latest_costs(self.prices, option_b).await? else {
            return Ok(Outcome::NoOpportunity);
        };
        Ok(evaluate(&a, &b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::normalizer::{PlatformConfig, PriceScale};
    use crate::domain::{OptionQuote, PriceSnapshot};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn costs(yes: Decimal, no: Decimal) -> LegCosts {
        LegCosts::new(yes, no)
    }

    #[test]
    fn picks_the_cheaper_scenario() {
        // S1 = 72 + 25 = 97, S2 = 35 + 30 = 65
        let outcome = evaluate(&costs(dec!(72), dec!(35)), &costs(dec!(30), dec!(25)));
        let s = outcome.scenario().copied().unwrap();
        assert_eq!(s.kind, ScenarioKind::NoAYesB);
        assert_eq!((s.side_a, s.side_b), (BetSide::No, BetSide::Yes));
        assert_eq!(s.profit, dec!(35));
    }

    #[test]
    fn exactly_one_hundred_is_not_profitable() {
        let outcome = evaluate(&costs(dec!(60), dec!(60)), &costs(dec!(40), dec!(40)));
        assert_eq!(outcome, Outcome::NoOpportunity);
    }

    #[test]
    fn just_under_one_hundred_is_profitable() {
        let outcome = evaluate(&costs(dec!(59.99), dec!(70)), &costs(dec!(50), dec!(40)));
        let s = outcome.scenario().copied().unwrap();
        assert_eq!(s.cost, dec!(99.99));
        assert_eq!(s.profit, dec!(0.01));
    }

    #[test]
    fn tie_selects_yes_on_a() {
        let outcome = evaluate(&costs(dec!(40), dec!(45)), &costs(dec!(45), dec!(50)));
        let s = outcome.scenario().copied().unwrap();
        assert_eq!(s.kind, ScenarioKind::YesANoB);
        assert_eq!(s.profit, dec!(10));
    }

    #[test]
    fn swapping_inputs_swaps_sides_and_keeps_profit() {
        let a = costs(dec!(72), dec!(35));
        let b = costs(dec!(30), dec!(25));
        let ab = evaluate(&a, &b).scenario().copied().unwrap();
        let ba = evaluate(&b, &a).scenario().copied().unwrap();

        assert_eq!(ab.profit, ba.profit);
        assert_eq!(ab.side_a, ba.side_b);
        assert_eq!(ab.side_b, ba.side_a);
    }

    #[test]
    fn symmetric_profit_holds_on_ties() {
        let a = costs(dec!(40), dec!(45));
        let b = costs(dec!(45), dec!(50));
        let ab = evaluate(&a, &b).scenario().copied().unwrap();
        let ba = evaluate(&b, &a).scenario().copied().unwrap();
        assert_eq!(ab.profit, ba.profit);

        // the tie-break follows argument order, so sides do not mirror
        assert_eq!((ab.side_a, ab.side_b), (BetSide::Yes, BetSide::No));
        assert_eq!((ba.side_a, ba.side_b), (BetSide::Yes, BetSide::No));
    }

    #[test]
    fn neither_scenario_profitable() {
        let outcome = evaluate(&costs(dec!(70), dec!(40)), &costs(dec!(65), dec!(35)));
        assert!(!outcome.is_opportunity());
    }

    struct Quotes(Vec<OptionQuote>);

    impl PriceSource for Quotes {
        async fn latest_quote(&self, option: &OptionId) -> Result<Option<OptionQuote>> {
            Ok(self
                .0
                .iter()
                .find(|q| &q.snapshot.option_id == option)
                .cloned())
        }
    }

    fn quote(option: &str, platform: &str, yes: Decimal, no: Decimal) -> OptionQuote {
        OptionQuote {
            platform: platform.into(),
            snapshot: PriceSnapshot::try_new(option, Utc::now(), dec!(1), yes, no).unwrap(),
        }
    }

    fn normalizer() -> PriceNormalizer {
        PriceNormalizer::default()
            .with_platform(
                "kalshi",
                PlatformConfig {
                    scale: PriceScale::Percent,
                    fees: true,
                    fee_coefficient: Some(dec!(0.07)),
                },
            )
            .with_platform(
                "polymarket",
                PlatformConfig {
                    scale: PriceScale::Fraction,
                    ..Default::default()
                },
            )
    }

    #[tokio::test]
    async fn evaluates_latest_prices_with_fees() {
        let quotes = Quotes(vec![
            quote("k", "kalshi", dec!(40), dec!(70)),
            quote("p", "polymarket", dec!(0.50), dec!(0.55)),
        ]);
        let normalizer = normalizer();
        let evaluator = OpportunityEvaluator::new(&normalizer, &quotes);

        let outcome = evaluator
            .evaluate(&OptionId::new("k"), &OptionId::new("p"))
            .await
            .unwrap();
        let scenario = outcome.scenario().unwrap();
        assert_eq!((scenario.side_a, scenario.side_b), (BetSide::Yes, BetSide::No));
        assert_eq!(scenario.cost, dec!(97));
        assert_eq!(scenario.profit, dec!(3));
    }

    #[tokio::test]
    async fn missing_price_is_no_opportunity() {
        let quotes = Quotes(vec![quote("k", "kalshi", dec!(1), dec!(1))]);
        let normalizer = normalizer();
        let evaluator = OpportunityEvaluator::new(&normalizer, &quotes);

        let outcome = evaluator
            .evaluate(&OptionId::new("k"), &OptionId::new("absent"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::NoOpportunity);
    }

    #[tokio::test]
    async fn unconfigured_platform_is_an_error() {
        let quotes = Quotes(vec![
            quote("k", "kalshi", dec!(1), dec!(1)),
            quote("x", "elsewhere", dec!(1), dec!(1)),
        ]);
        let normalizer = normalizer();
        let evaluator = OpportunityEvaluator::new(&normalizer, &quotes);

        let result = evaluator
            .evaluate(&OptionId::new("k"), &OptionId::new("x"))
            .await;
        assert!(matches!(result, Err(crate::error::Error::Normalize(_))));
    }

    #[tokio::test]
    async fn assess_reports_missing_and_unconfigured_legs() {
        let quotes = Quotes(vec![
            quote("k", "kalshi", dec!(40), dec!(70)),
            quote("p", "polymarket", dec!(0.50), dec!(0.55)),
            quote("x", "elsewhere", dec!(1), dec!(1)),
        ]);
        let normalizer = normalizer();
        let evaluator = OpportunityEvaluator::new(&normalizer, &quotes)
            .with_fetch_timeout(Duration::from_secs(1));

        let priced = evaluator
            .assess(&OptionId::new("k"), &OptionId::new("p"))
            .await;
        let Evaluation::Evaluated(outcome) = priced else {
            panic!("expected an evaluation, got {priced:?}");
        };
        assert_eq!(outcome.scenario().unwrap().profit, dec!(3));

        assert_eq!(
            evaluator
                .assess(&OptionId::new("k"), &OptionId::new("absent"))
                .await,
            Evaluation::Missing
        );
        assert!(matches!(
            evaluator.assess(&OptionId::new("x"), &OptionId::new("k")).await,
            Evaluation::Unconfigured(_)
        ));
    }

    struct Stalled;

    impl PriceSource for Stalled {
        async fn latest_quote(&self, _option: &OptionId) -> Result<Option<OptionQuote>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_lookup_counts_as_missing() {
        let normalizer = normalizer();
        let evaluator = OpportunityEvaluator::new(&normalizer, &Stalled)
            .with_fetch_timeout(Duration::from_millis(10));

        assert_eq!(evaluator.quote(&OptionId::new("k")).await, LegQuote::Missing);
    }
}
