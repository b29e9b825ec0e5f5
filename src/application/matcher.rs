//! Candidate matching of options across platforms.
//!
//! The matcher scores every cross pair of option labels with a pluggable
//! [`SimilarityScorer`] and keeps every pair clearing the threshold. It does
//! not try to build a one-to-one assignment: a "Yes" option on one side may
//! legitimately match several sub-markets on the other.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::matching::ensure_cross_platform;
use crate::domain::{
    Candidate, MarketMatch, MarketOption, OptionId, OptionLabel, OptionMatch, Platform,
};
use crate::error::Result;
use crate::port::outbound::store::CatalogStore;

/// Text similarity in `[0, 1]`.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Longest-matching-blocks ratio: `2·M / (|a| + |b|)` where `M` is the
/// number of characters in recursively found longest common blocks.
///
/// Comparison is case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SequenceRatio {
    fn longest_match(
        a: &[char],
        b: &[char],
        (alo, ahi): (usize, usize),
        (blo, bhi): (usize, usize),
    ) -> (usize, usize, usize) {
        let mut best = (alo, blo, 0);
        let width = bhi - blo + 1;
        let mut prev = vec![0usize; width];
        for i in alo..ahi {
            let mut cur = vec![0usize; width];
            for j in blo..bhi {
                if a[i] == b[j] {
                    let k = prev[j - blo] + 1;
                    cur[j - blo + 1] = k;
                    if k > best.2 {
                        best = (i + 1 - k, j + 1 - k, k);
                    }
                }
            }
            prev = cur;
        }
        best
    }

    fn matched_chars(a: &[char], b: &[char]) -> usize {
        let mut total = 0;
        let mut pending = vec![((0, a.len()), (0, b.len()))];
        while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
            let (i, j, k) = Self::longest_match(a, b, (alo, ahi), (blo, bhi));
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                pending.push(((alo, i), (blo, j)));
            }
            if i + k < ahi && j + k < bhi {
                pending.push(((i + k, ahi), (j + k, bhi)));
            }
        }
        total
    }
}

impl SimilarityScorer for SequenceRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.trim().to_lowercase().chars().collect();
        let b: Vec<char> = b.trim().to_lowercase().chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        let matched = Self::matched_chars(&a, &b);
        (2 * matched) as f64 / total as f64
    }

    fn name(&self) -> &'static str {
        "sequence"
    }
}

/// Jaccard similarity of lowercase alphanumeric word tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlap;

impl TokenOverlap {
    fn tokens(text: &str) -> std::collections::HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

impl SimilarityScorer for TokenOverlap {
    fn score(&self, a: &str, b: &str) -> f64 {
        let left = Self::tokens(a);
        let right = Self::tokens(b);
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        let intersection = left.intersection(&right).count();
        let union = left.union(&right).count();
        intersection as f64 / union as f64
    }

    fn name(&self) -> &'static str {
        "token_overlap"
    }
}

/// Configured choice of scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    Sequence,
    TokenOverlap,
}

impl ScorerKind {
    #[must_use]
    pub fn build(self) -> Arc<dyn SimilarityScorer> {
        match self {
            Self::Sequence => Arc::new(SequenceRatio),
            Self::TokenOverlap => Arc::new(TokenOverlap),
        }
    }
}

/// Counts from one [`CandidateMatcher::match_markets`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub market_matches: usize,
    pub skipped_same_platform: usize,
    pub candidates: usize,
    pub inserted: usize,
}

/// Proposes option pairings whose labels are similar enough.
#[derive(Clone)]
pub struct CandidateMatcher {
    scorer: Arc<dyn SimilarityScorer>,
    threshold: f64,
}

impl CandidateMatcher {
    #[must_use]
    pub fn new(scorer: Arc<dyn SimilarityScorer>, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every cross pair and keep those with `score >= threshold`.
    ///
    /// Pairs whose labels are on the same platform are skipped regardless
    /// of score.
    #[must_use]
    pub fn match_options(
        &self,
        labels_a: &[OptionLabel],
        labels_b: &[OptionLabel],
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for a in labels_a {
            for b in labels_b {
                if let Err(e) = ensure_cross_platform(&a.id, &a.platform, &b.id, &b.platform) {
                    debug!(error = %e, "Skipping same-platform candidate");
                    continue;
                }
                let score = self.scorer.score(&a.text, &b.text);
                if score >= self.threshold {
                    candidates.push(Candidate {
                        option_a: a.id.clone(),
                        option_b: b.id.clone(),
                        score,
                    });
                }
            }
        }
        candidates
    }

    /// Populate option matches for every stored market match.
    ///
    /// # Errors
    /// Returns store errors; a same-platform market match is skipped, not
    /// an error.
    pub async fn match_markets<S: CatalogStore>(&self, store: &S) -> Result<MatchSummary> {
        let mut summary = MatchSummary::default();

        for market_match in store.market_matches().await? {
            summary.market_matches += 1;
            if market_match.is_same_platform() {
                warn!(
                    event_id = market_match.event_id,
                    platform = %market_match.platform_1,
                    "Market match joins a platform to itself, skipping"
                );
                summary.skipped_same_platform += 1;
                continue;
            }

            let options_1 = store.options_for_market(&market_match.market_id_1).await?;
            let options_2 = store.options_for_market(&market_match.market_id_2).await?;
            let found = self.match_options(
                &labels(&options_1, &market_match.platform_1),
                &labels(&options_2, &market_match.platform_2),
            );
            summary.candidates += found.len();

            let rows = to_option_matches(&market_match, &options_1, &options_2, &found);
            summary.inserted += store.save_option_matches(&rows).await?;
            debug!(
                event_id = market_match.event_id,
                candidates = found.len(),
                "Matched options"
            );
        }

        info!(
            scorer = self.scorer.name(),
            threshold = self.threshold,
            market_matches = summary.market_matches,
            candidates = summary.candidates,
            inserted = summary.inserted,
            "Option matching complete"
        );
        Ok(summary)
    }
}

fn labels(options: &[MarketOption], platform: &Platform) -> Vec<OptionLabel> {
    options
        .iter()
        .map(|o| OptionLabel::new(o.id.clone(), o.name.clone(), platform.clone()))
        .collect()
}

fn to_option_matches(
    market_match: &MarketMatch,
    options_1: &[MarketOption],
    options_2: &[MarketOption],
    candidates: &[Candidate],
) -> Vec<OptionMatch> {
    let name = |options: &[MarketOption], id: &OptionId| {
        options
            .iter()
            .find(|o| &o.id == id)
            .map(|o| o.name.clone())
            .unwrap_or_default()
    };
    candidates
        .iter()
        .map(|c| OptionMatch {
            event_id: market_match.event_id,
            option_id_1: c.option_a.clone(),
            name_1: name(options_1, &c.option_a),
            option_id_2: c.option_b.clone(),
            name_2: name(options_2, &c.option_b),
        })
        .collect()
}
