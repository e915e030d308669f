use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::core::{
    distance::{calculate_bounding_box, distance_miles},
    error::SearchError,
    filters::size_prefilter,
    scoring::ScoreModel,
};
use crate::models::{CandidateQuery, Coordinates, Cursor, Property, ScoredCandidate, SearchParameters};
use crate::services::CandidateSource;

/// Why the scanner stopped pulling batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every candidate in the bounding box was examined
    Exhausted,
    /// Enough good results accumulated before the box was drained
    EarlyTerminated,
    /// The safety cap on examined candidates was reached
    SafetyCap,
}

/// Result of scanning the corpus for one target
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Qualifying candidates in the order they were found
    pub candidates: Vec<ScoredCandidate>,
    pub examined: usize,
    pub batches: usize,
    pub termination: Termination,
}

/// Drives batched retrieval from a [`CandidateSource`] and scores what comes back
///
/// # Pipeline Stages
/// 1. Bounding box + heated-area window, pushed down to the source
/// 2. Duplicate and coordinate checks
/// 3. Precise radius check
/// 4. Scoring and minimum-score filter
///
/// Batches are pulled one at a time; scoring within a batch runs on the
/// rayon pool and is collected back in source order. The scan yields to the
/// runtime between batches and stops at the first empty batch.
pub struct CandidateScanner<'a> {
    model: &'a ScoreModel,
    params: &'a SearchParameters,
}

impl<'a> CandidateScanner<'a> {
    pub fn new(model: &'a ScoreModel, params: &'a SearchParameters) -> Self {
        Self { model, params }
    }

    pub async fn scan<S>(
        &self,
        source: &S,
        target: &Property,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, SearchError>
    where
        S: CandidateSource + ?Sized,
    {
        if self.params.batch_size == 0 {
            return Err(SearchError::InvalidInput(
                "batch_size must be at least 1".to_string(),
            ));
        }

        let origin = target.coordinates.ok_or_else(|| {
            SearchError::InvalidInput(format!(
                "property {} has no coordinates",
                target.account_number
            ))
        })?;

        let bounding_box = calculate_bounding_box(
            origin.latitude,
            origin.longitude,
            self.params.max_radius_miles,
        );
        let size_range = size_prefilter(target);

        let mut seen: HashSet<String> = HashSet::new();
        let mut accumulated: Vec<ScoredCandidate> = Vec::new();
        let mut cursor: Option<Cursor> = None;
        let mut examined = 0usize;
        let mut batches = 0usize;

        let termination = loop {
            let remaining = self.params.safety_cap.saturating_sub(examined);
            if remaining == 0 {
                break Termination::SafetyCap;
            }

            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let query = CandidateQuery {
                bounding_box,
                size_range,
                exclude_ids: vec![target.account_number.clone()],
                limit: self.params.batch_size.min(remaining),
            };

            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                batch = source.query_candidates(&query, cursor) => batch?,
            };
            batches += 1;

            // Never look at more than the cap, even if the source over-delivers
            let pulled = batch.candidates.len();
            let taken = pulled.min(remaining);
            examined += taken;

            let fresh: Vec<Property> = batch
                .candidates
                .into_iter()
                .take(taken)
                .filter(|candidate| {
                    candidate.account_number != target.account_number
                        && seen.insert(candidate.account_number.clone())
                        && candidate.coordinates.is_some()
                })
                .collect();

            let scored: Vec<ScoredCandidate> = fresh
                .into_par_iter()
                .filter_map(|candidate| self.evaluate(target, origin, candidate))
                .collect();

            debug!(
                "Batch {}: pulled {}, qualifying {}, examined {} of cap {}",
                batches,
                pulled,
                scored.len(),
                examined,
                self.params.safety_cap
            );

            accumulated.extend(scored);

            if self.should_stop_early(&accumulated) {
                break Termination::EarlyTerminated;
            }

            // An empty page ends the scan even if the source hands back a cursor
            if pulled == 0 {
                break Termination::Exhausted;
            }

            match batch.next_cursor {
                Some(next) => cursor = Some(next),
                None => break Termination::Exhausted,
            }

            // Sources that never suspend would otherwise starve the runtime
            tokio::task::yield_now().await;
        };

        debug!(
            "Scan for {} finished ({:?}): {} qualifying of {} examined in {} batches",
            target.account_number,
            termination,
            accumulated.len(),
            examined,
            batches
        );

        Ok(ScanOutcome {
            candidates: accumulated,
            examined,
            batches,
            termination,
        })
    }

    /// Radius check, then score; `None` when the candidate does not qualify
    fn evaluate(
        &self,
        target: &Property,
        origin: Coordinates,
        candidate: Property,
    ) -> Option<ScoredCandidate> {
        let distance = distance_miles(origin, candidate.coordinates?);
        if distance > self.params.max_radius_miles {
            return None;
        }

        let breakdown = self.model.score(target, &candidate);
        let score = breakdown.total();
        if score < self.params.min_score {
            return None;
        }

        Some(ScoredCandidate {
            account_number: candidate.account_number.clone(),
            distance_miles: distance,
            score,
            breakdown,
            property: candidate,
        })
    }

    /// Enough results, and enough of them good ones, to stop scanning
    fn should_stop_early(&self, accumulated: &[ScoredCandidate]) -> bool {
        let required = self
            .params
            .early_stop_multiplier
            .saturating_mul(self.params.max_results);

        if accumulated.len() < required {
            return false;
        }

        let good = accumulated
            .iter()
            .filter(|c| c.score >= self.params.early_stop_quality_score)
            .count();

        good >= required
    }
}
