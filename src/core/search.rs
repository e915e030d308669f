use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use validator::Validate;
use crate::core::{
    error::SearchError,
    ranking::RankingAggregator,
    scanner::{CandidateScanner, Termination},
    scoring::ScoreModel,
};
use crate::models::{Property, ScoredCandidate, SearchParameters};
use crate::services::CandidateSource;

/// Result of a search along with how much of the corpus it took
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<ScoredCandidate>,
    /// Candidates pulled from the source, qualifying or not
    pub examined: usize,
    /// Qualifying candidates before truncation
    pub qualifying: usize,
    pub batches: usize,
    pub termination: Termination,
}

/// Finds the properties most comparable to a target
///
/// Holds no per-search state; clones share the source and the weight table,
/// and concurrent searches never interfere.
#[derive(Clone)]
pub struct SimilaritySearchService {
    source: Arc<dyn CandidateSource>,
    model: Arc<ScoreModel>,
}

impl SimilaritySearchService {
    pub fn new(source: Arc<dyn CandidateSource>, model: ScoreModel) -> Self {
        Self {
            source,
            model: Arc::new(model),
        }
    }

    pub fn model(&self) -> &ScoreModel {
        &self.model
    }

    /// Find properties similar to `target_id`, best first
    ///
    /// An empty list means the search ran and nothing qualified.
    pub async fn find_similar(
        &self,
        target_id: &str,
        params: &SearchParameters,
    ) -> Result<Vec<ScoredCandidate>, SearchError> {
        self.find_similar_with_cancel(target_id, params, &CancellationToken::new())
            .await
            .map(|outcome| outcome.results)
    }

    /// Same as [`find_similar`](Self::find_similar), abandoning the search at
    /// the next batch boundary once `cancel` fires
    pub async fn find_similar_with_cancel(
        &self,
        target_id: &str,
        params: &SearchParameters,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, SearchError> {
        self.validate_parameters(params)?;

        let target = self
            .source
            .get_target_by_id(target_id)
            .await?
            .ok_or_else(|| SearchError::NotFound(format!("property {}", target_id)))?;

        if target.coordinates.is_none() {
            return Err(SearchError::InvalidInput(format!(
                "property {} has no coordinates; similarity search needs a location",
                target_id
            )));
        }

        warn_on_sparse_target(&target);

        info!(
            "Finding comparables for {} (radius {} mi, limit {}, min score {})",
            target_id, params.max_radius_miles, params.max_results, params.min_score
        );

        let scan = CandidateScanner::new(&self.model, params)
            .scan(self.source.as_ref(), &target, cancel)
            .await?;

        let qualifying = scan.candidates.len();
        let results = RankingAggregator::new(params.min_score, params.max_results)
            .rank(scan.candidates);

        info!(
            "Returning {} comparables for {} (from {} qualifying, {} examined, {:?})",
            results.len(),
            target_id,
            qualifying,
            scan.examined,
            scan.termination
        );

        Ok(SearchOutcome {
            results,
            examined: scan.examined,
            qualifying,
            batches: scan.batches,
            termination: scan.termination,
        })
    }

    /// Reject parameters that make the search meaningless
    pub fn validate_parameters(&self, params: &SearchParameters) -> Result<(), SearchError> {
        params
            .validate()
            .map_err(|errors| SearchError::InvalidInput(errors.to_string()))?;

        if !params.max_radius_miles.is_finite() {
            return Err(SearchError::InvalidInput(format!(
                "max_radius_miles must be finite, got {}",
                params.max_radius_miles
            )));
        }

        if params.min_score.is_nan() || params.early_stop_quality_score.is_nan() {
            return Err(SearchError::InvalidInput("scores must be numbers".to_string()));
        }

        let ceiling = self.model.max_attainable();
        if params.min_score > ceiling {
            return Err(SearchError::InvalidInput(format!(
                "min_score {} exceeds the maximum attainable score {}",
                params.min_score, ceiling
            )));
        }

        Ok(())
    }
}

fn warn_on_sparse_target(target: &Property) {
    let missing: Vec<&str> = [
        ("heated area", target.heated_area.is_none()),
        ("lot area", target.lot_area.is_none()),
        ("year built", target.year_built.is_none()),
        ("quality", target.quality.is_none()),
        ("bedrooms", target.bedrooms.is_none()),
        ("bathrooms", target.bathrooms.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, is_missing)| is_missing.then_some(name))
    .collect();

    if !missing.is_empty() {
        warn!(
            "Property {} is missing {}; those criteria score zero",
            target.account_number,
            missing.join(", ")
        );
    }
}
