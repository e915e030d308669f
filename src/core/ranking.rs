use std::cmp::Ordering;
use crate::models::ScoredCandidate;

/// Final filter, deterministic sort and truncation of scanned candidates
#[derive(Debug, Clone, Copy)]
pub struct RankingAggregator {
    min_score: f64,
    max_results: usize,
}

impl RankingAggregator {
    pub fn new(min_score: f64, max_results: usize) -> Self {
        Self {
            min_score,
            max_results,
        }
    }

    /// Sort by score (descending), then distance (ascending), then account
    /// number, and keep the top `max_results`
    pub fn rank(&self, candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| c.score >= self.min_score)
            .collect();

        ranked.sort_by(compare_ranked);
        ranked.truncate(self.max_results);
        ranked
    }
}

fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.distance_miles.total_cmp(&b.distance_miles))
        .then_with(|| a.account_number.cmp(&b.account_number))
}
