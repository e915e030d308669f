use serde::{Deserialize, Serialize};
use crate::models::domain::ScoredCandidate;

/// Descriptive statistics over one result set
///
/// Downstream consumers (protest evidence, value recommendations) read the
/// score and distance distribution from here instead of recomputing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub count: usize,
    pub highest_score: Option<f64>,
    pub median_score: Option<f64>,
    pub lowest_score: Option<f64>,
    pub mean_score: Option<f64>,
    pub at_least_70: usize,
    pub at_least_60: usize,
    pub at_least_50: usize,
    pub closest_miles: Option<f64>,
    pub median_miles: Option<f64>,
    pub farthest_miles: Option<f64>,
    pub within_3_miles: usize,
    pub within_5_miles: usize,
}

impl SearchSummary {
    pub fn from_results(results: &[ScoredCandidate]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut scores: Vec<f64> = results.iter().map(|r| r.score).collect();
        let mut distances: Vec<f64> = results.iter().map(|r| r.distance_miles).collect();
        scores.sort_by(f64::total_cmp);
        distances.sort_by(f64::total_cmp);

        let count = results.len();
        let mean = scores.iter().sum::<f64>() / count as f64;

        Self {
            count,
            highest_score: scores.last().copied(),
            median_score: median(&scores),
            lowest_score: scores.first().copied(),
            mean_score: Some(mean),
            at_least_70: scores.iter().filter(|s| **s >= 70.0).count(),
            at_least_60: scores.iter().filter(|s| **s >= 60.0).count(),
            at_least_50: scores.iter().filter(|s| **s >= 50.0).count(),
            closest_miles: distances.first().copied(),
            median_miles: median(&distances),
            farthest_miles: distances.last().copied(),
            within_3_miles: distances.iter().filter(|d| **d <= 3.0).count(),
            within_5_miles: distances.iter().filter(|d| **d <= 5.0).count(),
        }
    }
}

/// Median of an already-sorted slice
fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Property, ScoreBreakdown};

    fn scored(id: &str, score: f64, distance_miles: f64) -> ScoredCandidate {
        ScoredCandidate {
            account_number: id.to_string(),
            distance_miles,
            score,
            breakdown: ScoreBreakdown::default(),
            property: Property::new(id),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = SearchSummary::from_results(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.median_score.is_none());
        assert!(summary.closest_miles.is_none());
    }

    #[test]
    fn test_summary_statistics() {
        let results = vec![
            scored("1", 90.0, 0.5),
            scored("2", 72.0, 2.0),
            scored("3", 55.0, 4.0),
            scored("4", 40.0, 4.5),
        ];

        let summary = SearchSummary::from_results(&results);

        assert_eq!(summary.count, 4);
        assert_eq!(summary.highest_score, Some(90.0));
        assert_eq!(summary.lowest_score, Some(40.0));
        assert_eq!(summary.median_score, Some(63.5));
        assert_eq!(summary.mean_score, Some(64.25));
        assert_eq!(summary.at_least_70, 2);
        assert_eq!(summary.at_least_60, 2);
        assert_eq!(summary.at_least_50, 3);
        assert_eq!(summary.closest_miles, Some(0.5));
        assert_eq!(summary.median_miles, Some(3.0));
        assert_eq!(summary.within_3_miles, 2);
        assert_eq!(summary.within_5_miles, 4);
    }
}
