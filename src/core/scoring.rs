use std::collections::HashSet;
use crate::core::error::SearchError;
use crate::models::{Property, ScoreBreakdown, ScoreWeights};

/// Slack for float noise at band edges (e.g. 2.5 - 2.0 baths)
const BAND_EPSILON: f64 = 1e-9;

/// Tolerance when checking that the weight table sums to 100
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Differences up to `limit` earn `fraction` of a criterion's maximum points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub limit: f64,
    pub fraction: f64,
}

const fn band(limit: f64, fraction: f64) -> Band {
    Band { limit, fraction }
}

/// Monotone, piecewise-constant map from a difference to a fraction of points
///
/// Bands are ordered by ascending `limit` with non-increasing `fraction`;
/// anything past the last band earns nothing.
#[derive(Debug, Clone, Copy)]
pub struct Banding(&'static [Band]);

impl Banding {
    pub fn fraction(&self, difference: f64) -> f64 {
        if !difference.is_finite() {
            return 0.0;
        }
        self.0
            .iter()
            .find(|b| difference <= b.limit + BAND_EPSILON)
            .map(|b| b.fraction)
            .unwrap_or(0.0)
    }
}

/// Relative heated-area difference
pub const HEATED_AREA_BANDS: Banding = Banding(&[
    band(0.10, 1.0),
    band(0.20, 18.0 / 22.0),
    band(0.30, 0.5),
    band(0.50, 6.0 / 22.0),
]);

/// Relative lot-area difference
pub const LOT_AREA_BANDS: Banding = Banding(&[
    band(0.10, 1.0),
    band(0.20, 0.8),
    band(0.30, 8.0 / 15.0),
    band(0.50, 4.0 / 15.0),
]);

/// Absolute bedroom difference
pub const BEDROOM_BANDS: Banding = Banding(&[
    band(0.0, 1.0),
    band(1.0, 10.0 / 18.0),
    band(2.0, 5.0 / 18.0),
]);

/// Absolute bathroom difference, half-bath granularity
pub const BATHROOM_BANDS: Banding = Banding(&[
    band(0.5, 1.0),
    band(1.0, 11.0 / 18.0),
    band(1.5, 5.0 / 18.0),
]);

/// Tiers apart on the quality scale
pub const QUALITY_BANDS: Banding = Banding(&[
    band(0.0, 1.0),
    band(1.0, 8.0 / 12.0),
    band(2.0, 4.0 / 12.0),
]);

/// Absolute difference in year built
pub const AGE_BANDS: Banding = Banding(&[
    band(2.0, 1.0),
    band(5.0, 0.8),
    band(10.0, 0.6),
    band(15.0, 0.4),
]);

/// Jaccard similarity |A∩B| / |A∪B|, zero when both sets are empty
pub fn jaccard_similarity(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Weighted multi-criterion scoring of a target/candidate pair
///
/// The weight table is validated once here and never re-checked per call.
/// Distance is not an input; it only filters.
#[derive(Debug, Clone)]
pub struct ScoreModel {
    weights: ScoreWeights,
}

impl ScoreModel {
    pub fn new(weights: ScoreWeights) -> Result<Self, SearchError> {
        for (name, points) in weights.entries() {
            if !points.is_finite() || points < 0.0 {
                return Err(SearchError::Config(format!(
                    "weight '{}' must be a non-negative number, got {}",
                    name, points
                )));
            }
        }

        let total = weights.total();
        if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SearchError::Config(format!(
                "weights must sum to 100, got {}",
                total
            )));
        }

        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Highest score any candidate can reach under this weight table
    pub fn max_attainable(&self) -> f64 {
        self.weights.total()
    }

    /// Score a candidate against the target, criterion by criterion
    ///
    /// A criterion contributes zero whenever either side lacks the value it
    /// compares; no default is ever substituted.
    pub fn score(&self, target: &Property, candidate: &Property) -> ScoreBreakdown {
        let w = &self.weights;

        ScoreBreakdown {
            heated_area: award(
                w.heated_area,
                &HEATED_AREA_BANDS,
                relative_difference(target.heated_area, candidate.heated_area),
            ),
            lot_area: award(
                w.lot_area,
                &LOT_AREA_BANDS,
                relative_difference(target.lot_area, candidate.lot_area),
            ),
            bedrooms: award(
                w.bedrooms,
                &BEDROOM_BANDS,
                both(target.bedrooms, candidate.bedrooms).map(|(t, c)| t.abs_diff(c) as f64),
            ),
            bathrooms: award(
                w.bathrooms,
                &BATHROOM_BANDS,
                both(known_count(target.bathrooms), known_count(candidate.bathrooms))
                    .map(|(t, c)| (t - c).abs()),
            ),
            quality: award(
                w.quality,
                &QUALITY_BANDS,
                both(target.quality, candidate.quality).map(|(t, c)| t.tier_distance(c) as f64),
            ),
            features: w.features
                * jaccard_similarity(
                    &target.active_feature_codes(),
                    &candidate.active_feature_codes(),
                ),
            age: award(
                w.age,
                &AGE_BANDS,
                both(known_year(target.year_built), known_year(candidate.year_built))
                    .map(|(t, c)| t.abs_diff(c) as f64),
            ),
        }
    }
}

impl Default for ScoreModel {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }
}

#[inline]
fn award(max_points: f64, banding: &Banding, difference: Option<f64>) -> f64 {
    difference
        .map(|d| max_points * banding.fraction(d))
        .unwrap_or(0.0)
}

#[inline]
fn both<T>(a: Option<T>, b: Option<T>) -> Option<(T, T)> {
    a.zip(b)
}

/// |target - candidate| / target; areas must be positive to compare
#[inline]
fn relative_difference(target: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    let (t, c) = both(known_area(target), known_area(candidate))?;
    Some((t - c).abs() / t)
}

#[inline]
fn known_area(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[inline]
fn known_count(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

#[inline]
fn known_year(value: Option<i32>) -> Option<i32> {
    value.filter(|y| *y > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureCode, QualityGrade};

    fn create_test_property(id: &str) -> Property {
        Property {
            heated_area: Some(2000.0),
            lot_area: Some(7500.0),
            year_built: Some(2005),
            quality: Some(QualityGrade::B),
            bedrooms: Some(3),
            bathrooms: Some(2.5),
            features: vec![FeatureCode::active("POOL"), FeatureCode::active("DETGAR")],
            ..Property::new(id)
        }
    }

    #[test]
    fn test_bands_hit_breakpoints() {
        assert_eq!(HEATED_AREA_BANDS.fraction(0.10), 1.0);
        assert_eq!(HEATED_AREA_BANDS.fraction(0.30), 0.5);
        assert_eq!(HEATED_AREA_BANDS.fraction(0.51), 0.0);
        assert_eq!(BEDROOM_BANDS.fraction(3.0), 0.0);
        assert_eq!(BATHROOM_BANDS.fraction(0.5), 1.0);
        assert_eq!(AGE_BANDS.fraction(15.0), 0.4);
        assert_eq!(AGE_BANDS.fraction(16.0), 0.0);
    }

    #[test]
    fn test_bands_monotone() {
        for banding in [
            HEATED_AREA_BANDS,
            LOT_AREA_BANDS,
            BEDROOM_BANDS,
            BATHROOM_BANDS,
            QUALITY_BANDS,
            AGE_BANDS,
        ] {
            let mut previous = f64::INFINITY;
            for step in 0..400 {
                let fraction = banding.fraction(step as f64 * 0.05);
                assert!(fraction <= previous);
                assert!((0.0..=1.0).contains(&fraction));
                previous = fraction;
            }
        }
    }

    #[test]
    fn test_jaccard() {
        let a: HashSet<&str> = ["POOL", "DETGAR"].into_iter().collect();
        let b: HashSet<&str> = ["POOL"].into_iter().collect();
        let c: HashSet<&str> = ["SPA"].into_iter().collect();
        let empty = HashSet::new();

        assert_eq!(jaccard_similarity(&a, &a), 1.0);
        assert_eq!(jaccard_similarity(&a, &b), 0.5);
        assert_eq!(jaccard_similarity(&a, &c), 0.0);
        assert_eq!(jaccard_similarity(&empty, &empty), 0.0);
        assert_eq!(jaccard_similarity(&a, &empty), 0.0);
    }

    #[test]
    fn test_identical_property_scores_100() {
        let model = ScoreModel::default();
        let target = create_test_property("target");
        let candidate = create_test_property("candidate");

        assert_eq!(model.score(&target, &candidate).total(), 100.0);
    }

    #[test]
    fn test_missing_target_attribute_zeroes_criterion() {
        let model = ScoreModel::default();
        let mut target = create_test_property("target");
        target.heated_area = None;
        target.quality = None;
        let candidate = create_test_property("candidate");

        let breakdown = model.score(&target, &candidate);
        assert_eq!(breakdown.heated_area, 0.0);
        assert_eq!(breakdown.quality, 0.0);
        assert_eq!(breakdown.total(), 66.0);
    }

    #[test]
    fn test_zero_target_area_is_unknown() {
        let model = ScoreModel::default();
        let mut target = create_test_property("target");
        target.heated_area = Some(0.0);
        let candidate = create_test_property("candidate");

        assert_eq!(model.score(&target, &candidate).heated_area, 0.0);
    }

    #[test]
    fn test_weights_must_sum_to_100() {
        let weights = ScoreWeights {
            age: 10.0,
            ..ScoreWeights::default()
        };
        assert!(matches!(ScoreModel::new(weights), Err(SearchError::Config(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoreWeights {
            age: -5.0,
            features: 20.0,
            ..ScoreWeights::default()
        };
        assert!(matches!(ScoreModel::new(weights), Err(SearchError::Config(_))));
    }

    #[test]
    fn test_custom_weights_rescale_bands() {
        let weights = ScoreWeights {
            heated_area: 44.0,
            lot_area: 0.0,
            bedrooms: 18.0,
            bathrooms: 10.0,
            quality: 12.0,
            features: 10.0,
            age: 6.0,
        };
        let model = ScoreModel::new(weights).unwrap();
        let target = create_test_property("target");
        let mut candidate = create_test_property("candidate");
        candidate.heated_area = Some(2300.0);

        let breakdown = model.score(&target, &candidate);
        assert!((breakdown.heated_area - 36.0).abs() < 1e-9);
        assert_eq!(breakdown.lot_area, 0.0);
    }
}
