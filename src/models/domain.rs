use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

/// Geographic position of a parcel, in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<Coordinates> for geo::Point<f64> {
    fn from(value: Coordinates) -> Self {
        geo::Point::new(value.longitude, value.latitude)
    }
}

/// Construction quality on the appraisal district's 7-tier scale
///
/// X=Superior, A=Excellent, B=Good, C=Average, D=Low, E=Very Low, F=Poor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    F = 1,
    E = 2,
    D = 3,
    C = 4,
    B = 5,
    A = 6,
    X = 7,
}

impl QualityGrade {
    /// Parse a raw quality code. Unknown codes are treated as missing data.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "X" => Some(Self::X),
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Number of tiers separating two grades
    #[inline]
    pub fn tier_distance(self, other: QualityGrade) -> u8 {
        self.rank().abs_diff(other.rank())
    }
}

/// Categorical amenity attached to a parcel (pool, detached garage, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCode {
    pub code: String,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

impl FeatureCode {
    pub fn active(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_active: true,
        }
    }
}

fn default_true() -> bool { true }

/// A property record, used both as the search subject and as a candidate
///
/// Every building attribute is independently optional; a missing value on
/// either side of a comparison zeroes that criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub account_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Living area in square feet
    #[serde(default)]
    pub heated_area: Option<f64>,
    /// Land area in square feet
    #[serde(default)]
    pub lot_area: Option<f64>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub quality: Option<QualityGrade>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<f64>,
    #[serde(default)]
    pub features: Vec<FeatureCode>,
}

impl Property {
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            ..Self::default()
        }
    }

    /// Codes of the features that are currently active
    pub fn active_feature_codes(&self) -> HashSet<&str> {
        self.features
            .iter()
            .filter(|f| f.is_active)
            .map(|f| f.code.as_str())
            .collect()
    }
}

/// Per-criterion points awarded to one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub heated_area: f64,
    pub lot_area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub quality: f64,
    pub features: f64,
    pub age: f64,
}

impl ScoreBreakdown {
    /// Total score, rounded to one decimal place
    pub fn total(&self) -> f64 {
        let raw = self.heated_area
            + self.lot_area
            + self.bedrooms
            + self.bathrooms
            + self.quality
            + self.features
            + self.age;
        (raw * 10.0).round() / 10.0
    }
}

/// Candidate that survived the radius and minimum-score filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub account_number: String,
    pub distance_miles: f64,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub property: Property,
}

/// Geospatial bounding box
///
/// `min_lon > max_lon` means the box wraps across the antimeridian and
/// covers `[min_lon, 180]` plus `[-180, max_lon]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }
}

/// Inclusive heated-area range pushed down to the candidate source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

impl SizeRange {
    #[inline]
    pub fn contains(&self, area: f64) -> bool {
        area >= self.min && area <= self.max
    }
}

/// Opaque position in a candidate source's iteration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor(pub i64);

/// Candidate query parameters
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub bounding_box: BoundingBox,
    pub size_range: Option<SizeRange>,
    pub exclude_ids: Vec<String>,
    pub limit: usize,
}

/// One batch of candidates; `next_cursor` is `None` once the source is drained
#[derive(Debug, Clone, Default)]
pub struct CandidateBatch {
    pub candidates: Vec<Property>,
    pub next_cursor: Option<Cursor>,
}

/// Search parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    #[validate(range(exclusive_min = 0.0))]
    pub max_radius_miles: f64,
    #[validate(range(min = 1))]
    pub max_results: usize,
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_score: f64,
    /// Hard upper bound on candidates examined per search
    #[validate(range(min = 1))]
    pub safety_cap: usize,
    #[validate(range(min = 1))]
    pub batch_size: usize,
    /// Early termination needs `early_stop_multiplier * max_results` results...
    #[validate(range(min = 1))]
    pub early_stop_multiplier: usize,
    /// ...each scoring at least this much
    #[validate(range(min = 0.0, max = 100.0))]
    pub early_stop_quality_score: f64,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            max_radius_miles: 5.0,
            max_results: 50,
            min_score: 30.0,
            safety_cap: 10_000,
            batch_size: 1_000,
            early_stop_multiplier: 3,
            early_stop_quality_score: 50.0,
        }
    }
}

/// Maximum points per criterion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub heated_area: f64,
    pub lot_area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub quality: f64,
    pub features: f64,
    pub age: f64,
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, points)| points).sum()
    }

    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("heated_area", self.heated_area),
            ("lot_area", self.lot_area),
            ("bedrooms", self.bedrooms),
            ("bathrooms", self.bathrooms),
            ("quality", self.quality),
            ("features", self.features),
            ("age", self.age),
        ]
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            heated_area: 22.0,
            lot_area: 15.0,
            bedrooms: 18.0,
            bathrooms: 18.0,
            quality: 12.0,
            features: 10.0,
            age: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_code() {
        assert_eq!(QualityGrade::from_code(" b "), Some(QualityGrade::B));
        assert_eq!(QualityGrade::from_code("X"), Some(QualityGrade::X));
        assert_eq!(QualityGrade::from_code("Z"), None);
        assert_eq!(QualityGrade::from_code(""), None);
    }

    #[test]
    fn test_quality_tier_distance() {
        assert_eq!(QualityGrade::B.tier_distance(QualityGrade::B), 0);
        assert_eq!(QualityGrade::B.tier_distance(QualityGrade::D), 2);
        assert_eq!(QualityGrade::F.tier_distance(QualityGrade::X), 6);
    }

    #[test]
    fn test_inactive_features_ignored() {
        let mut property = Property::new("1");
        property.features = vec![
            FeatureCode::active("POOL"),
            FeatureCode { code: "SPA".to_string(), is_active: false },
        ];

        let codes = property.active_feature_codes();
        assert!(codes.contains("POOL"));
        assert!(!codes.contains("SPA"));
    }

    #[test]
    fn test_default_weights_sum_to_100() {
        assert_eq!(ScoreWeights::default().total(), 100.0);
    }

    #[test]
    fn test_breakdown_total_rounds() {
        let breakdown = ScoreBreakdown {
            heated_area: 18.0 / 22.0 * 22.0,
            bedrooms: 10.0 / 18.0 * 18.0,
            ..ScoreBreakdown::default()
        };
        assert_eq!(breakdown.total(), 28.0);
    }

    #[test]
    fn test_default_parameters_valid() {
        assert!(SearchParameters::default().validate().is_ok());
    }

    #[test]
    fn test_zero_radius_rejected() {
        let params = SearchParameters {
            max_radius_miles: 0.0,
            ..SearchParameters::default()
        };
        assert!(params.validate().is_err());
    }
}
