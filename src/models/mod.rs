// Model exports
pub mod domain;
pub mod summary;

pub use domain::{
    BoundingBox, CandidateBatch, CandidateQuery, Coordinates, Cursor, FeatureCode, Property,
    QualityGrade, ScoreBreakdown, ScoreWeights, ScoredCandidate, SearchParameters, SizeRange,
};
pub use summary::SearchSummary;
