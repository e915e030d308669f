// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod ranking;
pub mod scanner;
pub mod scoring;
pub mod search;

pub use distance::{distance_miles, calculate_bounding_box, is_within_bounding_box};
pub use error::SearchError;
pub use filters::{size_prefilter, matches_query_constraints};
pub use ranking::RankingAggregator;
pub use scanner::{CandidateScanner, ScanOutcome, Termination};
pub use scoring::{jaccard_similarity, ScoreModel};
pub use search::{SearchOutcome, SimilaritySearchService};
