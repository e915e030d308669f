//! Comps Engine - comparable-property search for property tax protests
//!
//! Given a subject property, this library finds the most comparable
//! properties within a radius, ranked by a weighted multi-criterion score.
//! It combines a geospatial pre-filter, bounded batch scanning of the corpus
//! and banded attribute scoring.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{SearchError, SearchOutcome, SimilaritySearchService, ScoreModel, distance::{distance_miles, calculate_bounding_box}};
pub use models::{Property, ScoredCandidate, SearchParameters, SearchSummary, ScoreWeights};
pub use services::{CandidateSource, InMemoryCandidateSource, PgCandidateSource};
