use thiserror::Error;
use crate::services::SourceError;

/// Errors surfaced by a similarity search
///
/// An empty result list is never an error; callers can always tell
/// "nothing comparable found" apart from "the search could not run".
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Candidate source error: {0}")]
    Source(#[from] SourceError),
}
