// Service exports
pub mod postgres;
pub mod source;

pub use postgres::PgCandidateSource;
pub use source::{CandidateSource, InMemoryCandidateSource, SourceError};
