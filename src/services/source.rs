use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use crate::core::filters::matches_query_constraints;
use crate::models::{CandidateBatch, CandidateQuery, Cursor, Property};

/// Errors that can occur when reading the property corpus
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corpus unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the property corpus
///
/// Implementations must page through candidates incrementally: a call returns
/// at most `query.limit` records and a cursor to resume from. An empty batch
/// ends the scan whether or not it carries a cursor. The scanner never issues
/// overlapping calls for the same search.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Resolve a target by account number. Duplicate records resolve to the
    /// first one in the source's natural order.
    async fn get_target_by_id(&self, account_number: &str) -> Result<Option<Property>, SourceError>;

    /// Fetch the next batch of candidates inside the query's bounding box
    /// and (optional) heated-area window, starting after `cursor`.
    async fn query_candidates(
        &self,
        query: &CandidateQuery,
        cursor: Option<Cursor>,
    ) -> Result<CandidateBatch, SourceError>;
}

/// Corpus snapshot held in memory
///
/// Iteration order is the insertion order; duplicates are kept as given.
/// Useful for embedding a pre-loaded county extract, for benches and tests.
#[derive(Debug, Default)]
pub struct InMemoryCandidateSource {
    properties: Vec<Property>,
    requests: AtomicUsize,
}

impl InMemoryCandidateSource {
    pub fn new(properties: Vec<Property>) -> Self {
        Self {
            properties,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of batch requests served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CandidateSource for InMemoryCandidateSource {
    async fn get_target_by_id(&self, account_number: &str) -> Result<Option<Property>, SourceError> {
        Ok(self
            .properties
            .iter()
            .find(|p| p.account_number == account_number)
            .cloned())
    }

    async fn query_candidates(
        &self,
        query: &CandidateQuery,
        cursor: Option<Cursor>,
    ) -> Result<CandidateBatch, SourceError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let start = match cursor {
            Some(Cursor(position)) => usize::try_from(position)
                .map_err(|_| SourceError::Unavailable(format!("invalid cursor {}", position)))?,
            None => 0,
        };

        let mut candidates = Vec::with_capacity(query.limit.min(self.properties.len()));
        let mut position = start;

        while position < self.properties.len() && candidates.len() < query.limit {
            let property = &self.properties[position];
            if matches_query_constraints(property, query) {
                candidates.push(property.clone());
            }
            position += 1;
        }

        let next_cursor = if position < self.properties.len() {
            Some(Cursor(position as i64))
        } else {
            None
        };

        Ok(CandidateBatch {
            candidates,
            next_cursor,
        })
    }
}
