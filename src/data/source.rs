//! Boundary with the external history (retrieval) collaborator.
//!
//! The core never performs I/O itself. A `HistorySource` hands over already
//! materialized observations, or a `RetrievalError` that is passed through to
//! the caller unchanged.

use std::collections::HashMap;

use crate::domain::Observation;
use crate::error::RetrievalError;

pub trait HistorySource {
    fn fetch_history(&self, entity_id: &str) -> Result<Vec<Observation>, RetrievalError>;
}

/// In-memory source, mainly for tests and pre-fetched batches.
#[derive(Debug, Clone, Default)]
pub struct StaticHistorySource {
    histories: HashMap<String, Vec<Observation>>,
}

impl StaticHistorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, observations: Vec<Observation>) {
        self.histories.insert(entity_id.into(), observations);
    }

    pub fn with(mut self, entity_id: impl Into<String>, observations: Vec<Observation>) -> Self {
        self.insert(entity_id, observations);
        self
    }
}

impl HistorySource for StaticHistorySource {
    fn fetch_history(&self, entity_id: &str) -> Result<Vec<Observation>, RetrievalError> {
        self.histories
            .get(entity_id)
            .cloned()
            .ok_or_else(|| RetrievalError::new(entity_id, "no citation history available"))
    }
}
