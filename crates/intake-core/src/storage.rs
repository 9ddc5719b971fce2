use std::io;
use std::sync::Mutex;

use intake_domain::{StoredSubmission, SubmissionDocument, SubmissionId, SubmissionSummary};
use thiserror::Error;

/// Failures reported by a persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Submission not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Abstraction over backends capable of storing finished submissions.
pub trait SubmissionStore: Send + Sync {
    fn insert(&self, document: &SubmissionDocument) -> Result<SubmissionId, StoreError>;
    fn load(&self, id: &SubmissionId) -> Result<StoredSubmission, StoreError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<SubmissionSummary>, StoreError>;
}

/// Process-local store used by tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    records: Mutex<Vec<StoredSubmission>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredSubmission>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn insert(&self, document: &SubmissionDocument) -> Result<SubmissionId, StoreError> {
        let id = SubmissionId::new();
        self.records()?.push(StoredSubmission {
            id,
            document: document.clone(),
        });
        Ok(id)
    }

    fn load(&self, id: &SubmissionId) -> Result<StoredSubmission, StoreError> {
        self.records()?
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<SubmissionSummary>, StoreError> {
        let mut rows: Vec<_> = self
            .records()?
            .iter()
            .map(StoredSubmission::summary)
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }
}

impl<T: SubmissionStore + ?Sized> SubmissionStore for std::sync::Arc<T> {
    fn insert(&self, document: &SubmissionDocument) -> Result<SubmissionId, StoreError> {
        (**self).insert(document)
    }

    fn load(&self, id: &SubmissionId) -> Result<StoredSubmission, StoreError> {
        (**self).load(id)
    }

    fn list(&self) -> Result<Vec<SubmissionSummary>, StoreError> {
        (**self).list()
    }
}
