use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{SectionData, SectionId};

/// Identifier assigned by the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully assembled draft handed to the store on final submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDocument {
    pub contact: SectionData,
    pub request: BTreeMap<SectionId, SectionData>,
    pub items: Vec<SectionData>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionDocument {
    fn contact_text(&self, key: &str) -> String {
        self.contact
            .get(key)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }
}

/// A document as read back from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub document: SubmissionDocument,
}

impl StoredSubmission {
    pub fn summary(&self) -> SubmissionSummary {
        SubmissionSummary {
            id: self.id,
            submitted_at: self.document.submitted_at,
            contact_name: self.document.contact_text("name"),
            contact_email: self.document.contact_text("email"),
            item_count: self.document.items.len(),
        }
    }
}

/// Listing row for stored submissions.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionSummary {
    pub id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub contact_name: String,
    pub contact_email: String,
    pub item_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    #[test]
    fn stored_submission_flattens_document() {
        let mut contact = SectionData::new();
        contact.insert("name".into(), FieldValue::text("Grace"));
        contact.insert("email".into(), FieldValue::text("grace@example.edu"));
        let stored = StoredSubmission {
            id: SubmissionId::new(),
            document: SubmissionDocument {
                contact,
                request: BTreeMap::new(),
                items: vec![SectionData::new(), SectionData::new()],
                submitted_at: Utc::now(),
            },
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert!(json.get("id").is_some());
        assert_eq!(json["contact"]["name"], "Grace");
        assert!(json.get("document").is_none());

        let summary = stored.summary();
        assert_eq!(summary.contact_email, "grace@example.edu");
        assert_eq!(summary.item_count, 2);
    }
}
