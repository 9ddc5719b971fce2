use intake_domain::{Page, SectionId};
use thiserror::Error;

use crate::storage::StoreError;

/// Top-level failure returned by controller operations.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl IntakeError {
    /// Validation and persistence failures keep the session alive; the user
    /// can fix the page or retry the submission.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IntakeError::Validation(_) | IntakeError::Persistence(_))
    }
}

/// A field whose value is present but unacceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    pub field: String,
    pub reason: String,
}

impl InvalidField {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Section-level validation failure listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.section, .page, .missing_fields, .invalid_fields))]
pub struct ValidationError {
    pub section: SectionId,
    pub page: Option<Page>,
    pub missing_fields: Vec<String>,
    pub invalid_fields: Vec<InvalidField>,
}

impl ValidationError {
    pub fn new(section: SectionId) -> Self {
        Self {
            section,
            page: None,
            missing_fields: Vec::new(),
            invalid_fields: Vec::new(),
        }
    }

    pub fn at(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty() && self.invalid_fields.is_empty()
    }

    /// Every field named by this error, missing ones first.
    pub fn field_names(&self) -> Vec<&str> {
        self.missing_fields
            .iter()
            .map(String::as_str)
            .chain(self.invalid_fields.iter().map(|entry| entry.field.as_str()))
            .collect()
    }
}

fn summarize(
    section: &SectionId,
    page: &Option<Page>,
    missing: &[String],
    invalid: &[InvalidField],
) -> String {
    let mut summary = match page {
        Some(page) => format!("{page} is incomplete"),
        None => format!("section `{section}` is incomplete"),
    };
    if !missing.is_empty() {
        summary.push_str(&format!("; missing: {}", missing.join(", ")));
    }
    for entry in invalid {
        summary.push_str(&format!("; {}: {}", entry.field, entry.reason));
    }
    summary
}

/// Final submission failed after exhausting the retry budget.
#[derive(Debug, Error)]
#[error("submission could not be saved after {attempts} attempt(s): {source}")]
pub struct PersistenceError {
    pub attempts: u32,
    #[source]
    pub source: StoreError,
}

/// Transition that normal navigation never produces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("page mismatch: wizard is on {current} but the action targeted {requested}")]
    PageMismatch { current: Page, requested: Page },
    #[error("`{action}` is only available from review (wizard is on {current})")]
    NotAtReview { action: &'static str, current: Page },
    #[error("{0} is not part of the current page sequence")]
    UnknownPage(Page),
    #[error("{0} does not capture field values")]
    NotEditable(Page),
    #[error("the wizard has finished; restart to begin a new response")]
    Terminal,
}

/// Defect in a survey schema, detected before the wizard starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("survey `{0}` declares no sections")]
    NoSections(String),
    #[error("section `{0}` is declared more than once")]
    DuplicateSection(String),
    #[error("field `{field}` is declared more than once in section `{section}`")]
    DuplicateField { section: String, field: String },
    #[error("field `{field}` in section `{section}`: {reason}")]
    InvalidField {
        section: String,
        field: String,
        reason: String,
    },
    #[error("dynamic items: {0}")]
    InvalidDynamic(String),
}
