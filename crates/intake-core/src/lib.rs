//! intake-core
//!
//! Wizard state machine for the lab intake survey: section schema, section
//! validators, page sequencing, dynamic item reconciliation and the controller.
//! Depends on intake-domain. No terminal I/O, no direct filesystem access.

pub mod controller;
pub mod error;
pub mod navigation;
pub mod reconcile;
pub mod schema;
pub mod storage;
pub mod survey;
pub mod time;
pub mod validator;

pub use controller::{SubmissionReceipt, SubmitPolicy, WizardController};
pub use error::{
    IntakeError, InvalidField, PersistenceError, SchemaError, StateError, ValidationError,
};
pub use navigation::PageSequence;
pub use schema::{
    DynamicItems, FieldDescriptor, FieldKind, OtherOption, SectionSchema, SurveySchema,
};
pub use storage::{InMemorySubmissionStore, StoreError, SubmissionStore};
pub use survey::lab_survey;
pub use time::{Clock, SystemClock};
pub use validator::validate;
