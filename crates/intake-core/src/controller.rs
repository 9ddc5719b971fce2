//! Wizard controller: the only mutator of a [`Draft`].
//!
//! Callers pass the page they believe is showing together with the values it
//! captured. The controller validates, merges, resizes the dynamic item list
//! when the governing answer changes, and decides the next page. Detours
//! started from review (`enter_edit`) return to review on the next forward
//! move instead of continuing through the sequence.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use intake_domain::{Draft, Page, SectionData, SubmissionDocument, SubmissionId};
use tracing::{debug, error, info, warn};

use crate::error::{IntakeError, PersistenceError, SchemaError, StateError};
use crate::navigation::PageSequence;
use crate::reconcile::{governing_count, resize_items};
use crate::schema::{SectionSchema, SurveySchema};
use crate::storage::SubmissionStore;
use crate::time::{Clock, SystemClock};
use crate::validator::validate;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);

/// Retry budget for the final store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl SubmitPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

/// Returned after the store accepted a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub attempts: u32,
}

pub struct WizardController {
    schema: SurveySchema,
    draft: Draft,
    store: Box<dyn SubmissionStore>,
    clock: Box<dyn Clock>,
    policy: SubmitPolicy,
}

impl WizardController {
    /// Checks the schema once and starts an empty draft on the first section.
    pub fn new(
        schema: SurveySchema,
        store: Box<dyn SubmissionStore>,
    ) -> Result<Self, SchemaError> {
        schema.check()?;
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let draft = Draft::new(first_page(&schema), clock.now());
        Ok(Self {
            schema,
            draft,
            store,
            clock,
            policy: SubmitPolicy::default(),
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self.draft.started_at = self.clock.now();
        self
    }

    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn schema(&self) -> &SurveySchema {
        &self.schema
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn current_page(&self) -> &Page {
        &self.draft.current_page
    }

    pub fn sequence(&self) -> PageSequence {
        PageSequence::new(&self.schema, self.draft.items.len())
    }

    /// Stored values used to pre-populate a page.
    pub fn values_for(&self, page: &Page) -> Option<&SectionData> {
        self.draft.values_for(page)
    }

    /// Schema describing the fields of a form page.
    pub fn section_for(&self, page: &Page) -> Option<&SectionSchema> {
        self.schema.form_section(page, self.draft.items.len())
    }

    /// `(position, total)` of the current page; confirmation counts as done.
    pub fn progress(&self) -> (usize, usize) {
        let sequence = self.sequence();
        let total = sequence.len();
        let position = sequence
            .position(&self.draft.current_page)
            .unwrap_or(total);
        (position, total)
    }

    /// Validates and stores `data`, then moves forward (or back to review
    /// when an edit detour is in progress).
    pub fn advance(&mut self, page: &Page, data: SectionData) -> Result<Page, IntakeError> {
        self.apply(page, data)?;
        let next = match self.draft.return_target.take() {
            Some(target) => target,
            None => self
                .sequence()
                .next(page)
                .cloned()
                .unwrap_or(Page::Review),
        };
        debug!(draft = %self.draft.id, from = %page, to = %next, "advance");
        self.draft.current_page = next.clone();
        Ok(next)
    }

    /// Moves to the preceding page without validating or saving. A no-op on
    /// the first page and on confirmation.
    pub fn retreat(&mut self, page: &Page) -> Result<Page, IntakeError> {
        self.ensure_current(page)?;
        if let Some(previous) = self.sequence().previous(page).cloned() {
            debug!(draft = %self.draft.id, from = %page, to = %previous, "retreat");
            self.draft.current_page = previous;
        }
        Ok(self.draft.current_page.clone())
    }

    /// Same validation and merge as [`advance`](Self::advance) but stays on
    /// the page.
    pub fn save_without_advancing(
        &mut self,
        page: &Page,
        data: SectionData,
    ) -> Result<Page, IntakeError> {
        self.apply(page, data)?;
        debug!(draft = %self.draft.id, page = %page, "saved without advancing");
        Ok(self.draft.current_page.clone())
    }

    /// Jumps from review to `target`; the next forward move returns to review.
    pub fn enter_edit(&mut self, target: Page) -> Result<Page, IntakeError> {
        if self.draft.current_page != Page::Review {
            return Err(self.state_error(StateError::NotAtReview {
                action: "edit",
                current: self.draft.current_page.clone(),
            }));
        }
        if !target.is_form() {
            return Err(self.state_error(StateError::NotEditable(target)));
        }
        if !self.sequence().contains(&target) {
            return Err(self.state_error(StateError::UnknownPage(target)));
        }
        debug!(draft = %self.draft.id, target = %target, "edit from review");
        self.draft.current_page = target.clone();
        self.draft.return_target = Some(Page::Review);
        Ok(target)
    }

    /// Re-validates every page, hands the assembled document to the store and
    /// moves to confirmation. On store failure the draft is left untouched on
    /// review so the user can retry.
    pub fn submit(&mut self) -> Result<SubmissionReceipt, IntakeError> {
        if self.draft.current_page != Page::Review {
            return Err(self.state_error(StateError::NotAtReview {
                action: "submit",
                current: self.draft.current_page.clone(),
            }));
        }
        let document = self.assemble()?;
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.store.insert(&document) {
                Ok(id) => {
                    info!(
                        draft = %self.draft.id,
                        submission = %id,
                        attempts = attempt,
                        items = document.items.len(),
                        "submission stored"
                    );
                    let receipt = SubmissionReceipt {
                        id,
                        submitted_at: document.submitted_at,
                        attempts: attempt,
                    };
                    self.draft = Draft::new(Page::Confirmation, self.clock.now());
                    return Ok(receipt);
                }
                Err(source) if attempt >= attempts => {
                    warn!(
                        draft = %self.draft.id,
                        attempts = attempt,
                        error = %source,
                        "submission failed; draft kept for retry"
                    );
                    return Err(PersistenceError {
                        attempts: attempt,
                        source,
                    }
                    .into());
                }
                Err(source) => {
                    warn!(
                        draft = %self.draft.id,
                        attempt,
                        error = %source,
                        "store rejected submission; retrying"
                    );
                    if !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Discards the draft and starts over on the first section.
    pub fn restart(&mut self) -> Page {
        info!(draft = %self.draft.id, "draft discarded");
        self.draft = Draft::new(first_page(&self.schema), self.clock.now());
        self.draft.current_page.clone()
    }

    fn apply(&mut self, page: &Page, data: SectionData) -> Result<(), IntakeError> {
        self.ensure_current(page)?;
        if self.draft.current_page == Page::Confirmation {
            return Err(self.state_error(StateError::Terminal));
        }

        let retained = {
            let Some(section) = self.section_for(page) else {
                return Err(self.state_error(StateError::NotEditable(page.clone())));
            };
            if let Err(err) = validate(section, &data) {
                warn!(
                    draft = %self.draft.id,
                    page = %page,
                    missing = ?err.missing_fields,
                    invalid = err.invalid_fields.len(),
                    "page rejected"
                );
                return Err(err.at(page.clone()).into());
            }
            data.into_iter()
                .filter(|(key, _)| section.field(key).is_some())
                .collect::<SectionData>()
        };

        let item_count = match page {
            Page::Section(id) if self.schema.governs_items(id) => {
                governing_count(&self.schema, &retained)
            }
            _ => None,
        };

        match page {
            Page::Section(id) => {
                self.draft.sections.insert(id.clone(), retained);
            }
            Page::Item(index) => {
                let slot = index
                    .checked_sub(1)
                    .and_then(|slot| self.draft.items.get_mut(slot));
                match slot {
                    Some(slot) => *slot = retained,
                    None => return Err(self.state_error(StateError::UnknownPage(page.clone()))),
                }
            }
            Page::Review | Page::Confirmation => {
                return Err(self.state_error(StateError::NotEditable(page.clone())))
            }
        }

        if let Some(target) = item_count {
            let (old, new) = resize_items(&mut self.draft.items, target);
            if old != new {
                info!(draft = %self.draft.id, old, new, "dynamic items resized");
            }
        }
        Ok(())
    }

    /// Aggregate check over every form page, then document assembly. The
    /// first fixed section is the contact block; the others form the request.
    fn assemble(&self) -> Result<SubmissionDocument, IntakeError> {
        let empty = SectionData::new();
        for page in self.sequence().form_pages() {
            let Some(section) = self.section_for(page) else {
                continue;
            };
            let data = self.draft.values_for(page).unwrap_or(&empty);
            if let Err(err) = validate(section, data) {
                warn!(
                    draft = %self.draft.id,
                    page = %page,
                    missing = ?err.missing_fields,
                    "submission blocked by incomplete page"
                );
                return Err(err.at(page.clone()).into());
            }
        }

        let mut sections = self.schema.sections.iter();
        let contact = sections
            .next()
            .and_then(|section| self.draft.section(&section.id))
            .cloned()
            .unwrap_or_default();
        let request = sections
            .map(|section| {
                let data = self.draft.section(&section.id).cloned().unwrap_or_default();
                (section.id.clone(), data)
            })
            .collect();

        Ok(SubmissionDocument {
            contact,
            request,
            items: self.draft.items.clone(),
            submitted_at: self.clock.now(),
        })
    }

    fn ensure_current(&self, page: &Page) -> Result<(), IntakeError> {
        if page != &self.draft.current_page {
            return Err(self.state_error(StateError::PageMismatch {
                current: self.draft.current_page.clone(),
                requested: page.clone(),
            }));
        }
        Ok(())
    }

    fn state_error(&self, err: StateError) -> IntakeError {
        error!(draft = %self.draft.id, error = %err, "invalid wizard transition");
        err.into()
    }
}

fn first_page(schema: &SurveySchema) -> Page {
    schema
        .first_section()
        .map(|section| Page::Section(section.id.clone()))
        .unwrap_or(Page::Review)
}
