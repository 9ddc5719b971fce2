//! Drives a [`WizardController`] with any [`PageInteraction`].

use intake_core::{IntakeError, SubmissionReceipt, ValidationError, WizardController};
use intake_domain::Page;
use tracing::info;

use crate::cli::forms::{
    Notice, NoticeKind, PageAction, PageContext, PageInteraction, ReviewAction, ReviewContext,
};
use crate::cli::summary::{build_review, format_review_lines, page_title};
use crate::errors::CliError;

/// How a wizard session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one response was stored before the user stopped.
    Submitted(Vec<SubmissionReceipt>),
    /// The user quit without storing anything.
    Quit,
}

pub struct WizardRunner<I: PageInteraction> {
    controller: WizardController,
    interaction: I,
    receipts: Vec<SubmissionReceipt>,
}

impl<I: PageInteraction> WizardRunner<I> {
    pub fn new(controller: WizardController, interaction: I) -> Self {
        Self {
            controller,
            interaction,
            receipts: Vec::new(),
        }
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn interaction(&self) -> &I {
        &self.interaction
    }

    /// Loops until the user quits or declines another response after a
    /// confirmation. Validation and persistence failures are reported and
    /// the same page is shown again; anything else ends the session.
    pub fn run(&mut self) -> Result<RunOutcome, CliError> {
        loop {
            let page = self.controller.current_page().clone();
            let keep_going = match &page {
                Page::Section(_) | Page::Item(_) => self.form_step(&page)?,
                Page::Review => self.review_step()?,
                Page::Confirmation => self.confirmation_step()?,
            };
            if !keep_going {
                return Ok(self.outcome());
            }
        }
    }

    fn outcome(&mut self) -> RunOutcome {
        if self.receipts.is_empty() {
            RunOutcome::Quit
        } else {
            RunOutcome::Submitted(std::mem::take(&mut self.receipts))
        }
    }

    fn form_step(&mut self, page: &Page) -> Result<bool, CliError> {
        let action = {
            let Some(section) = self.controller.section_for(page) else {
                return Err(CliError::Usage(format!("{page} has no form")));
            };
            let (position, total) = self.controller.progress();
            let context = PageContext {
                page,
                title: page_title(section, page),
                section,
                values: self.controller.values_for(page),
                position,
                total,
                returns_to_review: self.controller.draft().return_target.is_some(),
            };
            self.interaction.present_page(&context)?
        };

        let result = match action {
            PageAction::Next(data) => self.controller.advance(page, data).map(|_| ()),
            PageAction::Update(data) => self
                .controller
                .save_without_advancing(page, data)
                .map(|_| {
                    self.interaction
                        .report(&Notice::new(NoticeKind::Info, "Answers saved."));
                }),
            PageAction::Back => self.controller.retreat(page).map(|_| ()),
            PageAction::Quit => return Ok(false),
        };
        self.absorb(result)?;
        Ok(true)
    }

    fn review_step(&mut self) -> Result<bool, CliError> {
        let context = {
            let sections = build_review(self.controller.schema(), self.controller.draft());
            ReviewContext {
                lines: format_review_lines(&sections),
                editable: sections
                    .into_iter()
                    .map(|section| (section.page, section.title))
                    .collect(),
            }
        };

        let result = match self.interaction.review(&context)? {
            ReviewAction::Submit => self.controller.submit().map(|receipt| {
                info!(submission = %receipt.id, "response submitted");
                self.receipts.push(receipt);
            }),
            ReviewAction::Edit(target) => self.controller.enter_edit(target).map(|_| ()),
            ReviewAction::Back => self.controller.retreat(&Page::Review).map(|_| ()),
            ReviewAction::Restart => {
                self.controller.restart();
                Ok(())
            }
            ReviewAction::Quit => return Ok(false),
        };
        self.absorb(result)?;
        Ok(true)
    }

    fn confirmation_step(&mut self) -> Result<bool, CliError> {
        let Some(receipt) = self.receipts.last() else {
            self.controller.restart();
            return Ok(true);
        };
        if self.interaction.confirmation(receipt)? {
            self.controller.restart();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Turns recoverable failures into notices; everything else propagates.
    fn absorb(&mut self, result: Result<(), IntakeError>) -> Result<(), CliError> {
        match result {
            Ok(()) => Ok(()),
            Err(IntakeError::Validation(err)) => {
                let notice = self.validation_notice(&err);
                self.interaction.report(&notice);
                Ok(())
            }
            Err(IntakeError::Persistence(err)) => {
                self.interaction.report(
                    &Notice::new(NoticeKind::Error, "Your request could not be saved.")
                        .with_details(vec![
                            err.to_string(),
                            "Your answers are kept; choose Submit to try again.".into(),
                        ]),
                );
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn validation_notice(&self, err: &ValidationError) -> Notice {
        let page = err
            .page
            .clone()
            .unwrap_or_else(|| Page::Section(err.section.clone()));
        let section = self.controller.section_for(&page);
        let label = |key: &str| {
            section
                .and_then(|section| section.field(key))
                .map(|field| field.label.to_string())
                .unwrap_or_else(|| key.to_string())
        };
        let title = section
            .map(|section| page_title(section, &page))
            .unwrap_or_else(|| page.to_string());

        let mut details: Vec<String> = err
            .missing_fields
            .iter()
            .map(|key| format!("{} is required", label(key)))
            .collect();
        details.extend(
            err.invalid_fields
                .iter()
                .map(|invalid| format!("{}: {}", label(&invalid.field), invalid.reason)),
        );
        Notice::new(NoticeKind::Warning, format!("Please complete {title}.")).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use intake_core::{
        lab_survey, InMemorySubmissionStore, StoreError, SubmissionStore, SubmitPolicy,
    };
    use intake_domain::{
        FieldValue, SectionData, StoredSubmission, SubmissionDocument, SubmissionId,
        SubmissionSummary,
    };

    #[derive(Default)]
    struct MockInteraction {
        pages: VecDeque<PageAction>,
        reviews: VecDeque<ReviewAction>,
        another: VecDeque<bool>,
        notices: Vec<Notice>,
        titles: Vec<String>,
        review_lines: Vec<Vec<String>>,
    }

    impl MockInteraction {
        fn new(pages: Vec<PageAction>, reviews: Vec<ReviewAction>) -> Self {
            Self {
                pages: pages.into(),
                reviews: reviews.into(),
                ..Self::default()
            }
        }
    }

    impl PageInteraction for MockInteraction {
        fn present_page(&mut self, context: &PageContext<'_>) -> Result<PageAction, CliError> {
            self.titles.push(context.title.clone());
            Ok(self.pages.pop_front().unwrap_or(PageAction::Quit))
        }

        fn review(&mut self, context: &ReviewContext) -> Result<ReviewAction, CliError> {
            self.review_lines.push(context.lines.clone());
            Ok(self.reviews.pop_front().unwrap_or(ReviewAction::Quit))
        }

        fn report(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }

        fn confirmation(&mut self, _receipt: &SubmissionReceipt) -> Result<bool, CliError> {
            Ok(self.another.pop_front().unwrap_or(false))
        }
    }

    struct BrokenStore;

    impl SubmissionStore for BrokenStore {
        fn insert(&self, _document: &SubmissionDocument) -> Result<SubmissionId, StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }

        fn load(&self, id: &SubmissionId) -> Result<StoredSubmission, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }

        fn list(&self) -> Result<Vec<SubmissionSummary>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn data(entries: &[(&str, FieldValue)]) -> SectionData {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn valid_pages() -> Vec<PageAction> {
        vec![
            PageAction::Next(data(&[
                ("name", FieldValue::text("Ada")),
                ("email", FieldValue::text("ada@example.edu")),
                ("organization", FieldValue::text("Analytical College")),
                ("org_type", FieldValue::choice("Corporate")),
            ])),
            PageAction::Next(data(&[
                ("course_name", FieldValue::text("Intro to Routing")),
                ("delivery_format", FieldValue::choice("Self-Paced")),
                ("lab_count", FieldValue::Integer(1)),
            ])),
            PageAction::Next(data(&[
                ("lab_name", FieldValue::text("Static Routes")),
                ("lab_type", FieldValue::choice("Self-Paced")),
                ("persistence", FieldValue::choice("Non-Persistent")),
                ("duration", FieldValue::choice("1 hour")),
                ("complexity", FieldValue::choice("Beginner")),
                ("developer", FieldValue::choice("ACI")),
                ("vm_count", FieldValue::Integer(2)),
            ])),
            PageAction::Next(data(&[
                ("total_systems", FieldValue::Integer(4)),
                ("cpu_per_system", FieldValue::choice("2")),
                ("ram_per_system", FieldValue::choice("4GB")),
                ("partitions", FieldValue::Integer(1)),
                ("partition_size", FieldValue::choice("40GB")),
                ("cd_rom", FieldValue::Boolean(false)),
                ("network_type", FieldValue::choice("Stand-Alone")),
                ("subnets", FieldValue::Integer(1)),
                ("internet_access", FieldValue::Boolean(false)),
            ])),
        ]
    }

    fn controller(store: Box<dyn SubmissionStore>) -> WizardController {
        WizardController::new(lab_survey(), store)
            .expect("survey")
            .with_policy(SubmitPolicy::new(2, Duration::ZERO))
    }

    #[test]
    fn runner_walks_to_confirmation() {
        let store = Arc::new(InMemorySubmissionStore::new());
        let interaction = MockInteraction::new(valid_pages(), vec![ReviewAction::Submit]);
        let mut runner = WizardRunner::new(controller(Box::new(Arc::clone(&store))), interaction);

        let outcome = runner.run().expect("run");

        match outcome {
            RunOutcome::Submitted(receipts) => assert_eq!(receipts.len(), 1),
            RunOutcome::Quit => panic!("expected a submission"),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(
            runner.interaction().titles,
            vec![
                "Contact Information",
                "Course Details",
                "Lab Request Details #1",
                "Hardware Requirements",
            ]
        );
    }

    #[test]
    fn invalid_page_is_reported_and_repeated() {
        let mut pages = vec![PageAction::Next(SectionData::new())];
        pages.extend(valid_pages());
        let interaction = MockInteraction::new(pages, vec![ReviewAction::Quit]);
        let mut runner =
            WizardRunner::new(controller(Box::new(InMemorySubmissionStore::new())), interaction);

        assert_eq!(runner.run().expect("run"), RunOutcome::Quit);

        let notices = &runner.interaction().notices;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Warning);
        assert_eq!(notices[0].headline, "Please complete Contact Information.");
        assert!(notices[0]
            .details
            .contains(&"Email Address is required".to_string()));
        assert_eq!(runner.interaction().titles[0], runner.interaction().titles[1]);
    }

    #[test]
    fn store_failure_keeps_the_review_open() {
        let interaction = MockInteraction::new(
            valid_pages(),
            vec![ReviewAction::Submit, ReviewAction::Quit],
        );
        let mut runner = WizardRunner::new(controller(Box::new(BrokenStore)), interaction);

        assert_eq!(runner.run().expect("run"), RunOutcome::Quit);

        let interaction = runner.interaction();
        assert_eq!(interaction.review_lines.len(), 2);
        assert_eq!(interaction.notices.len(), 1);
        assert_eq!(interaction.notices[0].kind, NoticeKind::Error);
        assert_eq!(runner.controller().current_page(), &Page::Review);
    }

    #[test]
    fn edit_from_review_comes_back_to_review() {
        let mut pages = valid_pages();
        pages.push(PageAction::Next(data(&[
            ("name", FieldValue::text("Ada King")),
            ("email", FieldValue::text("ada@example.edu")),
            ("organization", FieldValue::text("Analytical College")),
            ("org_type", FieldValue::choice("Corporate")),
        ])));
        let interaction = MockInteraction::new(
            pages,
            vec![
                ReviewAction::Edit(Page::section("contact")),
                ReviewAction::Quit,
            ],
        );
        let mut runner =
            WizardRunner::new(controller(Box::new(InMemorySubmissionStore::new())), interaction);

        runner.run().expect("run");

        let reviews = &runner.interaction().review_lines;
        assert_eq!(reviews.len(), 2);
        assert!(reviews[1].contains(&"  Full Name: Ada King".to_string()));
    }
}
