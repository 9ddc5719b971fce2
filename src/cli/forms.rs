//! Presentation side of the wizard: what a page shows, what the user can do
//! on it, and the dialoguer implementation used by the binary.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use intake_core::{FieldDescriptor, FieldKind, SectionSchema, SubmissionReceipt};
use intake_domain::{FieldValue, Page, SectionData};

use crate::cli::{io, output};
use crate::errors::CliError;

/// Everything needed to render one form page.
pub struct PageContext<'a> {
    pub page: &'a Page,
    pub title: String,
    pub section: &'a SectionSchema,
    /// Previously saved values, used to pre-fill prompts.
    pub values: Option<&'a SectionData>,
    pub position: usize,
    pub total: usize,
    /// The next forward move goes back to review.
    pub returns_to_review: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    Next(SectionData),
    Update(SectionData),
    Back,
    Quit,
}

pub struct ReviewContext {
    pub lines: Vec<String>,
    /// Pages the user may jump to, with their titles.
    pub editable: Vec<(Page, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    Submit,
    Edit(Page),
    Back,
    Restart,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Inline feedback shown between prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub headline: String,
    pub details: Vec<String>,
}

impl Notice {
    pub fn new(kind: NoticeKind, headline: impl Into<String>) -> Self {
        Self {
            kind,
            headline: headline.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Interaction surface driven by [`WizardRunner`](crate::cli::runner::WizardRunner).
pub trait PageInteraction {
    fn present_page(&mut self, context: &PageContext<'_>) -> Result<PageAction, CliError>;

    fn review(&mut self, context: &ReviewContext) -> Result<ReviewAction, CliError>;

    fn report(&mut self, notice: &Notice);

    /// Returns `true` to start another response.
    fn confirmation(&mut self, receipt: &SubmissionReceipt) -> Result<bool, CliError>;
}

/// Converts typed text into the value a field expects. Text that does not
/// parse is passed through so the validator can explain the problem.
pub fn parse_input(kind: &FieldKind, raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = match kind {
        FieldKind::Integer { .. } => trimmed
            .parse::<i64>()
            .map(FieldValue::Integer)
            .unwrap_or_else(|_| FieldValue::text(trimmed)),
        FieldKind::Number { .. } => trimmed
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(FieldValue::Number)
            .unwrap_or_else(|| FieldValue::text(trimmed)),
        FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => FieldValue::Boolean(true),
            "n" | "no" | "false" | "0" => FieldValue::Boolean(false),
            _ => FieldValue::text(trimmed),
        },
        FieldKind::Choice { .. } => FieldValue::choice(trimmed),
        FieldKind::MultiChoice { .. } => FieldValue::choices(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|choice| !choice.is_empty()),
        ),
        FieldKind::Text | FieldKind::Date => FieldValue::text(trimmed),
    };
    Some(value)
}

/// Companion text fields are only asked for when their parent field picked
/// the escape value.
pub fn companion_wanted(
    section: &SectionSchema,
    field: &FieldDescriptor,
    data: &SectionData,
) -> bool {
    let parent = section.fields.iter().find_map(|candidate| {
        candidate
            .kind
            .other()
            .filter(|other| other.companion == field.key)
            .map(|other| (candidate.key, other))
    });
    let Some((parent_key, other)) = parent else {
        return true;
    };
    match data.get(parent_key) {
        Some(FieldValue::Choice(choice)) | Some(FieldValue::Text(choice)) => other.matches(choice),
        Some(FieldValue::Choices(choices)) => choices.iter().any(|choice| other.matches(choice)),
        _ => false,
    }
}

const PAGE_ACTIONS: [&str; 4] = ["Next", "Save and stay", "Back", "Quit"];
const REVIEW_ACTIONS: [&str; 5] = ["Submit", "Edit a page", "Back", "Start over", "Quit"];

/// Terminal implementation backed by dialoguer widgets.
pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self { theme: io::theme() }
    }

    fn prompt_field(
        &self,
        field: &FieldDescriptor,
        current: Option<&FieldValue>,
    ) -> Result<Option<FieldValue>, CliError> {
        if let Some(help) = field.help {
            output::detail(help);
        }
        let label = if field.required {
            field.label.to_string()
        } else {
            format!("{} (optional)", field.label)
        };
        match &field.kind {
            FieldKind::Boolean => {
                let default = matches!(current, Some(FieldValue::Boolean(true)));
                let answer = Confirm::with_theme(&self.theme)
                    .with_prompt(label)
                    .default(default)
                    .interact()?;
                Ok(Some(FieldValue::Boolean(answer)))
            }
            FieldKind::Choice { options, .. } => {
                let default = current
                    .and_then(FieldValue::as_str)
                    .and_then(|value| {
                        options
                            .iter()
                            .position(|option| option.eq_ignore_ascii_case(value))
                    })
                    .unwrap_or(0);
                let index = Select::with_theme(&self.theme)
                    .with_prompt(label)
                    .items(options)
                    .default(default)
                    .interact()?;
                Ok(options.get(index).map(|option| FieldValue::choice(*option)))
            }
            FieldKind::MultiChoice { options, .. } => {
                let selected: Vec<&str> = match current {
                    Some(FieldValue::Choices(values)) => {
                        values.iter().map(String::as_str).collect()
                    }
                    _ => Vec::new(),
                };
                let defaults: Vec<bool> = options
                    .iter()
                    .map(|option| selected.iter().any(|value| option.eq_ignore_ascii_case(value)))
                    .collect();
                let picked = MultiSelect::with_theme(&self.theme)
                    .with_prompt(format!("{label} (space to toggle)"))
                    .items(options)
                    .defaults(&defaults)
                    .interact()?;
                let choices: Vec<&str> = picked
                    .iter()
                    .filter_map(|index| options.get(*index).copied())
                    .collect();
                Ok((!choices.is_empty()).then(|| FieldValue::choices(choices)))
            }
            kind => {
                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(label)
                    .allow_empty(true);
                if let Some(value) = current {
                    input = input.with_initial_text(value.to_string());
                }
                let raw = input.interact_text()?;
                Ok(parse_input(kind, &raw))
            }
        }
    }
}

impl PageInteraction for DialoguerInteraction {
    fn present_page(&mut self, context: &PageContext<'_>) -> Result<PageAction, CliError> {
        output::section(format!(
            "{} ({}/{})",
            context.title, context.position, context.total
        ));

        let mut data = SectionData::new();
        for field in &context.section.fields {
            if !companion_wanted(context.section, field, &data) {
                continue;
            }
            let current = context.values.and_then(|values| values.get(field.key));
            if let Some(value) = self.prompt_field(field, current)? {
                data.insert(field.key.to_string(), value);
            }
        }

        let mut actions = PAGE_ACTIONS.to_vec();
        if context.returns_to_review {
            actions[0] = "Save and return to review";
        }
        let choice = Select::with_theme(&self.theme)
            .with_prompt("What next?")
            .items(&actions)
            .default(0)
            .interact()?;
        Ok(match choice {
            0 => PageAction::Next(data),
            1 => PageAction::Update(data),
            2 => PageAction::Back,
            _ => PageAction::Quit,
        })
    }

    fn review(&mut self, context: &ReviewContext) -> Result<ReviewAction, CliError> {
        output::section("Review your request");
        for line in &context.lines {
            println!("{line}");
        }
        println!();

        let choice = Select::with_theme(&self.theme)
            .with_prompt("Ready to submit?")
            .items(&REVIEW_ACTIONS)
            .default(0)
            .interact()?;
        match choice {
            0 => Ok(ReviewAction::Submit),
            1 => {
                let titles: Vec<&str> = context
                    .editable
                    .iter()
                    .map(|(_, title)| title.as_str())
                    .collect();
                let picked = Select::with_theme(&self.theme)
                    .with_prompt("Which page?")
                    .items(&titles)
                    .default(0)
                    .interact_opt()?;
                Ok(match picked.and_then(|index| context.editable.get(index)) {
                    Some((page, _)) => ReviewAction::Edit(page.clone()),
                    None => ReviewAction::Back,
                })
            }
            2 => Ok(ReviewAction::Back),
            3 => {
                let confirmed = Confirm::with_theme(&self.theme)
                    .with_prompt("Discard every answer and start over?")
                    .default(false)
                    .interact()?;
                Ok(if confirmed {
                    ReviewAction::Restart
                } else {
                    ReviewAction::Back
                })
            }
            _ => Ok(ReviewAction::Quit),
        }
    }

    fn report(&mut self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Info => io::print_info(&notice.headline),
            NoticeKind::Success => io::print_success(&notice.headline),
            NoticeKind::Warning => io::print_warning(&notice.headline),
            NoticeKind::Error => io::print_error(&notice.headline),
        }
        for detail in &notice.details {
            output::detail(detail);
        }
    }

    fn confirmation(&mut self, receipt: &SubmissionReceipt) -> Result<bool, CliError> {
        output::section("Thank you");
        io::print_success(format!(
            "Request {} received at {}.",
            receipt.id,
            receipt.submitted_at.format("%Y-%m-%d %H:%M UTC")
        ));
        Confirm::with_theme(&self.theme)
            .with_prompt("Start another response?")
            .default(false)
            .interact()
            .map_err(CliError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::lab_survey;
    use intake_domain::SectionId;

    #[test]
    fn integers_parse_and_garbage_passes_through() {
        let kind = FieldKind::integer(Some(1), None);
        assert_eq!(parse_input(&kind, " 12 "), Some(FieldValue::Integer(12)));
        assert_eq!(parse_input(&kind, "twelve"), Some(FieldValue::text("twelve")));
        assert_eq!(parse_input(&kind, "   "), None);
    }

    #[test]
    fn non_finite_numbers_pass_through_as_text() {
        let kind = FieldKind::Number {
            min: Some(0.0),
            max: None,
        };
        assert_eq!(parse_input(&kind, "2.5"), Some(FieldValue::Number(2.5)));
        assert_eq!(parse_input(&kind, "NaN"), Some(FieldValue::text("NaN")));
        assert_eq!(parse_input(&kind, "inf"), Some(FieldValue::text("inf")));
    }

    #[test]
    fn multi_choice_input_splits_on_commas() {
        let kind = FieldKind::multi_choice(&["GNS3", "Docker"]);
        assert_eq!(
            parse_input(&kind, "GNS3, Docker,"),
            Some(FieldValue::choices(["GNS3", "Docker"]))
        );
    }

    #[test]
    fn companion_prompt_follows_the_escape_value() {
        let survey = lab_survey();
        let contact = survey.section(&SectionId::from("contact")).unwrap();
        let companion = contact.field("org_type_other").unwrap();
        let name = contact.field("name").unwrap();

        let mut data = SectionData::new();
        data.insert("org_type".into(), FieldValue::choice("Corporate"));
        assert!(!companion_wanted(contact, companion, &data));
        assert!(companion_wanted(contact, name, &data));

        data.insert("org_type".into(), FieldValue::choice("Other"));
        assert!(companion_wanted(contact, companion, &data));
    }
}
