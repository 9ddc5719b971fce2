//! Declarative description of the survey: sections, their fields, and the
//! repeated item page whose count is governed by an earlier answer.

use std::collections::HashSet;

use intake_domain::{Page, SectionId};

use crate::error::SchemaError;

/// Escape value of a choice field that requires a companion free-text answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherOption {
    pub value: &'static str,
    pub companion: &'static str,
}

impl OtherOption {
    pub fn new(value: &'static str, companion: &'static str) -> Self {
        Self { value, companion }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        candidate.trim().eq_ignore_ascii_case(self.value)
    }
}

/// Supported data kinds for survey fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    Date,
    Choice {
        options: Vec<&'static str>,
        other: Option<OtherOption>,
    },
    MultiChoice {
        options: Vec<&'static str>,
        other: Option<OtherOption>,
    },
}

impl FieldKind {
    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        FieldKind::Integer { min, max }
    }

    pub fn choice(options: &[&'static str]) -> Self {
        FieldKind::Choice {
            options: options.to_vec(),
            other: None,
        }
    }

    pub fn multi_choice(options: &[&'static str]) -> Self {
        FieldKind::MultiChoice {
            options: options.to_vec(),
            other: None,
        }
    }

    /// Attaches an escape value to a choice kind. Other kinds are returned
    /// unchanged.
    pub fn with_other(self, value: &'static str, companion: &'static str) -> Self {
        let other = Some(OtherOption::new(value, companion));
        match self {
            FieldKind::Choice { options, .. } => FieldKind::Choice { options, other },
            FieldKind::MultiChoice { options, .. } => FieldKind::MultiChoice { options, other },
            kind => kind,
        }
    }

    pub fn options(&self) -> Option<&[&'static str]> {
        match self {
            FieldKind::Choice { options, .. } | FieldKind::MultiChoice { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    pub fn other(&self) -> Option<&OtherOption> {
        match self {
            FieldKind::Choice { other, .. } | FieldKind::MultiChoice { other, .. } => {
                other.as_ref()
            }
            _ => None,
        }
    }
}

/// Declarative description of a single survey field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            help: None,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// Fields presented together on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSchema {
    pub id: SectionId,
    pub title: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl SectionSchema {
    pub fn new(id: &str, title: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id: SectionId::from(id),
            title,
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    fn check(&self) -> Result<(), SchemaError> {
        let section = self.id.to_string();
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key) {
                return Err(SchemaError::DuplicateField {
                    section,
                    field: field.key.to_string(),
                });
            }
        }

        for field in &self.fields {
            let invalid = |reason: String| SchemaError::InvalidField {
                section: section.clone(),
                field: field.key.to_string(),
                reason,
            };
            match &field.kind {
                FieldKind::Integer {
                    min: Some(min),
                    max: Some(max),
                } if min > max => return Err(invalid(format!("min {min} exceeds max {max}"))),
                FieldKind::Number {
                    min: Some(min),
                    max: Some(max),
                } if min > max => return Err(invalid(format!("min {min} exceeds max {max}"))),
                FieldKind::Choice { options, other }
                | FieldKind::MultiChoice { options, other } => {
                    if options.is_empty() {
                        return Err(invalid("choice field declares no options".into()));
                    }
                    if let Some(other) = other {
                        if !options.iter().any(|option| other.matches(option)) {
                            return Err(invalid(format!(
                                "escape value `{}` is not one of the options",
                                other.value
                            )));
                        }
                        match self.field(other.companion) {
                            Some(companion) if companion.kind == FieldKind::Text => {}
                            Some(_) => {
                                return Err(invalid(format!(
                                    "companion `{}` must be a text field",
                                    other.companion
                                )))
                            }
                            None => {
                                return Err(invalid(format!(
                                    "companion `{}` is not declared",
                                    other.companion
                                )))
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Repeated item pages whose count follows an integer answer.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicItems {
    /// Section holding the governing field.
    pub section: SectionId,
    /// Integer field whose value is the item count.
    pub field: &'static str,
    /// Item pages are inserted right after this section.
    pub after: SectionId,
    pub template: SectionSchema,
}

/// Complete survey definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveySchema {
    pub name: &'static str,
    pub sections: Vec<SectionSchema>,
    pub dynamic: Option<DynamicItems>,
}

impl SurveySchema {
    pub fn section(&self, id: &SectionId) -> Option<&SectionSchema> {
        self.sections.iter().find(|section| &section.id == id)
    }

    pub fn first_section(&self) -> Option<&SectionSchema> {
        self.sections.first()
    }

    /// Schema of a form page when the draft holds `item_count` items.
    pub fn form_section(&self, page: &Page, item_count: usize) -> Option<&SectionSchema> {
        match page {
            Page::Section(id) => self.section(id),
            Page::Item(index) if (1..=item_count).contains(index) => {
                self.dynamic.as_ref().map(|dynamic| &dynamic.template)
            }
            _ => None,
        }
    }

    /// True when saving `id` can change the dynamic item count.
    pub fn governs_items(&self, id: &SectionId) -> bool {
        self.dynamic
            .as_ref()
            .map(|dynamic| &dynamic.section == id)
            .unwrap_or(false)
    }

    /// Rejects configuration defects so validators never see a malformed
    /// schema at runtime.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.sections.is_empty() {
            return Err(SchemaError::NoSections(self.name.to_string()));
        }
        let mut ids = HashSet::new();
        for section in &self.sections {
            if !ids.insert(&section.id) {
                return Err(SchemaError::DuplicateSection(section.id.to_string()));
            }
            section.check()?;
        }

        if let Some(dynamic) = &self.dynamic {
            if ids.contains(&dynamic.template.id) {
                return Err(SchemaError::InvalidDynamic(format!(
                    "item template `{}` reuses a section id",
                    dynamic.template.id
                )));
            }
            dynamic.template.check()?;
            if self.section(&dynamic.after).is_none() {
                return Err(SchemaError::InvalidDynamic(format!(
                    "items are placed after unknown section `{}`",
                    dynamic.after
                )));
            }
            let governing = self
                .section(&dynamic.section)
                .and_then(|section| section.field(dynamic.field))
                .ok_or_else(|| {
                    SchemaError::InvalidDynamic(format!(
                        "governing field `{}.{}` is not declared",
                        dynamic.section, dynamic.field
                    ))
                })?;
            match governing.kind {
                FieldKind::Integer { min, .. } if governing.required => {
                    if min.map(|value| value < 0).unwrap_or(true) {
                        return Err(SchemaError::InvalidDynamic(format!(
                            "governing field `{}` needs a non-negative minimum",
                            dynamic.field
                        )));
                    }
                }
                _ => {
                    return Err(SchemaError::InvalidDynamic(format!(
                        "governing field `{}` must be a required integer",
                        dynamic.field
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> SectionSchema {
        SectionSchema::new(
            "contact",
            "Contact",
            vec![
                FieldDescriptor::new("name", "Name", FieldKind::Text),
                FieldDescriptor::new(
                    "org_type",
                    "Organization type",
                    FieldKind::choice(&["Corporate", "Other"]).with_other("Other", "org_other"),
                ),
                FieldDescriptor::new("org_other", "Other type", FieldKind::Text).with_optional(),
            ],
        )
    }

    #[test]
    fn well_formed_schema_passes() {
        let schema = SurveySchema {
            name: "test",
            sections: vec![contact()],
            dynamic: None,
        };
        assert_eq!(schema.check(), Ok(()));
    }

    #[test]
    fn companion_must_be_declared() {
        let mut section = contact();
        section.fields.pop();
        let schema = SurveySchema {
            name: "test",
            sections: vec![section],
            dynamic: None,
        };
        assert!(matches!(
            schema.check(),
            Err(SchemaError::InvalidField { field, .. }) if field == "org_type"
        ));
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let schema = SurveySchema {
            name: "test",
            sections: vec![contact(), contact()],
            dynamic: None,
        };
        assert_eq!(
            schema.check(),
            Err(SchemaError::DuplicateSection("contact".into()))
        );
    }

    #[test]
    fn governing_field_must_be_integer() {
        let schema = SurveySchema {
            name: "test",
            sections: vec![contact()],
            dynamic: Some(DynamicItems {
                section: SectionId::from("contact"),
                field: "name",
                after: SectionId::from("contact"),
                template: SectionSchema::new(
                    "item",
                    "Item",
                    vec![FieldDescriptor::new("label", "Label", FieldKind::Text)],
                ),
            }),
        };
        assert!(matches!(schema.check(), Err(SchemaError::InvalidDynamic(_))));
    }

    #[test]
    fn form_section_resolves_sections_and_existing_items() {
        let template = SectionSchema::new(
            "item",
            "Item",
            vec![FieldDescriptor::new("label", "Label", FieldKind::Text)],
        );
        let schema = SurveySchema {
            name: "test",
            sections: vec![contact()],
            dynamic: Some(DynamicItems {
                section: SectionId::from("contact"),
                field: "name",
                after: SectionId::from("contact"),
                template: template.clone(),
            }),
        };

        let contact_page = Page::Section(SectionId::from("contact"));
        assert_eq!(
            schema.form_section(&contact_page, 0).map(|section| section.title),
            Some("Contact")
        );
        assert_eq!(schema.form_section(&Page::Item(2), 2), Some(&template));
        assert_eq!(schema.form_section(&Page::Item(3), 2), None);
        assert_eq!(schema.form_section(&Page::Item(0), 2), None);
        assert_eq!(schema.form_section(&Page::Review, 2), None);
    }
}
