//! Review screen rendering.

use intake_core::{PageSequence, SectionSchema, SurveySchema};
use intake_domain::{Draft, Page};

pub const UNFILLED: &str = "[unfilled]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSection {
    pub page: Page,
    pub title: String,
    pub entries: Vec<(String, String)>,
}

/// Title shown for a form page; item pages carry their number.
pub fn page_title(section: &SectionSchema, page: &Page) -> String {
    match page {
        Page::Item(index) => format!("{} #{index}", section.title),
        _ => section.title.to_string(),
    }
}

/// Every form page in sequence order with `label: value` entries. Companion
/// fields appear only when they hold text.
pub fn build_review(schema: &SurveySchema, draft: &Draft) -> Vec<ReviewSection> {
    let item_count = draft.items.len();
    PageSequence::new(schema, item_count)
        .form_pages()
        .filter_map(|page| {
            let section = schema.form_section(page, item_count)?;
            let values = draft.values_for(page);
            let companions: Vec<&str> = section
                .fields
                .iter()
                .filter_map(|field| field.kind.other().map(|other| other.companion))
                .collect();
            let entries = section
                .fields
                .iter()
                .filter_map(|field| {
                    let value = values
                        .and_then(|values| values.get(field.key))
                        .filter(|value| !value.is_empty());
                    match value {
                        Some(value) => Some((field.label.to_string(), value.to_string())),
                        None if companions.contains(&field.key) => None,
                        None => Some((field.label.to_string(), UNFILLED.to_string())),
                    }
                })
                .collect();
            Some(ReviewSection {
                page: page.clone(),
                title: page_title(section, page),
                entries,
            })
        })
        .collect()
}

pub fn format_review_lines(sections: &[ReviewSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.push(section.title.clone());
        for (label, value) in &section.entries {
            lines.push(format!("  {label}: {value}"));
        }
    }
    lines
}
