//! Section validators: a pure function of the section schema and the values a
//! page submitted.

use chrono::NaiveDate;
use intake_domain::{FieldValue, SectionData};

use crate::error::{InvalidField, ValidationError};
use crate::schema::{FieldDescriptor, FieldKind, OtherOption, SectionSchema};

const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Checks `data` against `section`, collecting every violation.
///
/// Required fields must be present and non-empty. Present values must match
/// their field kind, fall inside declared ranges and pick declared options.
/// Choosing an escape value requires its companion text. Keys the schema
/// does not declare are ignored.
pub fn validate(section: &SectionSchema, data: &SectionData) -> Result<(), ValidationError> {
    let mut error = ValidationError::new(section.id.clone());

    for field in &section.fields {
        match data.get(field.key) {
            Some(value) if !value.is_empty() => {
                if let Err(reason) = check_value(field, value) {
                    error.invalid_fields.push(InvalidField::new(field.key, reason));
                    continue;
                }
                if let Some(other) = field.kind.other() {
                    if selects_other(other, value) && companion_missing(other, data) {
                        push_missing(&mut error, other.companion);
                    }
                }
            }
            _ if field.required => push_missing(&mut error, field.key),
            _ => {}
        }
    }

    if error.is_empty() {
        Ok(())
    } else {
        Err(error)
    }
}

fn push_missing(error: &mut ValidationError, key: &str) {
    if !error.missing_fields.iter().any(|existing| existing == key) {
        error.missing_fields.push(key.to_string());
    }
}

fn selects_other(other: &OtherOption, value: &FieldValue) -> bool {
    match value {
        FieldValue::Choice(choice) | FieldValue::Text(choice) => other.matches(choice),
        FieldValue::Choices(choices) => choices.iter().any(|choice| other.matches(choice)),
        _ => false,
    }
}

fn companion_missing(other: &OtherOption, data: &SectionData) -> bool {
    data.get(other.companion)
        .map(FieldValue::is_empty)
        .unwrap_or(true)
}

fn check_value(field: &FieldDescriptor, value: &FieldValue) -> Result<(), String> {
    match (&field.kind, value) {
        (FieldKind::Text, FieldValue::Text(_)) => Ok(()),
        (FieldKind::Boolean, FieldValue::Boolean(_)) => Ok(()),
        (FieldKind::Date, FieldValue::Date(_)) => Ok(()),
        (FieldKind::Date, FieldValue::Text(raw)) => {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "use YYYY-MM-DD format".to_string())
        }
        (FieldKind::Integer { min, max }, value) => match value.as_integer() {
            Some(number) => check_range(number, *min, *max),
            None => Err("enter a whole number".into()),
        },
        (FieldKind::Number { .. }, FieldValue::Number(number)) if !number.is_finite() => {
            Err("enter a finite number".into())
        }
        (FieldKind::Number { min, max }, FieldValue::Number(number)) => {
            check_range(*number, *min, *max)
        }
        (FieldKind::Number { min, max }, FieldValue::Integer(number)) => {
            check_range(*number as f64, *min, *max)
        }
        (FieldKind::Choice { options, .. }, FieldValue::Choice(choice))
        | (FieldKind::Choice { options, .. }, FieldValue::Text(choice)) => {
            check_option(options, choice)
        }
        (FieldKind::MultiChoice { options, .. }, FieldValue::Choices(choices)) => choices
            .iter()
            .filter(|choice| !choice.trim().is_empty())
            .try_for_each(|choice| check_option(options, choice)),
        (kind, _) => Err(format!("expected {}", describe(kind))),
    }
}

fn check_range<T>(value: T, min: Option<T>, max: Option<T>) -> Result<(), String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(min) = min {
        if value < min {
            return Err(format!("must be at least {min}"));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(format!("must be at most {max}"));
        }
    }
    Ok(())
}

fn check_option(options: &[&'static str], choice: &str) -> Result<(), String> {
    let candidate = choice.trim();
    if options
        .iter()
        .any(|option| option.eq_ignore_ascii_case(candidate))
    {
        return Ok(());
    }
    let mut reason = format!("`{candidate}` is not one of: {}", options.join(", "));
    if let Some(suggestion) = closest_option(options, candidate) {
        reason.push_str(&format!(" (did you mean `{suggestion}`?)"));
    }
    Err(reason)
}

fn closest_option(options: &[&'static str], candidate: &str) -> Option<&'static str> {
    let lowered = candidate.to_ascii_lowercase();
    options
        .iter()
        .map(|option| {
            let score = strsim::jaro_winkler(&option.to_ascii_lowercase(), &lowered);
            (*option, score)
        })
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(option, _)| option)
}

fn describe(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Integer { .. } => "a whole number",
        FieldKind::Number { .. } => "a number",
        FieldKind::Boolean => "yes or no",
        FieldKind::Date => "a date",
        FieldKind::Choice { .. } => "a single choice",
        FieldKind::MultiChoice { .. } => "a list of choices",
    }
}
