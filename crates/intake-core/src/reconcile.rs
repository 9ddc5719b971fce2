//! Keeps the dynamic item list in step with its governing answer.

use intake_domain::SectionData;

use crate::schema::SurveySchema;

/// Item count encoded in freshly validated data for the governing section.
///
/// Returns `None` when the schema has no dynamic items or `data` does not
/// carry a usable governing value; the caller then leaves the list alone.
pub fn governing_count(schema: &SurveySchema, data: &SectionData) -> Option<usize> {
    let dynamic = schema.dynamic.as_ref()?;
    let value = data.get(dynamic.field)?.as_integer()?;
    usize::try_from(value).ok()
}

/// Pads with empty records or drops trailing records so that exactly
/// `target` remain. Records below `min(old, target)` are never touched, and
/// repeating the same target is a no-op. Returns `(old, new)` lengths.
pub fn resize_items(items: &mut Vec<SectionData>, target: usize) -> (usize, usize) {
    let old = items.len();
    if target > old {
        items.resize_with(target, SectionData::new);
    } else {
        items.truncate(target);
    }
    (old, items.len())
}
