use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SectionId;

/// Position of the wizard. Dynamic items are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Page {
    Section(SectionId),
    Item(usize),
    Review,
    Confirmation,
}

impl Page {
    pub fn section(id: impl Into<SectionId>) -> Self {
        Page::Section(id.into())
    }

    /// Pages that capture field values (and can therefore be edited).
    pub fn is_form(&self) -> bool {
        matches!(self, Page::Section(_) | Page::Item(_))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Section(id) => write!(f, "section `{id}`"),
            Page::Item(index) => write!(f, "item {index}"),
            Page::Review => f.write_str("review"),
            Page::Confirmation => f.write_str("confirmation"),
        }
    }
}
