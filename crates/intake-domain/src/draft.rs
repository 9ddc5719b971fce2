use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Page, SectionData, SectionId};

/// In-progress submission for one wizard session.
///
/// Only the controller mutates a draft; everything else reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub sections: BTreeMap<SectionId, SectionData>,
    pub items: Vec<SectionData>,
    pub current_page: Page,
    pub return_target: Option<Page>,
}

impl Draft {
    pub fn new(first_page: Page, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            sections: BTreeMap::new(),
            items: Vec::new(),
            current_page: first_page,
            return_target: None,
        }
    }

    pub fn section(&self, id: &SectionId) -> Option<&SectionData> {
        self.sections.get(id)
    }

    /// Item data by 1-based index.
    pub fn item(&self, index: usize) -> Option<&SectionData> {
        index.checked_sub(1).and_then(|slot| self.items.get(slot))
    }

    /// Values stored for a form page, if that page has been saved before.
    pub fn values_for(&self, page: &Page) -> Option<&SectionData> {
        match page {
            Page::Section(id) => self.section(id),
            Page::Item(index) => self.item(*index),
            Page::Review | Page::Confirmation => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.items.is_empty()
    }
}
