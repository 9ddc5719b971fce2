//! Ordered page sequence for a schema and a dynamic item count.

use intake_domain::Page;

use crate::schema::SurveySchema;

/// Pages in presentation order: fixed sections, dynamic items right after
/// their anchor section, then review. Confirmation is never part of the
/// sequence; only a successful submission reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSequence {
    pages: Vec<Page>,
}

impl PageSequence {
    pub fn new(schema: &SurveySchema, item_count: usize) -> Self {
        let mut pages = Vec::with_capacity(schema.sections.len() + item_count + 1);
        for section in &schema.sections {
            pages.push(Page::Section(section.id.clone()));
            if let Some(dynamic) = &schema.dynamic {
                if dynamic.after == section.id {
                    pages.extend((1..=item_count).map(Page::Item));
                }
            }
        }
        pages.push(Page::Review);
        Self { pages }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn first(&self) -> Option<&Page> {
        self.pages.first()
    }

    pub fn contains(&self, page: &Page) -> bool {
        self.pages.contains(page)
    }

    /// 1-based position, used for progress display.
    pub fn position(&self, page: &Page) -> Option<usize> {
        self.pages
            .iter()
            .position(|candidate| candidate == page)
            .map(|index| index + 1)
    }

    pub fn next(&self, page: &Page) -> Option<&Page> {
        let index = self.pages.iter().position(|candidate| candidate == page)?;
        self.pages.get(index + 1)
    }

    pub fn previous(&self, page: &Page) -> Option<&Page> {
        let index = self.pages.iter().position(|candidate| candidate == page)?;
        index.checked_sub(1).and_then(|prev| self.pages.get(prev))
    }

    /// Form pages only, in order. Used by the aggregate check at submission.
    pub fn form_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|page| page.is_form())
    }
}
