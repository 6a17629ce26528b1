//! Page-local catalog view state: current course page plus the batch
//! selection set.

use std::collections::BTreeSet;

use fretwire_model::CourseId;

use crate::api::types::CourseListPage;

/// Mutable view state owned by one consumer. Selection is mutated only
/// by explicit calls and cleared whenever the visible page changes, so
/// it can never refer to rows that are no longer on screen.
#[derive(Debug, Default)]
pub struct CatalogState {
    page: Option<CourseListPage>,
    selection: BTreeSet<CourseId>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Option<&CourseListPage> {
        self.page.as_ref()
    }

    /// Install a freshly fetched page. Moving to a different page number
    /// clears the selection; refreshing the same page drops selected IDs
    /// that no longer appear in it.
    pub fn set_page(&mut self, page: CourseListPage) {
        let page_changed = self
            .page
            .as_ref()
            .is_some_and(|current| current.page != page.page);
        if page_changed {
            self.selection.clear();
        } else {
            self.selection
                .retain(|id| page.items.iter().any(|c| c.id == *id));
        }
        self.page = Some(page);
    }

    /// Toggle a row's selection. Returns whether the row is selected
    /// afterwards; rows not on the current page are ignored.
    pub fn toggle(&mut self, id: CourseId) -> bool {
        let on_page = self
            .page
            .as_ref()
            .is_some_and(|p| p.items.iter().any(|c| c.id == id));
        if !on_page {
            return false;
        }
        if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        }
    }

    pub fn select_all_on_page(&mut self) {
        if let Some(page) = &self.page {
            self.selection.extend(page.items.iter().map(|c| c.id));
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &BTreeSet<CourseId> {
        &self.selection
    }
}
