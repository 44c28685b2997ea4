use crate::domain::entities::PhotoRecord;
use crate::domain::search::SearchQuery;

/// Photos accumulated across every page loaded so far, in arrival order.
///
/// Duplicate ids are kept: the upstream API may repeat a photo across pages
/// and the catalog mirrors what it was given.
#[derive(Debug, Clone, Default)]
pub struct PhotoCatalog {
    records: Vec<PhotoRecord>,
}

impl PhotoCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Removes every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Adds a page to the end, keeping its order and everything before it untouched.
    pub fn append(&mut self, page: impl IntoIterator<Item = PhotoRecord>) {
        self.records.extend(page);
    }

    /// Swaps the whole catalog for `page`.
    pub fn replace(&mut self, page: Vec<PhotoRecord>) {
        self.records = page;
    }

    /// Records matching `query` after normalization, in catalog order.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Vec<PhotoRecord> {
        self.filtered_by(&SearchQuery::normalize(query))
    }

    /// Records matching an already normalized query, in catalog order.
    #[must_use]
    pub fn filtered_by(&self, query: &SearchQuery) -> Vec<PhotoRecord> {
        if query.is_empty() {
            return self.records.clone();
        }
        self.records
            .iter()
            .filter(|photo| query.matches(photo))
            .cloned()
            .collect()
    }

    /// Every record in arrival order.
    #[must_use]
    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
