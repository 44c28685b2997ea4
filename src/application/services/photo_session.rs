//! Facade handed to the presentation layer.

use std::num::NonZeroU32;
use std::sync::Arc;

use super::image_cache::{ImageCache, ImageOutcome};
use super::pagination_controller::{LoadOutcome, PageRequestState, PaginationController};
use crate::domain::cancellation::CancellationToken;
use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FetchError;
use crate::domain::ports::CatalogPort;
use crate::domain::search::SearchQuery;

/// One browsing session: a paginated catalog plus the image cache its views share.
///
/// The cache is passed in rather than created here, so several sessions (or
/// other callers) can share one cache by cloning the handle.
#[derive(Debug)]
pub struct PhotoSession {
    controller: PaginationController,
    images: ImageCache,
}

impl PhotoSession {
    /// Creates a session loading `page_size` records per page from `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogPort>, images: ImageCache, page_size: NonZeroU32) -> Self {
        Self {
            controller: PaginationController::new(catalog, page_size),
            images,
        }
    }

    /// Loads the next page.
    ///
    /// # Errors
    /// Returns the fetch error; previously loaded photos stay.
    pub async fn load_next(&self) -> Result<LoadOutcome, FetchError> {
        self.controller.load_next().await
    }

    /// Reloads from the first page.
    ///
    /// # Errors
    /// Returns the fetch error; previously loaded photos stay.
    pub async fn refresh(&self) -> Result<LoadOutcome, FetchError> {
        self.controller.refresh().await
    }

    /// Updates the live search text.
    pub fn set_search_query(&self, text: &str) -> SearchQuery {
        self.controller.set_search_query(text)
    }

    /// Submits a search.
    pub fn confirm_search(&self, text: &str) -> Vec<PhotoRecord> {
        self.controller.confirm_search(text)
    }

    /// Photos matching the current search text.
    #[must_use]
    pub fn current_view(&self) -> Vec<PhotoRecord> {
        self.controller.current_view()
    }

    /// Snapshot of the pagination state.
    #[must_use]
    pub fn state(&self) -> PageRequestState {
        self.controller.state()
    }

    /// Resolves an image through the shared cache; `None` if cancelled.
    pub async fn resolve_image(
        &self,
        key: &str,
        token: &CancellationToken,
    ) -> Option<ImageOutcome> {
        self.images.resolve(key, token).await
    }

    /// Drops every cached image, e.g. on memory pressure.
    pub fn evict_images(&self) {
        self.images.evict_all();
    }

    /// The shared image cache.
    #[must_use]
    pub const fn images(&self) -> &ImageCache {
        &self.images
    }
}
