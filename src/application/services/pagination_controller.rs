//! Page loading orchestration over a catalog port.

use std::num::NonZeroU32;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::photo_catalog::PhotoCatalog;
use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FetchError;
use crate::domain::ports::CatalogPort;
use crate::domain::search::SearchQuery;

/// Records requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(size) => size,
    None => NonZeroU32::MIN,
};

/// Outcome of the most recent page-load attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A page fetch is in flight.
    Loading,
    /// The last fetch was applied.
    Loaded,
    /// The last fetch failed; catalog and page were left as they were.
    Failed,
}

/// Snapshot of the controller's request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequestState {
    /// Next page `load_next` will request.
    pub current_page: NonZeroU32,
    /// Whether a page fetch is in flight.
    pub is_loading: bool,
    /// Normalized search text applied by `current_view`.
    pub search_text: String,
    /// Outcome of the last attempt.
    pub load_state: LoadState,
}

/// Result of a `load_next` or `refresh` call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and applied.
    Loaded {
        /// Page that was fetched.
        page: NonZeroU32,
        /// Number of records it contributed.
        appended: usize,
    },
    /// Another load was already in flight; this call was dropped.
    Skipped,
}

#[derive(Debug, Clone, Copy)]
enum ApplyMode {
    Append,
    Replace,
}

#[derive(Debug)]
struct ControllerState {
    current_page: NonZeroU32,
    is_loading: bool,
    load_state: LoadState,
    query: SearchQuery,
    catalog: PhotoCatalog,
}

/// Drives paginated loading into a [`PhotoCatalog`].
///
/// At most one page fetch is in flight per controller; calls arriving while
/// one is running are dropped rather than queued. State is only touched in
/// short critical sections that never span an await.
pub struct PaginationController {
    catalog_port: Arc<dyn CatalogPort>,
    page_size: NonZeroU32,
    state: Mutex<ControllerState>,
}

impl std::fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Clears the loading flag if a load future is dropped before it finished.
struct LoadingGuard<'a> {
    state: &'a Mutex<ControllerState>,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            state.is_loading = false;
            state.load_state = LoadState::Idle;
            debug!("Page load abandoned before completion");
        }
    }
}

impl PaginationController {
    /// Creates a controller starting at page 1 with an empty catalog.
    #[must_use]
    pub fn new(catalog_port: Arc<dyn CatalogPort>, page_size: NonZeroU32) -> Self {
        Self {
            catalog_port,
            page_size,
            state: Mutex::new(ControllerState {
                current_page: NonZeroU32::MIN,
                is_loading: false,
                load_state: LoadState::Idle,
                query: SearchQuery::default(),
                catalog: PhotoCatalog::new(),
            }),
        }
    }

    /// Fetches the current page and appends it.
    ///
    /// # Errors
    /// Returns the fetch error; catalog and page are left untouched.
    pub async fn load_next(&self) -> Result<LoadOutcome, FetchError> {
        let Some(page) = self.begin_load(None) else {
            return Ok(LoadOutcome::Skipped);
        };
        self.run_load(page, ApplyMode::Append).await
    }

    /// Fetches page 1 and replaces the catalog with it.
    ///
    /// The old catalog stays visible until the new first page arrives, and
    /// survives if that fetch fails.
    ///
    /// # Errors
    /// Returns the fetch error; catalog and page are left untouched.
    pub async fn refresh(&self) -> Result<LoadOutcome, FetchError> {
        let Some(page) = self.begin_load(Some(NonZeroU32::MIN)) else {
            return Ok(LoadOutcome::Skipped);
        };
        self.run_load(page, ApplyMode::Replace).await
    }

    fn begin_load(&self, page: Option<NonZeroU32>) -> Option<NonZeroU32> {
        let mut state = self.state.lock();
        if state.is_loading {
            debug!(
                page = state.current_page.get(),
                "Page load already in flight, dropping request"
            );
            return None;
        }
        state.is_loading = true;
        state.load_state = LoadState::Loading;
        Some(page.unwrap_or(state.current_page))
    }

    async fn run_load(
        &self,
        page: NonZeroU32,
        mode: ApplyMode,
    ) -> Result<LoadOutcome, FetchError> {
        let mut guard = LoadingGuard {
            state: &self.state,
            armed: true,
        };

        debug!(
            page = page.get(),
            limit = self.page_size.get(),
            ?mode,
            "Fetching catalog page"
        );
        let result = self.catalog_port.fetch_page(page, self.page_size).await;

        guard.armed = false;
        let mut state = self.state.lock();
        state.is_loading = false;

        match result {
            Ok(records) => {
                let appended = records.len();
                match mode {
                    ApplyMode::Append => state.catalog.append(records),
                    ApplyMode::Replace => state.catalog.replace(records),
                }
                state.current_page = page.saturating_add(1);
                state.load_state = LoadState::Loaded;
                info!(
                    page = page.get(),
                    appended,
                    total = state.catalog.len(),
                    "Catalog page loaded"
                );
                Ok(LoadOutcome::Loaded { page, appended })
            }
            Err(e) => {
                state.load_state = LoadState::Failed;
                warn!(
                    page = page.get(),
                    error = %e,
                    transport_kind = ?e.transport_kind(),
                    "Catalog page load failed"
                );
                Err(e)
            }
        }
    }

    /// Stores the search text used by [`Self::current_view`].
    ///
    /// Returns the normalized query so the caller can echo it back.
    pub fn set_search_query(&self, text: &str) -> SearchQuery {
        let query = SearchQuery::normalize(text);
        self.state.lock().query = query.clone();
        query
    }

    /// Explicit search submission; same matching as live filtering.
    pub fn confirm_search(&self, text: &str) -> Vec<PhotoRecord> {
        let query = self.set_search_query(text);
        let results = self.current_view();
        if results.is_empty() {
            info!(query = %query, "No photos found matching query");
        }
        results
    }

    /// The catalog filtered by the current search text.
    #[must_use]
    pub fn current_view(&self) -> Vec<PhotoRecord> {
        let state = self.state.lock();
        state.catalog.filtered_by(&state.query)
    }

    /// Number of records loaded, ignoring the search text.
    #[must_use]
    pub fn catalog_len(&self) -> usize {
        self.state.lock().catalog.len()
    }

    /// Returns whether a page fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    /// Snapshot of the request state.
    #[must_use]
    pub fn state(&self) -> PageRequestState {
        let state = self.state.lock();
        PageRequestState {
            current_page: state.current_page,
            is_loading: state.is_loading,
            search_text: state.query.as_str().to_owned(),
            load_state: state.load_state,
        }
    }
}
