//! Application layer with the catalog, pagination and image cache services.

/// Service implementations.
pub mod services;

pub use services::{
    CacheStats, DEFAULT_PAGE_SIZE, EntryState, ImageCache, ImageCacheConfig, ImageLoadedEvent,
    ImageOutcome, LoadOutcome, LoadState, PageRequestState, PaginationController, PhotoCatalog,
    PhotoSession,
};
