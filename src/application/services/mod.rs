//! Catalog, pagination and image cache services.

pub mod image_cache;
pub mod pagination_controller;
pub mod photo_catalog;
pub mod photo_session;

pub use image_cache::{
    CacheStats, EntryState, ImageCache, ImageCacheConfig, ImageLoadedEvent, ImageOutcome,
};
pub use pagination_controller::{
    DEFAULT_PAGE_SIZE, LoadOutcome, LoadState, PageRequestState, PaginationController,
};
pub use photo_catalog::PhotoCatalog;
pub use photo_session::PhotoSession;
