//! Picsum catalog API client.

mod client;
mod dto;

pub use client::{DEFAULT_CATALOG_URL, PicsumCatalogFetcher};
