//! Photoreel - paginated photo catalog with a de-duplicating image cache.
//!
//! The crate loads a remote photo catalog page by page, filters it by search
//! text, and resolves images through a session-wide cache that merges
//! concurrent requests for the same image into one fetch.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the catalog, pagination and cache services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "photoreel";
