//! Domain layer with core entities, errors, and port definitions.

/// Cooperative cancellation tokens.
pub mod cancellation;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Search query normalization.
pub mod search;

pub use cancellation::CancellationToken;
pub use entities::{ImageBytes, PhotoRecord};
pub use errors::FetchError;
pub use ports::{CatalogPort, HttpTransport, TransportError, TransportErrorKind, TransportResponse};
pub use search::SearchQuery;
