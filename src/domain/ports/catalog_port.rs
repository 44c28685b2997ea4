//! Catalog port definition.

use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FetchError;

/// Port for fetching one page of the photo catalog.
///
/// Concurrent calls carry no ordering guarantee; callers serialize page loads.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Fetches page `page` holding at most `limit` records.
    async fn fetch_page(
        &self,
        page: NonZeroU32,
        limit: NonZeroU32,
    ) -> Result<Vec<PhotoRecord>, FetchError>;
}
