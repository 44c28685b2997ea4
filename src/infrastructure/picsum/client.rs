//! Catalog page fetcher for the Picsum list endpoint.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, warn};

use super::dto::PhotoResponse;
use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FetchError;
use crate::domain::ports::{CatalogPort, HttpTransport};

/// Public Picsum list endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://picsum.photos/v2/list";

/// Fetches catalog pages through an [`HttpTransport`].
pub struct PicsumCatalogFetcher {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl std::fmt::Debug for PicsumCatalogFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PicsumCatalogFetcher")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl PicsumCatalogFetcher {
    /// Creates a fetcher against `endpoint`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Creates a fetcher against [`DEFAULT_CATALOG_URL`].
    #[must_use]
    pub fn with_default_endpoint(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(transport, DEFAULT_CATALOG_URL)
    }

    fn page_url(&self, page: NonZeroU32, limit: NonZeroU32) -> Result<Url, FetchError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("page", page.get().to_string()),
                ("limit", limit.get().to_string()),
            ],
        )
        .map_err(|e| FetchError::transport(format!("invalid catalog URL {}: {e}", self.endpoint)))
    }
}

#[async_trait]
impl CatalogPort for PicsumCatalogFetcher {
    async fn fetch_page(
        &self,
        page: NonZeroU32,
        limit: NonZeroU32,
    ) -> Result<Vec<PhotoRecord>, FetchError> {
        let url = self.page_url(page, limit)?;
        debug!(%url, "Requesting catalog page");

        let response = self.transport.get(url.as_str()).await?;
        if !response.is_success() {
            warn!(%url, status = response.status, "Catalog request rejected");
            return Err(FetchError::HttpStatus(response.status));
        }

        let photos: Vec<PhotoResponse> = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, "Failed to parse catalog page");
            FetchError::decode(format!("failed to parse catalog page: {e}"))
        })?;

        photos.into_iter().map(PhotoRecord::try_from).collect()
    }
}
