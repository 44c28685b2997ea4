use std::num::NonZeroU32;

use serde::Deserialize;

use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FetchError;

/// One element of the catalog list response.
#[derive(Debug, Deserialize)]
pub struct PhotoResponse {
    /// Photo id.
    pub id: String,
    /// Photographer name.
    pub author: String,
    /// Original width in pixels.
    pub width: u32,
    /// Original height in pixels.
    pub height: u32,
    /// Full-size image URL, used as the image cache key.
    pub download_url: String,
}

impl TryFrom<PhotoResponse> for PhotoRecord {
    type Error = FetchError;

    fn try_from(dto: PhotoResponse) -> Result<Self, Self::Error> {
        let (Some(width), Some(height)) = (NonZeroU32::new(dto.width), NonZeroU32::new(dto.height))
        else {
            return Err(FetchError::decode(format!(
                "photo {} has zero dimension {}x{}",
                dto.id, dto.width, dto.height
            )));
        };
        Ok(Self::new(dto.id, dto.author, width, height, dto.download_url))
    }
}
