//! Cached image payload.

use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, ImageReader};

use crate::domain::errors::FetchError;

/// Image body as served by the network, plus the dimensions read from its header.
///
/// Cloning is cheap: the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    data: Bytes,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl ImageBytes {
    /// Validates a response body and reads its dimensions.
    ///
    /// Only the header is inspected; pixel data is decoded by whoever renders it.
    ///
    /// # Errors
    /// Returns [`FetchError::Decode`] if the body is not a recognizable image.
    pub fn decode(data: Bytes) -> Result<Self, FetchError> {
        let reader = ImageReader::new(Cursor::new(data.as_ref()))
            .with_guessed_format()
            .map_err(|e| FetchError::decode(format!("failed to sniff image format: {e}")))?;

        let format = reader
            .format()
            .ok_or_else(|| FetchError::decode("unrecognized image format"))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| FetchError::decode(format!("failed to read image header: {e}")))?;

        Ok(Self {
            data,
            format,
            width,
            height,
        })
    }

    /// Returns the raw encoded bytes.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the detected container format.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size of the encoded body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::png_body;

    #[test]
    fn test_decode_png_header() {
        let image = ImageBytes::decode(png_body(4, 3)).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!((image.width(), image.height()), (4, 3));
        assert!(!image.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = ImageBytes::decode(Bytes::from_static(b"<html>not found</html>"));
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_decode_rejects_empty_body() {
        let result = ImageBytes::decode(Bytes::new());
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }
}
