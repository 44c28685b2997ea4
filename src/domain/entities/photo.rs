//! Photo catalog entry.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Display width the presentation layer lays photos out at.
pub const DISPLAY_WIDTH: u32 = 375;

/// A single photo from the catalog.
///
/// Records are immutable once decoded; the catalog hands out clones and never
/// edits an entry in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRecord {
    id: String,
    author: String,
    width: NonZeroU32,
    height: NonZeroU32,
    image_key: String,
}

impl PhotoRecord {
    /// Creates a new photo record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        width: NonZeroU32,
        height: NonZeroU32,
        image_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            width,
            height,
            image_key: image_key.into(),
        }
    }

    /// Returns the catalog id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the author name.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the original width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width.get()
    }

    /// Returns the original height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height.get()
    }

    /// Returns the key used to fetch and cache the image (its download URL).
    #[must_use]
    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    /// Height over width.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.height()) / f64::from(self.width())
    }

    /// Height the photo occupies when scaled to `target_width`, rounded down.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scaled_height(&self, target_width: u32) -> u32 {
        (self.aspect_ratio() * f64::from(target_width)).floor() as u32
    }

    /// Human readable size label, e.g. `Size: 375x562`.
    #[must_use]
    pub fn size_label(&self, target_width: u32) -> String {
        format!("Size: {target_width}x{}", self.scaled_height(target_width))
    }
}

impl std::fmt::Display for PhotoRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} by {}", self.id, self.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(width: u32, height: u32) -> PhotoRecord {
        PhotoRecord::new(
            "10",
            "Paul Jarvis",
            NonZeroU32::new(width).unwrap(),
            NonZeroU32::new(height).unwrap(),
            "https://picsum.photos/id/10/2500/1667",
        )
    }

    #[test]
    fn test_accessors() {
        let photo = record(2500, 1667);
        assert_eq!(photo.id(), "10");
        assert_eq!(photo.author(), "Paul Jarvis");
        assert_eq!(photo.width(), 2500);
        assert_eq!(photo.height(), 1667);
        assert_eq!(photo.image_key(), "https://picsum.photos/id/10/2500/1667");
    }

    #[test]
    fn test_scaled_height_rounds_down() {
        let photo = record(2500, 1667);
        // 1667 / 2500 * 375 = 250.05
        assert_eq!(photo.scaled_height(DISPLAY_WIDTH), 250);
        assert_eq!(photo.size_label(DISPLAY_WIDTH), "Size: 375x250");
    }

    #[test]
    fn test_portrait_aspect_ratio() {
        let photo = record(100, 200);
        assert!((photo.aspect_ratio() - 2.0).abs() < f64::EPSILON);
        assert_eq!(photo.scaled_height(DISPLAY_WIDTH), 750);
    }

    #[test]
    fn test_display() {
        assert_eq!(record(1, 1).to_string(), "#10 by Paul Jarvis");
    }
}
