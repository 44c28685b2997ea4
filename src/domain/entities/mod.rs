//! Domain entity definitions.

mod image;
mod photo;

pub use image::ImageBytes;
pub use photo::{DISPLAY_WIDTH, PhotoRecord};
