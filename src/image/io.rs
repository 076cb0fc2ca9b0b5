//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::OwnedImage;
use crate::util::{StockMatchError, StockMatchResult};
use std::path::{Path, PathBuf};

/// File extensions accepted when scanning template directories.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Creates an owned luma image from a decoded image of any color type.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> StockMatchResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads a template file and converts it to grayscale.
pub fn load_template_image(path: &Path) -> StockMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| StockMatchError::TemplateLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img).map_err(|err| StockMatchError::TemplateLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Loads a screenshot from disk and converts it to grayscale.
pub fn load_screenshot(path: &Path) -> StockMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| StockMatchError::ImageLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img).map_err(|err| StockMatchError::ImageLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Decodes an encoded screenshot held in memory.
///
/// Accepts any format the `image` crate was built with. Errors report the
/// path as `<memory>`.
pub fn decode_screenshot(bytes: &[u8]) -> StockMatchResult<OwnedImage> {
    let in_memory = |reason: String| StockMatchError::ImageLoad {
        path: PathBuf::from("<memory>"),
        reason,
    };
    let img = image::load_from_memory(bytes).map_err(|err| in_memory(err.to_string()))?;
    owned_from_dynamic_image(&img).map_err(|err| in_memory(err.to_string()))
}

/// Returns true when `path` has one of the [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}
