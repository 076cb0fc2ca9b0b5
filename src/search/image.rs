//! Screenshot preparation for matching.

use crate::image::integral::IntegralImage;
use crate::image::{ImageView, OwnedImage};
use crate::util::StockMatchResult;

/// One plane of a prepared image: pixels plus summed-area tables.
#[derive(Clone, Copy)]
pub(crate) struct Plane<'a> {
    pub(crate) view: ImageView<'a, u8>,
    pub(crate) sums: &'a IntegralImage,
}

/// A screenshot prepared once per recognition call.
///
/// Holds the grayscale plane, its binary mask and the window-sum tables of
/// both. Shared read-only by every matcher invocation of the same call.
pub struct SearchImage {
    gray: OwnedImage,
    binary: OwnedImage,
    gray_sums: IntegralImage,
    binary_sums: IntegralImage,
}

impl SearchImage {
    /// Prepares a grayscale screenshot.
    pub fn new(gray: OwnedImage) -> Self {
        let binary = gray.binarized();
        let gray_sums = IntegralImage::build(gray.view());
        let binary_sums = IntegralImage::build(binary.view());
        Self {
            gray,
            binary,
            gray_sums,
            binary_sums,
        }
    }

    /// Prepares a screenshot from a contiguous luma buffer.
    pub fn from_luma(data: Vec<u8>, width: usize, height: usize) -> StockMatchResult<Self> {
        Ok(Self::new(OwnedImage::new(data, width, height)?))
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.gray.width()
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.gray.height()
    }

    pub fn gray(&self) -> &OwnedImage {
        &self.gray
    }

    pub fn binary(&self) -> &OwnedImage {
        &self.binary
    }

    pub(crate) fn gray_plane(&self) -> Plane<'_> {
        Plane {
            view: self.gray.view(),
            sums: &self.gray_sums,
        }
    }

    pub(crate) fn binary_plane(&self) -> Plane<'_> {
        Plane {
            view: self.binary.view(),
            sums: &self.binary_sums,
        }
    }
}
