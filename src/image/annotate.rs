//! Detection overlays for checking template sets against a screenshot.
//!
//! Icon hits are outlined in green and glyph hits in red. A bar along the
//! top edge of each box shows the match confidence as a fraction of the box
//! width. Available when the `image-io` feature is enabled.

use crate::bbox::BoundingBox;
use crate::detect::{DigitDetection, IconDetection};
use crate::image::OwnedImage;
use crate::util::{StockMatchError, StockMatchResult};
use image::{Rgb, RgbImage};
use std::path::Path;

pub const ICON_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
pub const DIGIT_COLOR: Rgb<u8> = Rgb([230, 40, 40]);

const THICKNESS: u32 = 2;
const BAR_HEIGHT: u32 = 3;

/// Expands a grayscale image to RGB.
pub fn to_rgb(gray: &OwnedImage) -> RgbImage {
    let view = gray.view();
    RgbImage::from_fn(gray.width() as u32, gray.height() as u32, |x, y| {
        let v = view.get(x as usize, y as usize).copied().unwrap_or(0);
        Rgb([v, v, v])
    })
}

/// Draws a hollow rectangle, clipped to the image.
pub fn draw_rect(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let (img_w, img_h) = img.dimensions();
    let thickness = thickness.min(bbox.width).min(bbox.height);
    for dy in 0..bbox.height {
        for dx in 0..bbox.width {
            let edge = dx < thickness
                || dy < thickness
                || dx >= bbox.width - thickness
                || dy >= bbox.height - thickness;
            let (px, py) = (bbox.x + dx, bbox.y + dy);
            if edge && px < img_w && py < img_h {
                img.put_pixel(px, py, color);
            }
        }
    }
}

/// Draws the confidence bar just above `bbox`, or just below when the box
/// touches the top of the image.
fn draw_confidence_bar(img: &mut RgbImage, bbox: &BoundingBox, confidence: f32, color: Rgb<u8>) {
    let (img_w, img_h) = img.dimensions();
    let len = (bbox.width as f32 * confidence.clamp(0.0, 1.0)).round() as u32;
    let top = if bbox.y > BAR_HEIGHT {
        bbox.y - BAR_HEIGHT - 1
    } else {
        bbox.bottom() + 1
    };
    for py in top..top + BAR_HEIGHT {
        for px in bbox.x..bbox.x + len {
            if px < img_w && py < img_h {
                img.put_pixel(px, py, color);
            }
        }
    }
}

/// Renders every detection onto an RGB copy of `gray`.
pub fn annotate(gray: &OwnedImage, icons: &[IconDetection], digits: &[DigitDetection]) -> RgbImage {
    let mut img = to_rgb(gray);
    for icon in icons {
        draw_rect(&mut img, &icon.bbox, ICON_COLOR, THICKNESS);
        draw_confidence_bar(&mut img, &icon.bbox, icon.confidence, ICON_COLOR);
    }
    for digit in digits {
        draw_rect(&mut img, &digit.bbox, DIGIT_COLOR, 1);
        draw_confidence_bar(&mut img, &digit.bbox, digit.confidence, DIGIT_COLOR);
    }
    img
}

/// Renders the detections and writes the overlay to `path`.
pub fn save_annotated(
    path: &Path,
    gray: &OwnedImage,
    icons: &[IconDetection],
    digits: &[DigitDetection],
) -> StockMatchResult<()> {
    annotate(gray, icons, digits)
        .save(path)
        .map_err(|err| StockMatchError::ImageSave {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
}
