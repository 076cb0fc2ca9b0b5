//! Axis-aligned bounding boxes in source-image pixel coordinates.

/// Bounding box of a detection: top-left corner plus size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// First column to the right of the box.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Row just below the box.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Center point in pixel coordinates.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Returns true if both boxes cover the same physical object.
    ///
    /// Two boxes are the same object when their centers are closer than half
    /// the larger width horizontally and half the larger height vertically.
    pub fn same_spot(&self, other: &BoundingBox) -> bool {
        let (cx, cy) = self.center();
        let (ox, oy) = other.center();
        let half_w = self.width.max(other.width) as f32 / 2.0;
        let half_h = self.height.max(other.height) as f32 / 2.0;
        (cx - ox).abs() < half_w && (cy - oy).abs() < half_h
    }
}
