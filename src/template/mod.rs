//! Reference templates and their identities.
//!
//! A template keeps its grayscale pixels, a binary mask thresholded at
//! [`BINARY_THRESHOLD`](crate::image::BINARY_THRESHOLD), and a ZNCC plan for
//! each plane. Templates are immutable once built.

use crate::image::OwnedImage;
use crate::util::StockMatchResult;
use std::fmt;

mod plan;
pub mod store;

pub use plan::ZnccPlan;
pub use store::TemplateStore;

/// Identity of one pose variant of an item icon.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey {
    /// Canonical item code (the item directory name).
    pub item_code: String,
    /// Index of the template set (item tree) the variant was loaded from.
    pub set: u16,
    /// Position of the variant inside its item directory, in sorted file order.
    pub ordinal: u16,
}

impl VariantKey {
    pub fn new(item_code: impl Into<String>, set: u16, ordinal: u16) -> Self {
        Self {
            item_code: item_code.into(),
            set,
            ordinal,
        }
    }

    /// Maps the variant to its canonical item code.
    pub fn item_code(&self) -> &str {
        &self.item_code
    }
}

/// Identity of a template inside a store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKey {
    /// A glyph from a flat directory, named by its file stem (e.g. `num7`).
    Glyph(String),
    /// A pose variant of an item icon.
    Variant(VariantKey),
}

impl TemplateKey {
    /// Returns the canonical item code for variants, `None` for glyphs.
    pub fn item_code(&self) -> Option<&str> {
        match self {
            TemplateKey::Variant(key) => Some(key.item_code()),
            TemplateKey::Glyph(_) => None,
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Glyph(name) => f.write_str(name),
            TemplateKey::Variant(key) => write!(f, "{}#{}.{}", key.item_code, key.set, key.ordinal),
        }
    }
}

/// Immutable reference image with grayscale and binary representations.
#[derive(Clone, Debug)]
pub struct Template {
    key: TemplateKey,
    gray: OwnedImage,
    binary: OwnedImage,
    gray_plan: ZnccPlan,
    binary_plan: Option<ZnccPlan>,
}

impl Template {
    /// Builds a template from a grayscale image.
    ///
    /// Fails with `DegenerateTemplate` when the grayscale image is flat. A flat
    /// binary mask is allowed; such templates are matched on grayscale alone.
    pub fn new(key: TemplateKey, gray: OwnedImage) -> StockMatchResult<Self> {
        let gray_plan = ZnccPlan::from_view(gray.view())?;
        let binary = gray.binarized();
        let binary_plan = if binary.is_flat() {
            None
        } else {
            Some(ZnccPlan::from_view(binary.view())?)
        };
        Ok(Self {
            key,
            gray,
            binary,
            gray_plan,
            binary_plan,
        })
    }

    /// Builds a template from a contiguous luma buffer.
    pub fn from_luma(
        key: TemplateKey,
        data: Vec<u8>,
        width: usize,
        height: usize,
    ) -> StockMatchResult<Self> {
        Self::new(key, OwnedImage::new(data, width, height)?)
    }

    pub fn key(&self) -> &TemplateKey {
        &self.key
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.gray.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.gray.height()
    }

    /// Returns the template area in pixels.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn gray(&self) -> &OwnedImage {
        &self.gray
    }

    pub fn binary(&self) -> &OwnedImage {
        &self.binary
    }

    pub fn gray_plan(&self) -> &ZnccPlan {
        &self.gray_plan
    }

    /// Returns the binary-mask plan, or `None` if the mask is flat.
    pub fn binary_plan(&self) -> Option<&ZnccPlan> {
        self.binary_plan.as_ref()
    }
}
