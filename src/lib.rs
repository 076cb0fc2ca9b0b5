//! StockMatch reads item inventories out of game screenshots.
//!
//! Item icons and digit glyphs are located by ZNCC template matching on the
//! grayscale image and its binary mask, with the two scores averaged. Digits
//! next to each icon are composed into a quantity and every detected item
//! becomes an [`InventoryRecord`]. Icon search runs on a bounded worker pool
//! with the `rayon` feature; image decoding needs the `image-io` feature.

mod trace;

pub mod bbox;
mod candidate;
pub mod catalog;
pub mod detect;
pub mod image;
mod kernel;
pub mod pipeline;
pub mod quantity;
pub mod record;
pub mod search;
pub mod template;
pub mod util;

pub use bbox::BoundingBox;
pub use candidate::Peak;
pub use catalog::{CatalogEntry, ItemCatalog, ItemInfo, ItemResolver, SuffixRule};
pub use detect::{
    CancelToken, DigitDetection, DigitDetector, IconDetection, IconDetector, IconSearchStats,
};
pub use image::{ImageView, OwnedImage};
pub use pipeline::{BatchSummary, Detections, ImageFailure, Recognizer, RecognizerConfig};
pub use quantity::{compose, ComposeConfig, Glyph, QuantityComposer, QuantityGroup};
pub use record::{InventoryRecord, InventoryReport, RecordBuilder};
pub use search::{Match, MatchConfig, ScoreMap, SearchImage, TemplateMatcher};
pub use template::{Template, TemplateKey, TemplateStore, VariantKey};
pub use util::{StockMatchError, StockMatchResult};
