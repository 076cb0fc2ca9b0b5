//! Inventory records: one per detected item, with its composed quantity.

use crate::bbox::BoundingBox;
use crate::catalog::ItemResolver;
use crate::detect::{DigitDetection, IconDetection};
use crate::quantity::QuantityComposer;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Final output for one detected item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryRecord {
    pub code: String,
    pub name: String,
    pub category: String,
    /// Composed quantity; 0 when no number could be read next to the icon.
    pub quantity: u64,
    /// Confidence of the icon match.
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub timestamp: DateTime<Local>,
}

/// Records extracted from one screenshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryReport {
    /// `report_YYYYMMDD_HHMMSS` of the report timestamp.
    pub report_id: String,
    pub source_image: Option<PathBuf>,
    pub timestamp: DateTime<Local>,
    pub records: Vec<InventoryRecord>,
}

impl InventoryReport {
    pub fn new(
        records: Vec<InventoryRecord>,
        source_image: Option<PathBuf>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            report_id: report_id(&timestamp),
            source_image,
            timestamp,
            records,
        }
    }

    /// Sum of all quantities of `code` in this report.
    pub fn quantity_of(&self, code: &str) -> u64 {
        self.records
            .iter()
            .filter(|r| r.code == code)
            .map(|r| r.quantity)
            .sum()
    }
}

pub fn report_id(timestamp: &DateTime<Local>) -> String {
    timestamp.format("report_%Y%m%d_%H%M%S").to_string()
}

/// Combines icon detections with the quantities printed next to them.
#[derive(Clone, Debug, Default)]
pub struct RecordBuilder {
    composer: QuantityComposer,
}

impl RecordBuilder {
    pub fn new(composer: QuantityComposer) -> Self {
        Self { composer }
    }

    pub fn composer(&self) -> &QuantityComposer {
        &self.composer
    }

    /// Builds records stamped with the current local time.
    pub fn build<R: ItemResolver + ?Sized>(
        &self,
        icons: &[IconDetection],
        digits: &[DigitDetection],
        resolver: &R,
    ) -> Vec<InventoryRecord> {
        self.build_at(icons, digits, resolver, Local::now())
    }

    /// Builds records in reading order (top to bottom, left to right).
    ///
    /// The quantity of an icon is read right of its right edge, aligned with
    /// its top edge.
    pub fn build_at<R: ItemResolver + ?Sized>(
        &self,
        icons: &[IconDetection],
        digits: &[DigitDetection],
        resolver: &R,
        timestamp: DateTime<Local>,
    ) -> Vec<InventoryRecord> {
        let mut records: Vec<InventoryRecord> = icons
            .iter()
            .map(|icon| {
                let quantity = self
                    .composer
                    .compose(digits, icon.bbox.right(), icon.bbox.y)
                    .unwrap_or(0);
                let info = resolver.resolve(&icon.item_code);
                InventoryRecord {
                    code: icon.item_code.clone(),
                    name: info.name,
                    category: info.category,
                    quantity,
                    confidence: icon.confidence,
                    bbox: icon.bbox,
                    timestamp,
                }
            })
            .collect();
        records.sort_by(|a, b| (a.bbox.y, a.bbox.x).cmp(&(b.bbox.y, b.bbox.x)));
        records
    }
}
