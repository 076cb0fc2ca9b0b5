//! Geometric suppression of duplicate detections.
//!
//! Two detections describe the same physical object when their boxes pass
//! [`BoundingBox::same_spot`]. Inputs are visited in descending confidence so
//! the stronger detection always survives, independent of input order.

use crate::bbox::BoundingBox;
use std::cmp::Ordering;

/// Something with a box and a confidence that can take part in suppression.
pub(crate) trait Scored {
    fn bbox(&self) -> &BoundingBox;
    fn confidence(&self) -> f32;
    /// Final tie-breaker among equal confidences.
    fn tie_key(&self) -> &str;
}

fn scored_cmp_desc<T: Scored>(a: &T, b: &T) -> Ordering {
    b.confidence()
        .total_cmp(&a.confidence())
        .then_with(|| a.tie_key().cmp(b.tie_key()))
        .then_with(|| a.bbox().y.cmp(&b.bbox().y))
        .then_with(|| a.bbox().x.cmp(&b.bbox().x))
}

/// Keeps the strongest detection of every physical spot.
pub(crate) fn suppress_overlaps<T: Scored>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(scored_cmp_desc);
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if kept.iter().any(|k| k.bbox().same_spot(item.bbox())) {
            continue;
        }
        kept.push(item);
    }
    kept
}

/// Like [`suppress_overlaps`], additionally keeping at most one entry per key.
///
/// Since entries are visited strongest first, a weaker entry of an already
/// kept key is dropped, and a stronger one replaces any weaker entry that
/// would otherwise have claimed the key or the spot.
pub(crate) fn suppress_overlaps_per_key<T: Scored>(
    mut items: Vec<T>,
    key: impl Fn(&T) -> &str,
) -> Vec<T> {
    items.sort_by(scored_cmp_desc);
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let duplicate = kept
            .iter()
            .any(|k| key(k) == key(&item) || k.bbox().same_spot(item.bbox()));
        if !duplicate {
            kept.push(item);
        }
    }
    kept
}
