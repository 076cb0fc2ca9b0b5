//! Digit glyph detection.
//!
//! Every glyph template is matched exhaustively; quantities can repeat a
//! glyph any number of times, so there is no early exit. Overlapping hits are
//! collapsed to the strongest one, across glyphs as well, so a single screen
//! position never reads as two symbols.

use crate::bbox::BoundingBox;
use crate::candidate::nms::{suppress_overlaps, Scored};
use crate::quantity::Glyph;
use crate::search::{MatchConfig, SearchImage, TemplateMatcher};
use crate::template::{TemplateKey, TemplateStore};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{StockMatchError, StockMatchResult};

/// A digit glyph found in a screenshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DigitDetection {
    pub glyph: Glyph,
    /// Name of the glyph template that matched.
    pub template: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl DigitDetection {
    pub fn new(
        glyph: Glyph,
        template: impl Into<String>,
        confidence: f32,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            glyph,
            template: template.into(),
            confidence,
            bbox,
        }
    }
}

impl Scored for DigitDetection {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn tie_key(&self) -> &str {
        &self.template
    }
}

/// Finds digit glyphs using a store of glyph templates.
#[derive(Clone, Debug)]
pub struct DigitDetector {
    store: TemplateStore,
    glyphs: Vec<(usize, Glyph)>,
    matcher: TemplateMatcher,
}

impl DigitDetector {
    /// Builds a detector from glyph templates.
    ///
    /// Templates whose names do not map to a glyph are skipped with a warning.
    pub fn new(store: TemplateStore, cfg: MatchConfig) -> StockMatchResult<Self> {
        cfg.validate()?;
        let mut glyphs = Vec::new();
        for (idx, template) in store.iter().enumerate() {
            let TemplateKey::Glyph(name) = template.key() else {
                continue;
            };
            match Glyph::from_template_name(name) {
                Some(glyph) => glyphs.push((idx, glyph)),
                None => {
                    trace_warn!("glyph_unmapped", template = name.as_str());
                }
            }
        }
        if glyphs.is_empty() {
            return Err(StockMatchError::EmptyTemplateSet { kind: "digit" });
        }
        Ok(Self {
            store,
            glyphs,
            matcher: TemplateMatcher::new(cfg),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        self.matcher.config()
    }

    /// Glyphs this detector can recognize, in store order.
    pub fn glyphs(&self) -> impl Iterator<Item = Glyph> + '_ {
        self.glyphs.iter().map(|(_, glyph)| *glyph)
    }

    /// Detects every glyph occurrence, ordered left to right.
    pub fn detect_numbers(&self, image: &SearchImage) -> Vec<DigitDetection> {
        let _span = trace_span!("detect_numbers", glyphs = self.glyphs.len()).entered();
        let mut hits = Vec::new();
        for &(idx, glyph) in &self.glyphs {
            let Some(template) = self.store.get_index(idx) else {
                continue;
            };
            let name = template.key().to_string();
            hits.extend(
                self.matcher
                    .match_template(image, template)
                    .into_iter()
                    .map(|m| DigitDetection::new(glyph, name.as_str(), m.confidence, m.bbox)),
            );
        }
        let raw = hits.len();
        let mut digits = suppress_overlaps(hits);
        digits.sort_by(|a, b| (a.bbox.x, a.bbox.y).cmp(&(b.bbox.x, b.bbox.y)));
        trace_event!(
            "digits_detected",
            count = digits.len(),
            suppressed = raw - digits.len()
        );
        digits
    }
}
