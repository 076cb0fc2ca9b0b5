//! Template matching against a prepared screenshot.
//!
//! Each template is correlated on the grayscale pair and on the binary-mask
//! pair; the two ZNCC surfaces are averaged per placement and every placement
//! at or above the confidence threshold becomes a candidate.

pub(crate) mod image;
pub(crate) mod surface;

pub use image::SearchImage;
pub use surface::ScoreMap;

use crate::bbox::BoundingBox;
use crate::kernel::zncc_surface;
use crate::template::{Template, TemplateKey};
use crate::util::{StockMatchError, StockMatchResult};

/// Search configuration shared by the icon and digit detectors.
///
/// `confidence_threshold` trades false positives from look-alike icons
/// (higher values) against misses on compressed screenshots (lower values).
/// Values between 0.90 and 0.95 are typical.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Minimum averaged score for a candidate (inclusive).
    pub confidence_threshold: f32,
    /// Score above which an icon group stops trying further variants (exclusive).
    pub high_confidence: f32,
    /// Image windows with variance at or below this value score 0.
    pub min_var_i: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.95,
            high_confidence: 0.97,
            min_var_i: 1e-8,
        }
    }
}

impl MatchConfig {
    /// Checks that thresholds are in range and consistently ordered.
    pub fn validate(&self) -> StockMatchResult<()> {
        let t = self.confidence_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(StockMatchError::config(format!(
                "confidence_threshold must be in (0, 1], got {t}"
            )));
        }
        if !(self.high_confidence >= t && self.high_confidence <= 1.0) {
            return Err(StockMatchError::config(format!(
                "high_confidence must be in [confidence_threshold, 1], got {}",
                self.high_confidence
            )));
        }
        if !(self.min_var_i >= 0.0) {
            return Err(StockMatchError::config("min_var_i must be non-negative"));
        }
        Ok(())
    }

    /// Grayscale peak below which the averaged score cannot reach the threshold.
    ///
    /// The binary score is at most 1, so `(gray + 1) / 2 >= t` needs
    /// `gray >= 2t - 1`.
    pub fn gray_skip_bound(&self) -> f32 {
        2.0 * self.confidence_threshold - 1.0
    }
}

/// One candidate location of a template in the screenshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Template that produced the match.
    pub template: TemplateKey,
    /// Averaged correlation score in `[0, 1]` for accepted matches.
    pub confidence: f32,
    /// Template footprint at the matched placement.
    pub bbox: BoundingBox,
}

/// Correlates templates against a prepared screenshot.
///
/// The matcher is a pure function of its inputs: it computes each surface
/// once per call, keeps nothing between calls and does not log.
#[derive(Clone, Debug, Default)]
pub struct TemplateMatcher {
    cfg: MatchConfig,
}

impl TemplateMatcher {
    pub fn new(cfg: MatchConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Computes the averaged correlation surface of `template` on `image`.
    ///
    /// Returns `None` when the template does not fit in the image, or when the
    /// grayscale peak already rules out every placement (the binary surface is
    /// then never computed). Templates with a flat binary mask are scored on
    /// grayscale alone.
    pub fn score_map(&self, image: &SearchImage, template: &Template) -> Option<ScoreMap> {
        let min_var_i = self.cfg.min_var_i as f64;
        let gray = zncc_surface(image.gray_plane(), template.gray_plan(), min_var_i)?;
        let Some(binary_plan) = template.binary_plan() else {
            return Some(gray);
        };
        if gray.max() < self.cfg.gray_skip_bound() {
            return None;
        }
        let binary = zncc_surface(image.binary_plane(), binary_plan, min_var_i)?;
        Some(gray.average(&binary))
    }

    /// Returns every placement of `template` at or above the threshold, strongest first.
    pub fn match_template(&self, image: &SearchImage, template: &Template) -> Vec<Match> {
        let Some(surface) = self.score_map(image, template) else {
            return Vec::new();
        };
        let width = template.width() as u32;
        let height = template.height() as u32;
        surface
            .candidates(self.cfg.confidence_threshold)
            .into_iter()
            .map(|peak| Match {
                template: template.key().clone(),
                confidence: peak.score,
                bbox: BoundingBox::new(peak.x as u32, peak.y as u32, width, height),
            })
            .collect()
    }

    /// Returns the strongest accepted placement of `template`, if any.
    pub fn best_match(&self, image: &SearchImage, template: &Template) -> Option<Match> {
        self.match_template(image, template).into_iter().next()
    }
}
