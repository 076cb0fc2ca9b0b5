//! Composition of digit-glyph detections into item quantities.
//!
//! Digits belonging to an icon sit immediately to its right on the same text
//! row. The composer keeps the glyphs inside that window, splits them into
//! runs separated by wide horizontal gaps, picks the run that starts nearest
//! to the icon and reads it left to right.
//!
//! A thousands marker is only meaningful as the last glyph of a run: `12k`
//! reads as 12000. A marker anywhere else makes the run unreadable.

use crate::detect::DigitDetection;
use crate::util::{StockMatchError, StockMatchResult};

/// Symbol represented by a glyph template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Glyph {
    Digit(u8),
    Thousands,
}

impl Glyph {
    /// Maps a glyph template name (`num0`..`num9`, `numk`, or the bare symbol).
    pub fn from_template_name(name: &str) -> Option<Self> {
        let symbol = name.strip_prefix("num").unwrap_or(name);
        let mut chars = symbol.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        match c {
            '0'..='9' => Some(Glyph::Digit(c as u8 - b'0')),
            'k' | 'K' => Some(Glyph::Thousands),
            _ => None,
        }
    }

    /// Returns the character this glyph reads as.
    pub fn symbol(&self) -> char {
        match self {
            Glyph::Digit(d) => (b'0' + d) as char,
            Glyph::Thousands => 'k',
        }
    }
}

/// Tolerances for associating glyphs with an icon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComposeConfig {
    /// Glyphs must start less than this many pixels right of the reference.
    pub max_digit_distance: u32,
    /// Largest x step between consecutive glyphs of one number.
    pub max_digit_gap: u32,
    /// Allowed vertical offset, in glyph heights.
    pub vertical_tolerance: f32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            max_digit_distance: 150,
            max_digit_gap: 40,
            vertical_tolerance: 1.5,
        }
    }
}

impl ComposeConfig {
    pub fn validate(&self) -> StockMatchResult<()> {
        if self.max_digit_distance == 0 {
            return Err(StockMatchError::config("max_digit_distance must be positive"));
        }
        if !(self.vertical_tolerance > 0.0) {
            return Err(StockMatchError::config("vertical_tolerance must be positive"));
        }
        Ok(())
    }
}

/// Digits of one number, ordered left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityGroup<'a> {
    digits: Vec<&'a DigitDetection>,
}

impl<'a> QuantityGroup<'a> {
    pub fn digits(&self) -> &[&'a DigitDetection] {
        &self.digits
    }

    /// Concatenated glyph symbols in reading order.
    pub fn text(&self) -> String {
        self.digits.iter().map(|d| d.glyph.symbol()).collect()
    }

    /// Integer value of the group, or `None` if it does not read as a number.
    pub fn value(&self) -> Option<u64> {
        let glyphs: Vec<Glyph> = self.digits.iter().map(|d| d.glyph).collect();
        let (digits, scale) = match glyphs.split_last() {
            Some((Glyph::Thousands, rest)) => (rest, 1000),
            _ => (glyphs.as_slice(), 1),
        };
        if digits.is_empty() {
            return None;
        }
        let mut value = 0u64;
        for glyph in digits {
            let Glyph::Digit(d) = glyph else {
                return None;
            };
            value = value.checked_mul(10)?.checked_add(*d as u64)?;
        }
        value.checked_mul(scale)
    }
}

/// Associates digit detections with icon reference points.
#[derive(Clone, Debug, Default)]
pub struct QuantityComposer {
    cfg: ComposeConfig,
}

impl QuantityComposer {
    pub fn new(cfg: ComposeConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.cfg
    }

    /// Selects the digit group belonging to the reference point.
    pub fn group<'a>(
        &self,
        digits: &'a [DigitDetection],
        reference_x: u32,
        reference_y: u32,
    ) -> Option<QuantityGroup<'a>> {
        let rx = reference_x as i64;
        let ry = reference_y as i64;
        let max_distance = self.cfg.max_digit_distance as i64;

        let mut relevant: Vec<&DigitDetection> = digits
            .iter()
            .filter(|d| {
                let x = d.bbox.x as i64;
                let dy = (d.bbox.y as i64 - ry).abs() as f32;
                x >= rx
                    && x < rx + max_distance
                    && dy < d.bbox.height as f32 * self.cfg.vertical_tolerance
            })
            .collect();
        if relevant.is_empty() {
            return None;
        }
        relevant.sort_by_key(|d| (d.bbox.x, d.bbox.y));

        let mut groups: Vec<Vec<&DigitDetection>> = Vec::new();
        let mut current = vec![relevant[0]];
        for pair in relevant.windows(2) {
            if pair[1].bbox.x - pair[0].bbox.x > self.cfg.max_digit_gap {
                groups.push(std::mem::take(&mut current));
            }
            current.push(pair[1]);
        }
        groups.push(current);

        groups
            .into_iter()
            .min_by_key(|group| group.iter().map(|d| d.bbox.x as i64 - rx).min())
            .map(|digits| QuantityGroup { digits })
    }

    /// Reads the quantity next to the reference point.
    ///
    /// Returns `None` when no glyph qualifies or the selected group does not
    /// read as a number.
    pub fn compose(
        &self,
        digits: &[DigitDetection],
        reference_x: u32,
        reference_y: u32,
    ) -> Option<u64> {
        self.group(digits, reference_x, reference_y)?.value()
    }
}

/// Composes a quantity with default gap and tolerance settings.
pub fn compose(
    digits: &[DigitDetection],
    reference_x: u32,
    reference_y: u32,
    max_digit_distance: u32,
) -> Option<u64> {
    QuantityComposer::new(ComposeConfig {
        max_digit_distance,
        ..ComposeConfig::default()
    })
    .compose(digits, reference_x, reference_y)
}
