//! Dense correlation surfaces.

use crate::candidate::{sort_peaks_desc, Peak};

/// Correlation scores for every top-left placement of a template.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    width: usize,
    height: usize,
    scores: Vec<f32>,
}

impl ScoreMap {
    /// Wraps row-major scores; `scores.len()` must equal `width * height`.
    pub fn from_scores(width: usize, height: usize, scores: Vec<f32>) -> Self {
        debug_assert_eq!(scores.len(), width * height);
        Self {
            width,
            height,
            scores,
        }
    }

    /// Number of placement columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of placement rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the score at placement `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.scores.get(y * self.width + x).copied()
    }

    /// Returns the highest score, or negative infinity for an empty map.
    pub fn max(&self) -> f32 {
        self.scores.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Averages two surfaces of identical shape element-wise.
    pub fn average(&self, other: &ScoreMap) -> ScoreMap {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        let scores = self
            .scores
            .iter()
            .zip(&other.scores)
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        ScoreMap::from_scores(self.width, self.height, scores)
    }

    /// Returns every placement scoring at least `threshold`, strongest first.
    pub fn candidates(&self, threshold: f32) -> Vec<Peak> {
        let mut peaks: Vec<Peak> = self
            .scores
            .iter()
            .enumerate()
            .filter(|(_, &score)| score >= threshold)
            .map(|(idx, &score)| Peak {
                x: idx % self.width,
                y: idx / self.width,
                score,
            })
            .collect();
        sort_peaks_desc(&mut peaks);
        peaks
    }
}
