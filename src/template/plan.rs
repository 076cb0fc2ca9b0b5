//! Template plan precomputation for ZNCC.

use crate::image::ImageView;
use crate::util::{StockMatchError, StockMatchResult};

/// Precomputed zero-mean buffer and variance for one template plane.
///
/// With `t' = t - mean(t)` and `var_t = sum(t'^2)`, the ZNCC score at a
/// placement is `sum(t' * I) / sqrt(var_t * var_I)` where
/// `var_I = sum(I^2) - sum(I)^2 / n` over the image window. Because `t'` sums
/// to zero the image mean does not need to be subtracted in the dot product.
#[derive(Clone, Debug)]
pub struct ZnccPlan {
    width: usize,
    height: usize,
    var_t: f64,
    t_prime: Vec<f32>,
}

impl ZnccPlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> StockMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(StockMatchError::InvalidDimensions { width, height })?;

        let mut sum = 0.0f64;
        for y in 0..height {
            let row = tpl.row(y).ok_or(StockMatchError::BufferTooSmall {
                needed: count,
                got: y * width,
            })?;
            sum += row.iter().map(|&v| v as f64).sum::<f64>();
        }
        let mean = sum / count as f64;

        let mut var_t = 0.0f64;
        let mut t_prime = Vec::with_capacity(count);
        for y in 0..height {
            let row = tpl.row(y).ok_or(StockMatchError::BufferTooSmall {
                needed: count,
                got: y * width,
            })?;
            for &value in row {
                let d = value as f64 - mean;
                var_t += d * d;
                t_prime.push(d as f32);
            }
        }

        if var_t <= 1e-8 {
            return Err(StockMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            var_t,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of template pixels.
    pub fn len(&self) -> usize {
        self.t_prime.len()
    }

    /// Returns true when the plan has no pixels (never, for a valid plan).
    pub fn is_empty(&self) -> bool {
        self.t_prime.is_empty()
    }

    /// Returns the sum of squared deviations from the template mean.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }
}
