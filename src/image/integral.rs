//! Summed-area tables for constant-time window sums.

use crate::image::ImageView;

/// Summed-area tables of pixel values and squared pixel values.
///
/// Entry `(x, y)` of each table holds the sum over the rectangle
/// `[0, x) x [0, y)`, so tables are `(width + 1) x (height + 1)`.
pub(crate) struct IntegralImage {
    width: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    pub(crate) fn build(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sum_sq = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let row = image.row(y).expect("row within bounds for integral");
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = value as u64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self { width, sum, sum_sq }
    }

    /// Returns `(sum, sum of squares)` over the window at `(x, y)` of size `w x h`.
    #[inline]
    pub(crate) fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        let stride = self.width + 1;
        let a = y * stride + x;
        let b = y * stride + x + w;
        let c = (y + h) * stride + x;
        let d = (y + h) * stride + x + w;
        (
            self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c],
            self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c],
        )
    }
}
