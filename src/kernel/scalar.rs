//! Scalar reference dot product.

use crate::image::ImageView;
use crate::kernel::WindowDot;
use crate::template::ZnccPlan;

/// Plain f32 accumulation over template rows.
pub(crate) struct ScalarDot;

impl WindowDot for ScalarDot {
    fn dot(image: ImageView<'_, u8>, plan: &ZnccPlan, x: usize, y: usize) -> f32 {
        let tpl_width = plan.width();
        let t_prime = plan.t_prime();
        let mut dot = 0.0f32;
        for ty in 0..plan.height() {
            let img_row = image.row(y + ty).expect("row within bounds for scan");
            let base = ty * tpl_width;
            let tpl_row = &t_prime[base..base + tpl_width];
            for (t, &value) in tpl_row.iter().zip(&img_row[x..x + tpl_width]) {
                dot += t * value as f32;
            }
        }
        dot
    }
}
