//! Correlation kernel implementations.
//!
//! Kernels compute a dense ZNCC surface over every valid placement of a
//! template plane on an image plane. They are pure: no logging, no caching.
//! Window means and variances come from summed-area tables; only the
//! template dot product is evaluated per placement, by a [`WindowDot`]
//! implementation selected at compile time.

use crate::image::ImageView;
use crate::search::image::Plane;
use crate::search::surface::ScoreMap;
use crate::template::ZnccPlan;

/// Dot product of a zero-mean template with the image window at `(x, y)`.
pub(crate) trait WindowDot {
    fn dot(image: ImageView<'_, u8>, plan: &ZnccPlan, x: usize, y: usize) -> f32;
}

pub(crate) mod scalar;

#[cfg(feature = "simd")]
pub(crate) mod simd;

#[cfg(not(feature = "simd"))]
use scalar::ScalarDot as ActiveDot;
#[cfg(feature = "simd")]
use simd::SimdDot as ActiveDot;

/// Computes the ZNCC score of `plan` at every placement on `plane`.
///
/// Windows whose variance is at or below `min_var_i` score 0. Returns `None`
/// when the template does not fit. With the `rayon` feature, rows are
/// scored in parallel on the current pool.
pub(crate) fn zncc_surface(plane: Plane<'_>, plan: &ZnccPlan, min_var_i: f64) -> Option<ScoreMap> {
    zncc_surface_with::<ActiveDot>(plane, plan, min_var_i)
}

pub(crate) fn zncc_surface_with<D: WindowDot>(
    plane: Plane<'_>,
    plan: &ZnccPlan,
    min_var_i: f64,
) -> Option<ScoreMap> {
    let img_width = plane.view.width();
    let img_height = plane.view.height();
    if img_width < plan.width() || img_height < plan.height() {
        return None;
    }

    let out_width = img_width - plan.width() + 1;
    let out_height = img_height - plan.height() + 1;
    let mut scores = vec![0.0f32; out_width * out_height];
    let fill_row = |(y, row): (usize, &mut [f32])| score_row::<D>(plane, plan, min_var_i, y, row);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        scores.par_chunks_mut(out_width).enumerate().for_each(fill_row);
    }
    #[cfg(not(feature = "rayon"))]
    scores.chunks_mut(out_width).enumerate().for_each(fill_row);

    Some(ScoreMap::from_scores(out_width, out_height, scores))
}

fn score_row<D: WindowDot>(
    plane: Plane<'_>,
    plan: &ZnccPlan,
    min_var_i: f64,
    y: usize,
    row: &mut [f32],
) {
    let n = plan.len() as u128;
    let var_t = plan.var_t();
    for (x, slot) in row.iter_mut().enumerate() {
        let (sum_i, sum_i2) = plane.sums.window(x, y, plan.width(), plan.height());
        let scaled = n * sum_i2 as u128 - (sum_i as u128) * (sum_i as u128);
        let var_i = scaled as f64 / n as f64;
        if var_i <= min_var_i {
            continue;
        }

        let dot = D::dot(plane.view, plan, x, y);
        let score = dot as f64 / (var_t * var_i).sqrt();
        if score.is_finite() {
            *slot = score.clamp(-1.0, 1.0) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::zncc_surface;
    use crate::image::integral::IntegralImage;
    use crate::image::ImageView;
    use crate::search::image::Plane;
    use crate::template::ZnccPlan;

    #[test]
    fn zncc_surface_matches_bruteforce() {
        let img_width = 19;
        let img_height = 7;
        let image: Vec<u8> = (0..img_width * img_height)
            .map(|i| {
                let (x, y) = (i % img_width, i / img_width);
                ((x * 17 + y * 9 + x * y) & 0xFF) as u8
            })
            .collect();
        let tpl_width = 11;
        let tpl_height = 2;
        let tpl: Vec<u8> = (0..tpl_width * tpl_height)
            .map(|i| {
                let (x, y) = (i % tpl_width, i / tpl_width);
                ((x * 5 + y * 11 + x * y) & 0xFF) as u8
            })
            .collect();

        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let sums = IntegralImage::build(view);
        let plane = Plane { view, sums: &sums };
        let plan = ZnccPlan::from_view(ImageView::from_slice(&tpl, tpl_width, tpl_height).unwrap())
            .unwrap();
        let surface = zncc_surface(plane, &plan, 1e-8).unwrap();
        assert_eq!(surface.width(), img_width - tpl_width + 1);
        assert_eq!(surface.height(), img_height - tpl_height + 1);

        let n = (tpl_width * tpl_height) as f64;
        let t_mean = tpl.iter().map(|&v| v as f64).sum::<f64>() / n;
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                let mut window = Vec::new();
                for ty in 0..tpl_height {
                    for tx in 0..tpl_width {
                        window.push(image[(y + ty) * img_width + x + tx] as f64);
                    }
                }
                let i_mean = window.iter().sum::<f64>() / n;
                let mut num = 0.0;
                let mut den_t = 0.0;
                let mut den_i = 0.0;
                for (k, &iv) in window.iter().enumerate() {
                    let tv = tpl[k] as f64 - t_mean;
                    num += tv * (iv - i_mean);
                    den_t += tv * tv;
                    den_i += (iv - i_mean) * (iv - i_mean);
                }
                let expected = if den_i <= 1e-8 {
                    0.0
                } else {
                    num / (den_t * den_i).sqrt()
                };
                let got = surface.get(x, y).unwrap();
                assert!(
                    (got as f64 - expected).abs() < 1e-4,
                    "({x}, {y}): got {got}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn template_larger_than_image_yields_none() {
        let image = vec![1u8, 2, 3, 4];
        let view = ImageView::from_slice(&image, 2, 2).unwrap();
        let sums = IntegralImage::build(view);
        let tpl: Vec<u8> = (0..9).collect();
        let plan = ZnccPlan::from_view(ImageView::from_slice(&tpl, 3, 3).unwrap()).unwrap();
        assert!(zncc_surface(Plane { view, sums: &sums }, &plan, 1e-8).is_none());
    }
}
