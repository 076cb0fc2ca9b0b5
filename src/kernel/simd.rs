//! SIMD dot product using the `wide` crate.
//!
//! The inner template row loop processes 8 pixels at a time with `f32x8`;
//! the row tail falls back to scalar accumulation.

use crate::image::ImageView;
use crate::kernel::WindowDot;
use crate::template::ZnccPlan;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

pub(crate) struct SimdDot;

impl WindowDot for SimdDot {
    fn dot(image: ImageView<'_, u8>, plan: &ZnccPlan, x: usize, y: usize) -> f32 {
        let tpl_width = plan.width();
        let t_prime = plan.t_prime();
        let simd_end = tpl_width / LANES * LANES;

        let mut dot_vec = f32x8::ZERO;
        let mut dot_s = 0.0f32;
        for ty in 0..plan.height() {
            let img_row = image.row(y + ty).expect("row within bounds for scan");
            let img_row = &img_row[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];

            let mut tx = 0;
            while tx < simd_end {
                dot_vec += load_f32x8(&tpl_row[tx..]) * load_u8x8_as_f32x8(&img_row[tx..]);
                tx += LANES;
            }
            for (t, &value) in tpl_row[simd_end..].iter().zip(&img_row[simd_end..]) {
                dot_s += t * value as f32;
            }
        }
        hsum(dot_vec) + dot_s
    }
}
