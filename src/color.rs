//! Color transforms over [0, 1] planar samples.
//!
//! RGB to YCbCr uses the Rec.601 luma weights on full-range samples:
//! `Y = 0.299R + 0.587G + 0.114B`, `Cb = (B - Y) / 1.772 + 0.5`,
//! `Cr = (R - Y) / 1.402 + 0.5`. The transform runs in place over the three
//! planes. A `wide::f32x4` path handles the bulk of each row when the
//! `simd` feature is enabled.

use crate::image::PlaneF;

#[cfg(feature = "simd")]
use wide::f32x4;

/// Luma weight of R.
pub const KR: f32 = 0.299;
/// Luma weight of G.
pub const KG: f32 = 0.587;
/// Luma weight of B.
pub const KB: f32 = 0.114;
/// Cb normalization: 1 / (2 * (1 - KB)).
pub const CB_SCALE: f32 = 1.0 / 1.772;
/// Cr normalization: 1 / (2 * (1 - KR)).
pub const CR_SCALE: f32 = 1.0 / 1.402;

/// Converts one RGB triple in [0, 1] to full-range YCbCr in [0, 1].
#[inline]
#[must_use]
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = KR * r + KG * g + KB * b;
    let cb = (b - y) * CB_SCALE + 0.5;
    let cr = (r - y) * CR_SCALE + 0.5;
    (y, cb, cr)
}

/// Transforms the three planes from RGB to YCbCr in place.
pub fn rgb_planes_to_ycbcr(planes: &mut [PlaneF]) {
    debug_assert_eq!(planes.len(), 3);
    let (rp, rest) = planes.split_at_mut(1);
    let (gp, bp) = rest.split_at_mut(1);
    let (rp, gp, bp) = (&mut rp[0], &mut gp[0], &mut bp[0]);

    let height = rp.height();
    for y in 0..height {
        transform_row(rp.row_mut(y), gp.row_mut(y), bp.row_mut(y));
    }
}

#[cfg(feature = "simd")]
fn transform_row(r: &mut [f32], g: &mut [f32], b: &mut [f32]) {
    let kr = f32x4::splat(KR);
    let kg = f32x4::splat(KG);
    let kb = f32x4::splat(KB);
    let cb_scale = f32x4::splat(CB_SCALE);
    let cr_scale = f32x4::splat(CR_SCALE);
    let half = f32x4::splat(0.5);

    let n = r.len();
    let vec_end = n - n % 4;
    for i in (0..vec_end).step_by(4) {
        let rv = f32x4::from([r[i], r[i + 1], r[i + 2], r[i + 3]]);
        let gv = f32x4::from([g[i], g[i + 1], g[i + 2], g[i + 3]]);
        let bv = f32x4::from([b[i], b[i + 1], b[i + 2], b[i + 3]]);

        let yv = kr * rv + kg * gv + kb * bv;
        let cbv = (bv - yv) * cb_scale + half;
        let crv = (rv - yv) * cr_scale + half;

        r[i..i + 4].copy_from_slice(&yv.to_array());
        g[i..i + 4].copy_from_slice(&cbv.to_array());
        b[i..i + 4].copy_from_slice(&crv.to_array());
    }
    for i in vec_end..n {
        let (y, cb, cr) = rgb_to_ycbcr(r[i], g[i], b[i]);
        r[i] = y;
        g[i] = cb;
        b[i] = cr;
    }
}

#[cfg(not(feature = "simd"))]
fn transform_row(r: &mut [f32], g: &mut [f32], b: &mut [f32]) {
    for i in 0..r.len() {
        let (y, cb, cr) = rgb_to_ycbcr(r[i], g[i], b[i]);
        r[i] = y;
        g[i] = cb;
        b[i] = cr;
    }
}

/// Replicates plane 0 into planes 1 and 2 for grayscale input.
pub fn replicate_gray(planes: &mut [PlaneF]) {
    debug_assert_eq!(planes.len(), 3);
    let (first, rest) = planes.split_at_mut(1);
    for plane in rest {
        plane.samples_mut().copy_from_slice(first[0].samples());
    }
}
