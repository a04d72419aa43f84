//! XYB color space conversion.
//!
//! XYB is the perceptually uniform color space from JPEG XL. The encoding
//! chain is: encoded RGB -> linear RGB (per the source transfer function)
//! -> opsin absorbance matrix plus bias -> signed cube root -> (X, Y, B)
//! -> a fixed affine scaling into the quantizer's expected sample range.

use crate::consts::{
    SCALED_XYB_OFFSET, SCALED_XYB_SCALE, XYB_NEG_BIAS_CBRT, XYB_OPSIN_ABSORBANCE_BIAS,
    XYB_OPSIN_ABSORBANCE_MATRIX,
};
use crate::image::PlaneF;
use crate::transfer::to_linear;
use crate::types::ColorEncoding;

/// Signed cube root.
#[inline]
fn mixed_cbrt(v: f32) -> f32 {
    if v < 0.0 {
        -(-v).cbrt()
    } else {
        v.cbrt()
    }
}

/// Converts one linear RGB triple to XYB.
#[must_use]
pub fn linear_rgb_to_xyb(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let m = &XYB_OPSIN_ABSORBANCE_MATRIX;
    let bias = XYB_OPSIN_ABSORBANCE_BIAS;

    let opsin_l = m[0] * r + m[1] * g + m[2] * b + bias;
    let opsin_m = m[3] * r + m[4] * g + m[5] * b + bias;
    let opsin_s = m[6] * r + m[7] * g + m[8] * b + bias;

    let l = mixed_cbrt(opsin_l) + XYB_NEG_BIAS_CBRT;
    let mm = mixed_cbrt(opsin_m) + XYB_NEG_BIAS_CBRT;
    let s = mixed_cbrt(opsin_s) + XYB_NEG_BIAS_CBRT;

    (0.5 * (l - mm), 0.5 * (l + mm), s)
}

/// Maps raw XYB into the quantizer's sample range.
///
/// B borrows Y before scaling, matching the jpegli `ScaleXYBRow` layout.
#[inline]
#[must_use]
pub fn scale_xyb(x: f32, y: f32, b: f32) -> (f32, f32, f32) {
    let scaled_b = (b - y + SCALED_XYB_OFFSET[2]) * SCALED_XYB_SCALE[2];
    let scaled_x = (x + SCALED_XYB_OFFSET[0]) * SCALED_XYB_SCALE[0];
    let scaled_y = (y + SCALED_XYB_OFFSET[1]) * SCALED_XYB_SCALE[1];
    (scaled_x, scaled_y, scaled_b)
}

/// Transforms the three RGB planes to scaled XYB in place.
///
/// `encoding` supplies the transfer function used to linearize the encoded
/// samples first (sRGB when no profile was recovered).
pub fn rgb_planes_to_scaled_xyb(planes: &mut [PlaneF], encoding: ColorEncoding) {
    debug_assert_eq!(planes.len(), 3);
    let (rp, rest) = planes.split_at_mut(1);
    let (gp, bp) = rest.split_at_mut(1);
    let (rp, gp, bp) = (&mut rp[0], &mut gp[0], &mut bp[0]);

    let height = rp.height();
    for y in 0..height {
        let rrow = rp.row_mut(y);
        let grow = gp.row_mut(y);
        let brow = bp.row_mut(y);
        for i in 0..rrow.len() {
            let lr = to_linear(encoding.tf, rrow[i]);
            let lg = to_linear(encoding.tf, grow[i]);
            let lb = to_linear(encoding.tf, brow[i]);
            let (x, yy, b) = linear_rgb_to_xyb(lr, lg, lb);
            let (sx, sy, sb) = scale_xyb(x, yy, b);
            rrow[i] = sx;
            grow[i] = sy;
            brow[i] = sb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::srgb_to_linear;

    #[test]
    fn test_gray_has_zero_x() {
        for v in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
            let lin = srgb_to_linear(v);
            let (x, _y, _b) = linear_rgb_to_xyb(lin, lin, lin);
            assert!(x.abs() < 1e-4, "X should be ~0 for gray, got {x}");
        }
    }

    #[test]
    fn test_y_monotonic_in_gray() {
        let mut prev = f32::NEG_INFINITY;
        for i in 0..=20 {
            let lin = srgb_to_linear(i as f32 / 20.0);
            let (_x, y, _b) = linear_rgb_to_xyb(lin, lin, lin);
            assert!(y > prev);
            prev = y;
        }
    }

    #[test]
    fn test_black_maps_to_origin() {
        let (x, y, b) = linear_rgb_to_xyb(0.0, 0.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        assert!(b.abs() < 1e-6);
    }

    #[test]
    fn test_scaled_range_plausible() {
        // Scaled XYB of full-range sRGB input should stay roughly in [0, 1]
        // so the *255 sample mapping is shared with YCbCr.
        for (r, g, b) in [
            (0.0f32, 0.0, 0.0),
            (1.0, 1.0, 1.0),
            (1.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
        ] {
            let (lr, lg, lb) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
            let (x, y, bb) = linear_rgb_to_xyb(lr, lg, lb);
            let (sx, sy, sb) = scale_xyb(x, y, bb);
            for v in [sx, sy, sb] {
                assert!((-0.3..=1.3).contains(&v), "scaled value {v} out of range");
            }
        }
    }
}
