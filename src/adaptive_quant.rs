//! Adaptive quantization field.
//!
//! Produces one positive multiplier per 8x8 block from the luminance plane.
//! Busy blocks (high local variance and high-frequency energy) can absorb
//! coarser quantization, so they receive lower field values; flat blocks sit
//! at the top of the clamp range. The field's maximum feeds the AC scale
//! derivation in [`crate::quant`], and each block's value modulates the
//! quantizer in [`crate::coeffs`].
//!
//! With adaptive quantization disabled the field is a constant
//! [`FIELD_BASE`], which makes the per-block modulation collapse to 1.0.

use crate::error::Result;
use crate::image::PlaneF;

/// Field value used when adaptive quantization is disabled, and the upper
/// clamp when it is enabled.
pub const FIELD_BASE: f32 = 0.575;

/// Weight of the standard-deviation term in the masking estimate.
const MASK_SD_WEIGHT: f32 = 0.7;

/// Weight of the gradient-energy term in the masking estimate.
const MASK_HF_WEIGHT: f32 = 0.3;

/// Gain applied to the masking estimate before compression.
const MASK_STRENGTH: f32 = 14.0;

/// Fills a constant field for the non-adaptive path.
pub fn constant_quant_field(xsize_blocks: usize, ysize_blocks: usize) -> Result<PlaneF> {
    PlaneF::filled(xsize_blocks, ysize_blocks, FIELD_BASE)
}

/// Computes the per-block quant field from the luminance plane.
///
/// `luma` must already be padded to the block grid; samples are in [0, 1].
/// The result is clamped to a distance-dependent range: larger distances
/// permit deeper masking.
pub fn compute_quant_field(luma: &PlaneF, distance: f32) -> Result<PlaneF> {
    let xsize_blocks = luma.width() / 8;
    let ysize_blocks = luma.height() / 8;
    let mut field = PlaneF::new(xsize_blocks, ysize_blocks)?;

    // Deeper modulation is admissible as the target distance grows.
    let depth = (0.5 + 0.6 * distance).min(2.5);
    let lo = FIELD_BASE / (1.0 + depth);
    let hi = FIELD_BASE;

    for by in 0..ysize_blocks {
        for bx in 0..xsize_blocks {
            let masking = block_masking(luma, bx, by);
            let raw = FIELD_BASE / (1.0 + MASK_STRENGTH * masking);
            field.row_mut(by)[bx] = raw.clamp(lo, hi);
        }
    }
    Ok(field)
}

/// Local variance plus gradient-energy estimate for one block.
fn block_masking(luma: &PlaneF, bx: usize, by: usize) -> f32 {
    let x0 = bx * 8;
    let y0 = by * 8;

    let mut sum = 0.0f32;
    let mut sum_sq = 0.0f32;
    for y in 0..8 {
        let row = &luma.row(y0 + y)[x0..x0 + 8];
        for &v in row {
            sum += v;
            sum_sq += v * v;
        }
    }
    let mean = sum / 64.0;
    let var = (sum_sq / 64.0 - mean * mean).max(0.0);

    // Mean absolute horizontal/vertical gradient inside the block.
    let mut grad = 0.0f32;
    for y in 0..8 {
        let row = &luma.row(y0 + y)[x0..x0 + 8];
        for x in 0..7 {
            grad += (row[x + 1] - row[x]).abs();
        }
    }
    for y in 0..7 {
        let row0 = &luma.row(y0 + y)[x0..x0 + 8];
        let row1 = &luma.row(y0 + y + 1)[x0..x0 + 8];
        for x in 0..8 {
            grad += (row1[x] - row0[x]).abs();
        }
    }
    let hf = grad / 112.0;

    MASK_SD_WEIGHT * var.sqrt() + MASK_HF_WEIGHT * hf
}

/// Initial DC quantization divisor for a target distance.
///
/// The DC scale of the quant matrices is `global_scale / initial_quant_dc`.
/// Non-linearity kicks in below `K_DC_MUL`; the multiplier is 1.0 at
/// distance 1.0.
#[must_use]
pub fn initial_quant_dc(distance: f32) -> f32 {
    const K_DC_MUL: f32 = 0.3;
    const K_DC_POW: f32 = 0.57;
    const K_DC_QUANT: f32 = 1.095_924_05;
    let d = distance.max(0.01);
    let compressed = K_DC_MUL * (d / K_DC_MUL).powf(K_DC_POW);
    let target_dc = compressed.clamp(0.5 * d, d);
    K_DC_QUANT / target_dc
}

/// Strength of the zero-bias modulation for one block.
///
/// Low field values (strong masking) push more small coefficients to zero.
#[inline]
#[must_use]
pub fn field_to_bias_strength(field_value: f32) -> f32 {
    (0.6 / field_value - 1.0).max(0.0)
}
