//! DCT and coefficient quantization.
//!
//! Walks each component's block grid, applies the forward DCT to
//! level-shifted samples, and quantizes with the component's table
//! modulated by the block-local quant field. Coefficients are stored in
//! zigzag order with the DC value kept absolute; DC differencing happens
//! later, inside the serial scan walker, which keeps this stage pure per
//! block.

use crate::adaptive_quant::field_to_bias_strength;
use crate::consts::{DCT_BLOCK_SIZE, DCT_SIZE, JPEG_ZIGZAG_ORDER};
use crate::dct::forward_dct_8x8;
use crate::error::Result;
use crate::image::PlaneF;
use crate::quant::ZeroBias;
use crate::types::{CoeffBlock, Component, QuantTable};

/// Quantized coefficients of one component.
///
/// The grid is padded to the MCU multiple; [`crate::types::Component`]
/// carries the smaller T.81 coded-block counts used by non-interleaved
/// scans.
#[derive(Debug, Clone)]
pub struct ComponentCoeffs {
    /// Padded block-grid width
    pub width_in_blocks: usize,
    /// Padded block-grid height
    pub height_in_blocks: usize,
    /// Blocks in row-major order, coefficients in zigzag order
    pub blocks: Vec<CoeffBlock>,
}

impl ComponentCoeffs {
    /// Block accessor.
    #[inline]
    #[must_use]
    pub fn block(&self, bx: usize, by: usize) -> &CoeffBlock {
        &self.blocks[by * self.width_in_blocks + bx]
    }
}

/// Computes quantized DCT coefficients for every component.
///
/// `planes` are the padded full-resolution component planes; subsampled
/// components are box-downsampled by their factor first. `field` is the
/// full-resolution block grid quant field and `field_max` its maximum.
pub fn compute_coefficients(
    planes: &[PlaneF],
    components: &[Component],
    tables: &[QuantTable],
    zero_bias: &[ZeroBias],
    field: &PlaneF,
    field_max: f32,
    max_samp: u8,
) -> Result<Vec<ComponentCoeffs>> {
    let mut out = Vec::with_capacity(components.len());
    for (c, comp) in components.iter().enumerate() {
        let factor = (max_samp / comp.h_samp) as usize;
        let table = &tables[comp.quant_idx as usize];
        let plane;
        let plane_ref = if factor == 1 {
            &planes[c]
        } else {
            plane = planes[c].downsample(factor)?;
            &plane
        };
        out.push(quantize_component(
            plane_ref,
            comp,
            table,
            &zero_bias[c],
            field,
            field_max,
            factor,
        ));
    }
    Ok(out)
}

fn quantize_component(
    plane: &PlaneF,
    comp: &Component,
    table: &QuantTable,
    zero_bias: &ZeroBias,
    field: &PlaneF,
    field_max: f32,
    factor: usize,
) -> ComponentCoeffs {
    let width_in_blocks = plane.width() / DCT_SIZE;
    let height_in_blocks = plane.height() / DCT_SIZE;
    debug_assert!(comp.width_in_blocks <= width_in_blocks);
    debug_assert!(comp.height_in_blocks <= height_in_blocks);

    let mut blocks = Vec::with_capacity(width_in_blocks * height_in_blocks);
    let mut samples = [0.0f32; DCT_BLOCK_SIZE];

    for by in 0..height_in_blocks {
        for bx in 0..width_in_blocks {
            extract_block(plane, bx, by, &mut samples);
            let dct = forward_dct_8x8(&samples);

            let qf = field_at(field, bx, by, factor);
            let qf_ratio = qf / field_max;
            let strength = field_to_bias_strength(qf);

            blocks.push(quantize_block(&dct, table, zero_bias, qf_ratio, strength));
        }
    }

    ComponentCoeffs {
        width_in_blocks,
        height_in_blocks,
        blocks,
    }
}

/// Pulls one block of samples, mapping [0, 1] to the level-shifted
/// [-128, 127] range the DCT works in.
#[inline]
fn extract_block(plane: &PlaneF, bx: usize, by: usize, out: &mut [f32; DCT_BLOCK_SIZE]) {
    let x0 = bx * DCT_SIZE;
    let y0 = by * DCT_SIZE;
    for y in 0..DCT_SIZE {
        let row = &plane.row(y0 + y)[x0..x0 + DCT_SIZE];
        for x in 0..DCT_SIZE {
            out[y * DCT_SIZE + x] = row[x] * 255.0 - 128.0;
        }
    }
}

/// Quant-field value covering a component block: the mean over the
/// `factor * factor` full-resolution cells it spans.
#[inline]
fn field_at(field: &PlaneF, bx: usize, by: usize, factor: usize) -> f32 {
    if factor == 1 {
        return field.get(bx, by);
    }
    let mut sum = 0.0f32;
    for dy in 0..factor {
        let row = field.row(by * factor + dy);
        for dx in 0..factor {
            sum += row[bx * factor + dx];
        }
    }
    sum / (factor * factor) as f32
}

/// Quantizes one block of natural-order DCT coefficients into zigzag order.
///
/// DC uses a unit multiplier; AC is modulated by the block's normalized
/// field value, and magnitudes under the zero-bias threshold collapse to
/// zero.
fn quantize_block(
    dct: &[f32; DCT_BLOCK_SIZE],
    table: &QuantTable,
    zero_bias: &ZeroBias,
    qf_ratio: f32,
    strength: f32,
) -> CoeffBlock {
    let mut out = [0i16; DCT_BLOCK_SIZE];
    for k in 0..DCT_BLOCK_SIZE {
        let zz = JPEG_ZIGZAG_ORDER[k] as usize;
        let qm = table.values[zz] as f32;
        if k == 0 {
            out[0] = (dct[0] / qm).round() as i16;
        } else {
            let qval = dct[k] * qf_ratio / qm;
            if qval.abs() >= zero_bias.threshold(k, strength) {
                // Baseline Huffman coding carries AC magnitudes up to 1023.
                out[zz] = (qval.round() as i32).clamp(-1023, 1023) as i16;
            }
        }
    }
    out
}
