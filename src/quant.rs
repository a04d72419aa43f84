//! Quantization matrix assembly and zero-bias parameters.
//!
//! A matrix is selected per component from one of three base families
//! (XYB, perceptual YCbCr, Annex-K standard), scaled by DC/AC scales
//! derived from the target distance and the quant field's dynamic range,
//! then rounded and clamped into DQT range.

use crate::adaptive_quant::initial_quant_dc;
use crate::consts::{
    distance_to_linear_quality, BASE_QUANT_MATRIX_STD, BASE_QUANT_MATRIX_XYB,
    BASE_QUANT_MATRIX_YCBCR, DCT_BLOCK_SIZE, GLOBAL_SCALE_HLG_MUL, GLOBAL_SCALE_PQ_MUL,
    GLOBAL_SCALE_STD, GLOBAL_SCALE_XYB, GLOBAL_SCALE_YCBCR,
};
use crate::types::{QuantMode, QuantTable, TransferFunction};

/// DC and AC multipliers applied to the base matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    /// Multiplier for the DC entry
    pub dc: f32,
    /// Multiplier for the 63 AC entries
    pub ac: f32,
}

/// Derives the DC/AC scales for a frame.
///
/// `qf_max` is the maximum of the adaptive quant field (the constant 0.575
/// when adaptive quantization is off). PQ input rescales the global scale by
/// 0.4 and HLG by 0.5; XYB mode is immune since its input is already
/// perceptually mapped.
#[must_use]
pub fn compute_scale_factors(
    mode: QuantMode,
    distance: f32,
    tf: TransferFunction,
    qf_max: f32,
) -> ScaleFactors {
    let mut global_scale = match mode {
        QuantMode::Xyb => GLOBAL_SCALE_XYB,
        QuantMode::YCbCr => GLOBAL_SCALE_YCBCR,
        QuantMode::Std => GLOBAL_SCALE_STD,
    };
    if mode != QuantMode::Xyb {
        match tf {
            TransferFunction::Pq => global_scale *= GLOBAL_SCALE_PQ_MUL,
            TransferFunction::Hlg => global_scale *= GLOBAL_SCALE_HLG_MUL,
            _ => {}
        }
    }

    if mode == QuantMode::Std {
        let linear_scale = 0.01 * distance_to_linear_quality(distance);
        ScaleFactors {
            dc: global_scale * linear_scale,
            ac: global_scale * linear_scale,
        }
    } else {
        ScaleFactors {
            dc: global_scale / initial_quant_dc(distance),
            ac: global_scale * distance / qf_max,
        }
    }
}

/// Base matrix row (natural order) for one component.
fn base_matrix(mode: QuantMode, component: usize) -> &'static [f32] {
    match mode {
        QuantMode::Xyb => {
            let c = component.min(2);
            &BASE_QUANT_MATRIX_XYB[c * DCT_BLOCK_SIZE..(c + 1) * DCT_BLOCK_SIZE]
        }
        QuantMode::YCbCr => {
            let c = component.min(2);
            &BASE_QUANT_MATRIX_YCBCR[c * DCT_BLOCK_SIZE..(c + 1) * DCT_BLOCK_SIZE]
        }
        QuantMode::Std => {
            let c = usize::from(component > 0);
            &BASE_QUANT_MATRIX_STD[c * DCT_BLOCK_SIZE..(c + 1) * DCT_BLOCK_SIZE]
        }
    }
}

/// Builds the quantization table for one component.
///
/// Entries are clamped to [1, 255] with `force_baseline`, [1, 32767]
/// otherwise; the result is in zigzag order.
#[must_use]
pub fn make_quant_table(
    mode: QuantMode,
    component: usize,
    scales: ScaleFactors,
    force_baseline: bool,
) -> QuantTable {
    let base = base_matrix(mode, component);
    let max_value = if force_baseline { 255 } else { 32767 };

    let mut natural = [0u16; DCT_BLOCK_SIZE];
    for (k, (out, &b)) in natural.iter_mut().zip(base.iter()).enumerate() {
        let scale = if k == 0 { scales.dc } else { scales.ac };
        let q = (b * scale).round();
        *out = (q as i64).clamp(1, max_value) as u16;
    }
    QuantTable::from_natural_order(&natural)
}

// =============================================================================
// Zero-bias rounding parameters
// =============================================================================

/// Distance at which the high-quality zero-bias table applies fully.
const ZERO_BIAS_DIST_HQ: f32 = 1.0;
/// Distance at which the low-quality zero-bias table applies fully.
const ZERO_BIAS_DIST_LQ: f32 = 3.0;

/// Zero-bias offset for AC coefficients, per YCbCr component.
pub const ZERO_BIAS_OFFSET_YCBCR_AC: [f32; 3] = [0.59082, 0.58146, 0.57988];

/// Zero-bias multipliers for YCbCr at low quality (distance >= 3.0).
/// 3 components x 64 coefficients.
#[rustfmt::skip]
pub const ZERO_BIAS_MUL_YCBCR_LQ: [f32; 192] = [
    // c = 0 (Y)
    0.0000, 0.0568, 0.3880, 0.6190, 0.6190, 0.4490, 0.4490, 0.6187,
    0.0568, 0.5829, 0.6189, 0.6190, 0.6190, 0.7190, 0.6190, 0.6189,
    0.3880, 0.6189, 0.6190, 0.6190, 0.6190, 0.6190, 0.6187, 0.6100,
    0.6190, 0.6190, 0.6190, 0.6190, 0.5890, 0.3839, 0.7160, 0.6190,
    0.6190, 0.6190, 0.6190, 0.5890, 0.6190, 0.3880, 0.5860, 0.4790,
    0.4490, 0.7190, 0.6190, 0.3839, 0.3880, 0.6190, 0.6190, 0.6190,
    0.4490, 0.6190, 0.6187, 0.7160, 0.5860, 0.6190, 0.6204, 0.6190,
    0.6187, 0.6189, 0.6100, 0.6190, 0.4790, 0.6190, 0.6190, 0.3480,
    // c = 1 (Cb)
    0.0000, 1.1640, 0.9373, 1.1319, 0.8016, 0.9136, 1.1530, 0.9430,
    1.1640, 0.9188, 0.9160, 1.1980, 1.1830, 0.9758, 0.9430, 0.9430,
    0.9373, 0.9160, 0.8430, 1.1720, 0.7083, 0.9430, 0.9430, 0.9430,
    1.1319, 1.1980, 1.1720, 1.1490, 0.8547, 0.9430, 0.9430, 0.9430,
    0.8016, 1.1830, 0.7083, 0.8547, 0.9430, 0.9430, 0.9430, 0.9430,
    0.9136, 0.9758, 0.9430, 0.9430, 0.9430, 0.9430, 0.9430, 0.9430,
    1.1530, 0.9430, 0.9430, 0.9430, 0.9430, 0.9430, 0.9430, 0.9480,
    0.9430, 0.9430, 0.9430, 0.9430, 0.9430, 0.9430, 0.9480, 0.9430,
    // c = 2 (Cr)
    0.0000, 1.3190, 0.4308, 0.4460, 0.0661, 0.0660, 0.2660, 0.2960,
    1.3190, 0.3280, 0.3093, 0.0750, 0.0505, 0.1594, 0.3060, 0.2113,
    0.4308, 0.3093, 0.3060, 0.1182, 0.0500, 0.3060, 0.3915, 0.2426,
    0.4460, 0.0750, 0.1182, 0.0512, 0.0500, 0.2130, 0.3930, 0.1590,
    0.0661, 0.0505, 0.0500, 0.0500, 0.3055, 0.3360, 0.5148, 0.5403,
    0.0660, 0.1594, 0.3060, 0.2130, 0.3360, 0.5060, 0.5874, 0.3060,
    0.2660, 0.3060, 0.3915, 0.3930, 0.5148, 0.5874, 0.3060, 0.3060,
    0.2960, 0.2113, 0.2426, 0.1590, 0.5403, 0.3060, 0.3060, 0.3060,
];

/// Zero-bias multipliers for YCbCr at high quality (distance <= 1.0).
/// 3 components x 64 coefficients.
#[rustfmt::skip]
pub const ZERO_BIAS_MUL_YCBCR_HQ: [f32; 192] = [
    // c = 0 (Y)
    0.0000, 0.0044, 0.2521, 0.6547, 0.8161, 0.6130, 0.8841, 0.8155,
    0.0044, 0.6831, 0.6553, 0.6295, 0.7848, 0.7843, 0.8474, 0.7836,
    0.2521, 0.6553, 0.7834, 0.7829, 0.8161, 0.8072, 0.7743, 0.9242,
    0.6547, 0.6295, 0.7829, 0.8654, 0.7829, 0.6986, 0.7818, 0.7726,
    0.8161, 0.7848, 0.8161, 0.7829, 0.7471, 0.7827, 0.7843, 0.7653,
    0.6130, 0.7843, 0.8072, 0.6986, 0.7827, 0.7848, 0.9508, 0.7653,
    0.8841, 0.8474, 0.7743, 0.7818, 0.7843, 0.9508, 0.7839, 0.8437,
    0.8155, 0.7836, 0.9242, 0.7726, 0.7653, 0.7653, 0.8437, 0.7819,
    // c = 1 (Cb)
    0.0000, 1.0816, 1.0556, 1.2876, 1.1554, 1.1567, 1.8851, 0.5488,
    1.0816, 1.1537, 1.1850, 1.0712, 1.1671, 2.0719, 1.0544, 1.4764,
    1.0556, 1.1850, 1.2870, 1.1981, 1.8181, 1.2618, 1.0564, 1.1191,
    1.2876, 1.0712, 1.1981, 1.4753, 2.0609, 1.0564, 1.2645, 1.0564,
    1.1554, 1.1671, 1.8181, 2.0609, 0.7324, 1.1163, 0.8464, 1.0564,
    1.1567, 2.0719, 1.2618, 1.0564, 1.1163, 1.0040, 1.0564, 1.0564,
    1.8851, 1.0544, 1.0564, 1.2645, 0.8464, 1.0564, 1.0564, 1.0564,
    0.5488, 1.4764, 1.1191, 1.0564, 1.0564, 1.0564, 1.0564, 1.0564,
    // c = 2 (Cr)
    0.0000, 0.5392, 0.6659, 0.8968, 0.6829, 0.6328, 0.5802, 0.4836,
    0.5392, 0.6746, 0.6760, 0.6102, 0.6015, 0.6958, 0.7327, 0.4897,
    0.6659, 0.6760, 0.6957, 0.6543, 0.4396, 0.6330, 0.7081, 0.2583,
    0.8968, 0.6102, 0.6543, 0.5913, 0.6457, 0.5828, 0.5139, 0.3565,
    0.6829, 0.6015, 0.4396, 0.6457, 0.5633, 0.4263, 0.6371, 0.5949,
    0.6328, 0.6958, 0.6330, 0.5828, 0.4263, 0.2847, 0.2909, 0.6629,
    0.5802, 0.7327, 0.7081, 0.5139, 0.6371, 0.2909, 0.6644, 0.6644,
    0.4836, 0.4897, 0.2583, 0.3565, 0.5949, 0.6629, 0.6644, 0.6644,
];

/// Zero-bias rounding parameters for one component.
///
/// Small AC coefficients whose quantized magnitude falls under
/// `offset[k] + mul[k] * bias_strength` are forced to zero instead of being
/// rounded, trading invisible detail for bits.
#[derive(Debug, Clone)]
pub struct ZeroBias {
    /// Per-coefficient multiplier (natural order)
    pub mul: [f32; DCT_BLOCK_SIZE],
    /// Per-coefficient offset (natural order)
    pub offset: [f32; DCT_BLOCK_SIZE],
}

impl ZeroBias {
    /// Neutral parameters: behaves exactly like `round()`.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            mul: [0.0; DCT_BLOCK_SIZE],
            offset: [0.5; DCT_BLOCK_SIZE],
        }
    }

    /// YCbCr parameters for a component, blending the HQ and LQ tables by
    /// distance (HQ at <= 1.0, LQ at >= 3.0, linear in between).
    #[must_use]
    pub fn for_ycbcr(distance: f32, component: usize) -> Self {
        let c = component.min(2);
        let mix_lq = ((distance - ZERO_BIAS_DIST_HQ) / (ZERO_BIAS_DIST_LQ - ZERO_BIAS_DIST_HQ))
            .clamp(0.0, 1.0);
        let mix_hq = 1.0 - mix_lq;

        let mut mul = [0.0f32; DCT_BLOCK_SIZE];
        let mut offset = [0.5f32; DCT_BLOCK_SIZE];
        for k in 1..DCT_BLOCK_SIZE {
            let lq = ZERO_BIAS_MUL_YCBCR_LQ[c * DCT_BLOCK_SIZE + k];
            let hq = ZERO_BIAS_MUL_YCBCR_HQ[c * DCT_BLOCK_SIZE + k];
            mul[k] = mix_lq * lq + mix_hq * hq;
            offset[k] = ZERO_BIAS_OFFSET_YCBCR_AC[c];
        }
        // DC rounds normally.
        offset[0] = 0.5;
        Self { mul, offset }
    }

    /// Threshold for coefficient `k` at a given bias strength.
    #[inline]
    #[must_use]
    pub fn threshold(&self, k: usize, strength: f32) -> f32 {
        self.offset[k] + self.mul[k] * strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_baseline_clamps_to_255() {
        let scales = ScaleFactors { dc: 100.0, ac: 100.0 };
        let table = make_quant_table(QuantMode::YCbCr, 1, scales, true);
        for &v in &table.values {
            assert!((1..=255).contains(&v));
        }
        assert!(table.is_baseline());
    }

    #[test]
    fn test_extended_range_without_baseline() {
        let scales = ScaleFactors { dc: 400.0, ac: 400.0 };
        let table = make_quant_table(QuantMode::YCbCr, 1, scales, false);
        assert!(table.values.iter().any(|&v| v > 255));
        assert!(table.values.iter().all(|&v| v <= 32767));
    }

    #[test]
    fn test_entries_never_zero() {
        let scales = ScaleFactors { dc: 1e-6, ac: 1e-6 };
        for mode in [QuantMode::Xyb, QuantMode::YCbCr, QuantMode::Std] {
            for c in 0..3 {
                let table = make_quant_table(mode, c, scales, true);
                assert!(table.values.iter().all(|&v| v >= 1));
            }
        }
    }

    #[test]
    fn test_higher_distance_coarser_tables() {
        for mode in [QuantMode::YCbCr, QuantMode::Std] {
            let near = compute_scale_factors(mode, 1.0, TransferFunction::Srgb, 0.575);
            let far = compute_scale_factors(mode, 6.0, TransferFunction::Srgb, 0.575);
            let sum = |s: ScaleFactors| -> u32 {
                make_quant_table(mode, 0, s, true)
                    .values
                    .iter()
                    .map(|&v| u32::from(v))
                    .sum()
            };
            assert!(sum(far) > sum(near), "mode {mode:?}");
        }
    }

    #[test]
    fn test_hdr_rescale() {
        let srgb = compute_scale_factors(QuantMode::YCbCr, 1.0, TransferFunction::Srgb, 0.575);
        let pq = compute_scale_factors(QuantMode::YCbCr, 1.0, TransferFunction::Pq, 0.575);
        let hlg = compute_scale_factors(QuantMode::YCbCr, 1.0, TransferFunction::Hlg, 0.575);
        assert!((pq.ac - srgb.ac * 0.4).abs() < 1e-6);
        assert!((hlg.ac - srgb.ac * 0.5).abs() < 1e-6);
        // XYB ignores the input transfer function.
        let xyb_srgb = compute_scale_factors(QuantMode::Xyb, 1.0, TransferFunction::Srgb, 0.575);
        let xyb_pq = compute_scale_factors(QuantMode::Xyb, 1.0, TransferFunction::Pq, 0.575);
        assert_eq!(xyb_srgb, xyb_pq);
    }

    #[test]
    fn test_std_mode_uses_linear_quality() {
        // At distance 1.0 (quality 90) the Annex-K scale factor is 20,
        // so the K.1 DC entry 16 lands near 16 * 0.2 = 3.2.
        let scales = compute_scale_factors(QuantMode::Std, 1.0, TransferFunction::Srgb, 0.575);
        let table = make_quant_table(QuantMode::Std, 0, scales, true);
        let dc = table.values[0];
        assert!((2..=5).contains(&dc), "DC entry {dc}");
    }

    #[test]
    fn test_ac_scale_tracks_quant_field_max() {
        let a = compute_scale_factors(QuantMode::YCbCr, 1.0, TransferFunction::Srgb, 0.575);
        let b = compute_scale_factors(QuantMode::YCbCr, 1.0, TransferFunction::Srgb, 0.2875);
        assert!((b.ac - 2.0 * a.ac).abs() < 1e-6);
        assert_eq!(a.dc, b.dc);
    }

    #[test]
    fn test_zero_bias_blend() {
        let hq = ZeroBias::for_ycbcr(0.5, 0);
        assert!((hq.mul[1] - ZERO_BIAS_MUL_YCBCR_HQ[1]).abs() < 1e-6);
        let lq = ZeroBias::for_ycbcr(5.0, 0);
        assert!((lq.mul[1] - ZERO_BIAS_MUL_YCBCR_LQ[1]).abs() < 1e-6);
        let mid = ZeroBias::for_ycbcr(2.0, 0);
        let expected = 0.5 * ZERO_BIAS_MUL_YCBCR_HQ[1] + 0.5 * ZERO_BIAS_MUL_YCBCR_LQ[1];
        assert!((mid.mul[1] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_zero_bias_dc_neutral() {
        for c in 0..3 {
            let zb = ZeroBias::for_ycbcr(2.0, c);
            assert_eq!(zb.mul[0], 0.0);
            assert_eq!(zb.offset[0], 0.5);
        }
        let off = ZeroBias::disabled();
        assert!(off.mul.iter().all(|&m| m == 0.0));
        assert!(off.offset.iter().all(|&o| o == 0.5));
    }
}
