//! Forward 8x8 DCT primitive.
//!
//! Separable float DCT-II with the standard JPEG normalization: a flat
//! block of value `v` produces `DC = 8v`, matching what conformant decoders
//! invert. The transform is treated as a black box by the rest of the
//! pipeline.

use crate::consts::{DCT_BLOCK_SIZE, DCT_SIZE};

/// cos((2x + 1) u PI / 16) for u, x in 0..8, row-major by u.
#[rustfmt::skip]
const COS_TABLE: [f32; 64] = [
    1.000_000_0,  1.000_000_0,  1.000_000_0,  1.000_000_0,  1.000_000_0,  1.000_000_0,  1.000_000_0,  1.000_000_0,
    0.980_785_3,  0.831_469_6,  0.555_570_2,  0.195_090_3, -0.195_090_3, -0.555_570_2, -0.831_469_6, -0.980_785_3,
    0.923_879_5,  0.382_683_4, -0.382_683_4, -0.923_879_5, -0.923_879_5, -0.382_683_4,  0.382_683_4,  0.923_879_5,
    0.831_469_6, -0.195_090_3, -0.980_785_3, -0.555_570_2,  0.555_570_2,  0.980_785_3,  0.195_090_3, -0.831_469_6,
    0.707_106_8, -0.707_106_8, -0.707_106_8,  0.707_106_8,  0.707_106_8, -0.707_106_8, -0.707_106_8,  0.707_106_8,
    0.555_570_2, -0.980_785_3,  0.195_090_3,  0.831_469_6, -0.831_469_6, -0.195_090_3,  0.980_785_3, -0.555_570_2,
    0.382_683_4, -0.923_879_5,  0.923_879_5, -0.382_683_4, -0.382_683_4,  0.923_879_5, -0.923_879_5,  0.382_683_4,
    0.195_090_3, -0.555_570_2,  0.831_469_6, -0.980_785_3,  0.980_785_3, -0.831_469_6,  0.555_570_2, -0.195_090_3,
];

const INV_SQRT2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// 1-D DCT-II over 8 samples with the C(u)/2 normalization.
#[inline]
fn dct1d(input: &[f32; DCT_SIZE], output: &mut [f32; DCT_SIZE]) {
    for u in 0..DCT_SIZE {
        let mut sum = 0.0f32;
        let cos_row = &COS_TABLE[u * DCT_SIZE..(u + 1) * DCT_SIZE];
        for x in 0..DCT_SIZE {
            sum += input[x] * cos_row[x];
        }
        let cu = if u == 0 { INV_SQRT2 } else { 1.0 };
        output[u] = 0.5 * cu * sum;
    }
}

/// Forward 8x8 DCT on level-shifted samples.
///
/// Output is in natural (row-major) order.
pub fn forward_dct_8x8(block: &[f32; DCT_BLOCK_SIZE]) -> [f32; DCT_BLOCK_SIZE] {
    let mut tmp = [0.0f32; DCT_BLOCK_SIZE];
    let mut row_in = [0.0f32; DCT_SIZE];
    let mut row_out = [0.0f32; DCT_SIZE];

    // Rows
    for y in 0..DCT_SIZE {
        row_in.copy_from_slice(&block[y * DCT_SIZE..(y + 1) * DCT_SIZE]);
        dct1d(&row_in, &mut row_out);
        tmp[y * DCT_SIZE..(y + 1) * DCT_SIZE].copy_from_slice(&row_out);
    }

    // Columns
    let mut output = [0.0f32; DCT_BLOCK_SIZE];
    for x in 0..DCT_SIZE {
        for y in 0..DCT_SIZE {
            row_in[y] = tmp[y * DCT_SIZE + x];
        }
        dct1d(&row_in, &mut row_out);
        for v in 0..DCT_SIZE {
            output[v * DCT_SIZE + x] = row_out[v];
        }
    }
    output
}
