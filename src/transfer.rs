//! Transfer functions.
//!
//! Linearization of encoded samples for the XYB path. sRGB uses the IEC
//! 61966-2-1 piecewise curve; PQ and HLG follow BT.2100-2. HDR curves run
//! in f64 internally, matching their reference formulations.

use crate::types::TransferFunction;

/// sRGB decode (encoded to linear).
#[inline]
#[must_use]
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB encode (linear to encoded).
#[inline]
#[must_use]
pub fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

// PQ constants (SMPTE ST 2084)
const PQ_M1: f64 = 2610.0 / 16384.0;
const PQ_M2: f64 = (2523.0 / 4096.0) * 128.0;
const PQ_C1: f64 = 3424.0 / 4096.0;
const PQ_C2: f64 = (2413.0 / 4096.0) * 32.0;
const PQ_C3: f64 = (2392.0 / 4096.0) * 32.0;

/// PQ EOTF: encoded [0, 1] to display-linear [0, 1].
#[inline]
#[must_use]
pub fn pq_to_linear(e: f32) -> f32 {
    let e = e.clamp(0.0, 1.0) as f64;
    let ep = e.powf(1.0 / PQ_M2);
    let num = (ep - PQ_C1).max(0.0);
    let den = PQ_C2 - PQ_C3 * ep;
    (num / den).powf(1.0 / PQ_M1) as f32
}

// HLG constants (BT.2100-2)
const HLG_A: f64 = 0.178_832_77;
const HLG_B: f64 = 1.0 - 4.0 * HLG_A;
const HLG_C: f64 = 0.559_910_729_5;

/// HLG inverse OETF: encoded [0, 1] to scene-linear [0, 1].
#[inline]
#[must_use]
pub fn hlg_to_linear(e: f32) -> f32 {
    let e = e.max(0.0) as f64;
    let s = if e <= 0.5 {
        e * e / 3.0
    } else {
        (((e - HLG_C) / HLG_A).exp() + HLG_B) / 12.0
    };
    s as f32
}

/// Linearizes one encoded sample according to the transfer function.
#[inline]
#[must_use]
pub fn to_linear(tf: TransferFunction, v: f32) -> f32 {
    match tf {
        TransferFunction::Srgb => srgb_to_linear(v),
        TransferFunction::Linear => v,
        TransferFunction::Pq => pq_to_linear(v),
        TransferFunction::Hlg => hlg_to_linear(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_roundtrip() {
        for i in 0..=100 {
            let v = i as f32 / 100.0;
            let back = linear_to_srgb(srgb_to_linear(v));
            assert!((back - v).abs() < 1e-5, "failed for {v}");
        }
    }

    #[test]
    fn test_srgb_anchors() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        // 50% encoded sRGB is about 21.4% linear.
        assert!((srgb_to_linear(0.5) - 0.2140).abs() < 1e-3);
    }

    #[test]
    fn test_pq_monotonic_and_bounded() {
        let mut prev = -1.0f32;
        for i in 0..=64 {
            let v = pq_to_linear(i as f32 / 64.0);
            assert!(v >= prev);
            assert!((0.0..=1.0 + 1e-6).contains(&v));
            prev = v;
        }
        assert!(pq_to_linear(0.0).abs() < 1e-6);
        assert!((pq_to_linear(1.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_hlg_breakpoint_continuous() {
        let below = hlg_to_linear(0.5 - 1e-5);
        let above = hlg_to_linear(0.5 + 1e-5);
        assert!((below - above).abs() < 1e-3);
        // Encoded 1.0 maps to scene 1.0.
        assert!((hlg_to_linear(1.0) - 1.0).abs() < 1e-3);
    }
}
