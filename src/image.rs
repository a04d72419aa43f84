//! Planar float image buffers.
//!
//! Planes are allocated at their padded size up front (a multiple of
//! `8 << max_shift` in both dimensions) and carry the logical size
//! separately. Padding rows and columns replicate the last valid sample so
//! the DCT never sees uninitialized memory.

use crate::error::{Error, Result};

/// A single float plane.
#[derive(Debug, Clone)]
pub struct PlaneF {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl PlaneF {
    /// Allocates a zero-filled plane, checking the size computation.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(Error::SizeOverflow {
                context: "allocating image plane",
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| Error::Io {
            reason: format!("allocation of {len} floats failed"),
        })?;
        data.resize(len, 0.0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocates a plane filled with a constant.
    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self> {
        let mut plane = Self::new(width, height)?;
        plane.data.fill(value);
        Ok(plane)
    }

    /// Plane width in samples.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Plane height in samples.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Immutable view of row `y`.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Mutable view of row `y`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    /// Sample accessor.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Flat access to all samples.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat access.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Minimum and maximum over all samples.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }

    /// Replicates the sample at (`logical_w` - 1, `logical_h` - 1) edges into
    /// the padding region.
    pub fn pad_from(&mut self, logical_w: usize, logical_h: usize) {
        if logical_w == 0 || logical_h == 0 {
            return;
        }
        for y in 0..logical_h {
            let row = self.row_mut(y);
            let edge = row[logical_w - 1];
            for v in &mut row[logical_w..] {
                *v = edge;
            }
        }
        for y in logical_h..self.height {
            let (src, dst) = self.data.split_at_mut(y * self.width);
            let last = &src[(logical_h - 1) * self.width..logical_h * self.width];
            dst[..self.width].copy_from_slice(last);
        }
    }

    /// Box-downsamples by an integral factor in both dimensions.
    ///
    /// The plane dimensions must be divisible by `factor`.
    pub fn downsample(&self, factor: usize) -> Result<PlaneF> {
        debug_assert_eq!(self.width % factor, 0);
        debug_assert_eq!(self.height % factor, 0);
        let new_w = self.width / factor;
        let new_h = self.height / factor;
        let mut out = PlaneF::new(new_w, new_h)?;
        let inv = 1.0 / (factor * factor) as f32;
        for y in 0..new_h {
            for x in 0..new_w {
                let mut sum = 0.0f32;
                for dy in 0..factor {
                    let row = self.row(y * factor + dy);
                    for dx in 0..factor {
                        sum += row[x * factor + dx];
                    }
                }
                out.row_mut(y)[x] = sum * inv;
            }
        }
        Ok(out)
    }
}

/// Validates frame dimensions against the format limits.
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    use crate::consts::MAX_DIMENSION;
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions {
            width,
            height,
            reason: "dimensions cannot be zero",
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidDimensions {
            width,
            height,
            reason: "exceeds JPEG maximum dimension (65500)",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_replicates_edges() {
        let mut plane = PlaneF::new(8, 8).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                plane.row_mut(y)[x] = (y * 10 + x) as f32;
            }
        }
        plane.pad_from(5, 5);
        // Columns 5..8 replicate column 4.
        assert_eq!(plane.get(7, 2), plane.get(4, 2));
        // Rows 5..8 replicate row 4 (after its own column padding).
        assert_eq!(plane.get(3, 7), plane.get(3, 4));
        assert_eq!(plane.get(7, 7), plane.get(4, 4));
    }

    #[test]
    fn test_downsample_box_average() {
        let mut plane = PlaneF::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                plane.row_mut(y)[x] = (y * 4 + x) as f32;
            }
        }
        let half = plane.downsample(2).unwrap();
        assert_eq!(half.width(), 2);
        // Top-left 2x2 block: (0 + 1 + 4 + 5) / 4 = 2.5
        assert!((half.get(0, 0) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_min_max() {
        let mut plane = PlaneF::filled(3, 3, 1.0).unwrap();
        plane.row_mut(1)[1] = -2.0;
        plane.row_mut(2)[0] = 7.0;
        assert_eq!(plane.min_max(), (-2.0, 7.0));
    }

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(1, 1).is_ok());
        assert!(validate_dimensions(0, 5).is_err());
        assert!(validate_dimensions(65501, 5).is_err());
    }
}
