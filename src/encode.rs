//! Encoder session and pipeline orchestration.
//!
//! Configuration is a plain struct handed over once; the session object
//! owns the per-frame mutable state (scanline cursor, planes, special
//! markers) and drives the pipeline at `finish`: color transform, quant
//! field, quant matrices, DCT and quantization, scan scripting, per-scan
//! Huffman optimization, and marker serialization.

use log::debug;

use crate::adaptive_quant::{compute_quant_field, constant_quant_field};
use crate::bitstream::{
    write_dht, write_dqt, write_dri, write_eoi, write_sof, write_soi, write_sos,
    write_special_markers,
};
use crate::coeffs::compute_coefficients;
use crate::color::{replicate_gray, rgb_planes_to_ycbcr};
use crate::consts::{quality_to_distance, DCT_SIZE, MAX_COMPONENTS, XYB_ICC_PROFILE};
use crate::entropy::{encode_scan, table_of, BitstreamSink, HistogramSink};
use crate::error::{Error, Result};
use crate::huffman::HuffmanCode;
use crate::icc::{color_encoding_from_markers, profile_to_app2_markers};
use crate::image::{validate_dimensions, PlaneF};
use crate::ingest::ingest_row;
use crate::markers::{SpecialMarker, SpecialMarkers};
use crate::quant::{compute_scale_factors, make_quant_table, ZeroBias};
use crate::scan_script::{default_scan_script, validate_scan_script};
use crate::sink::{MemorySink, Sink};
use crate::types::{Component, DataType, Endianness, QuantMode, ScanInfo};

/// Encoder configuration; every option is fixed before the session starts.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of input channels (1 or 3)
    pub num_components: usize,
    /// Target perceptual distance; lower is higher quality
    pub distance: f32,
    /// Encode in the XYB color space (requires 3 RGB channels)
    pub xyb_mode: bool,
    /// Derive the quant field from image content instead of a constant
    pub use_adaptive_quantization: bool,
    /// Use the Annex-K base tables instead of the perceptual ones
    pub use_std_tables: bool,
    /// Scan-script selector: 0 is baseline, 1 and 2+ are progressive
    pub progressive_level: u32,
    /// MCUs between restart markers; 0 disables them
    pub restart_interval: u16,
    /// Clamp quantization entries to [1, 255]
    pub force_baseline: bool,
    /// Input sample type
    pub data_type: DataType,
    /// Input byte order for multi-byte samples
    pub endianness: Endianness,
    /// Per-component sampling factors (square; ignored in XYB mode)
    pub sampling: [u8; MAX_COMPONENTS],
    /// Enforce in-order ICC chunk indices when recovering a profile
    pub strict_icc_order: bool,
}

impl EncoderConfig {
    /// A configuration with the library defaults for the given geometry.
    #[must_use]
    pub fn new(width: u32, height: u32, num_components: usize) -> Self {
        Self {
            width,
            height,
            num_components,
            distance: 1.0,
            xyb_mode: false,
            use_adaptive_quantization: true,
            use_std_tables: false,
            progressive_level: 2,
            restart_interval: 0,
            force_baseline: true,
            data_type: DataType::U8,
            endianness: Endianness::Native,
            sampling: [1; MAX_COMPONENTS],
            strict_icc_order: false,
        }
    }

    /// Sets the distance from a libjpeg-style quality value (1-100).
    #[must_use]
    pub fn with_quality(mut self, quality: i32) -> Self {
        self.distance = quality_to_distance(quality);
        self
    }

    /// Sets the target distance directly.
    #[must_use]
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }
}

/// Encoding session.
///
/// Lifecycle: [`Encoder::new`] -> [`Encoder::write_scanlines`] (markers may
/// be added at any point before finishing) -> [`Encoder::finish`].
pub struct Encoder {
    config: EncoderConfig,
    components: Vec<Component>,
    max_samp: u8,
    max_shift: u8,
    planes: Vec<PlaneF>,
    next_scanline: u32,
    markers: SpecialMarkers,
    finished: bool,
}

impl Encoder {
    /// Validates the configuration and sets up per-frame state.
    pub fn new(config: EncoderConfig) -> Result<Self> {
        validate_dimensions(config.width, config.height)?;
        if config.num_components != 1 && config.num_components != 3 {
            return Err(Error::InvalidConfig {
                reason: "only 1 or 3 components are supported",
            });
        }
        if config.xyb_mode && config.num_components != 3 {
            return Err(Error::InvalidConfig {
                reason: "only RGB input is supported in XYB mode",
            });
        }
        if !config.distance.is_finite() || config.distance < 0.0 {
            return Err(Error::InvalidConfig {
                reason: "distance must be non-negative",
            });
        }

        // XYB fixes the sampling layout: full-resolution X and Y, B at
        // quarter resolution.
        let mut sampling: Vec<u8> = if config.xyb_mode {
            vec![2, 2, 1]
        } else {
            config.sampling[..config.num_components].to_vec()
        };
        for (c, &f) in sampling.iter().enumerate() {
            if !matches!(f, 1 | 2 | 4 | 8) {
                return Err(Error::InvalidSampling {
                    component: c,
                    factor: f,
                    reason: "sampling factors must be 1, 2, 4 or 8",
                });
            }
        }
        // Factors sharing a common divisor describe the same subsampling;
        // normalize so the smallest is 1 and the MCU geometry stays exact.
        let min_samp = *sampling.iter().min().expect("component list non-empty");
        for f in &mut sampling {
            *f /= min_samp;
        }
        let max_samp = *sampling.iter().max().expect("component list non-empty");

        let mut max_shift = 0u8;
        for (c, &f) in sampling.iter().enumerate() {
            let ratio = max_samp / f;
            if !ratio.is_power_of_two() {
                return Err(Error::InvalidSampling {
                    component: c,
                    factor: f,
                    reason: "sampling ratios must be powers of two",
                });
            }
            max_shift = max_shift.max(ratio.trailing_zeros() as u8);
        }

        let block_px = DCT_SIZE << max_shift;
        let xsize_blocks = ((config.width as usize + block_px - 1) / block_px) << max_shift;
        let ysize_blocks = ((config.height as usize + block_px - 1) / block_px) << max_shift;

        // Coded block counts follow T.81: component size is the image size
        // scaled by the sampling ratio, rounded up, then split into blocks.
        let coded_blocks = |px: u32, f: u8| -> usize {
            let comp_px = (px as usize * f as usize + max_samp as usize - 1) / max_samp as usize;
            (comp_px + DCT_SIZE - 1) / DCT_SIZE
        };
        let components = sampling
            .iter()
            .enumerate()
            .map(|(c, &f)| Component {
                id: if config.xyb_mode {
                    [b'R', b'G', b'B'][c]
                } else {
                    c as u8 + 1
                },
                h_samp: f,
                v_samp: f,
                quant_idx: c as u8,
                width_in_blocks: coded_blocks(config.width, f),
                height_in_blocks: coded_blocks(config.height, f),
            })
            .collect();

        // Three planes even for grayscale: the gray channel is replicated
        // before the color transform.
        let padded_w = xsize_blocks * DCT_SIZE;
        let padded_h = ysize_blocks * DCT_SIZE;
        let planes = (0..3)
            .map(|_| PlaneF::new(padded_w, padded_h))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            components,
            max_samp,
            max_shift,
            planes,
            next_scanline: 0,
            markers: SpecialMarkers::new(),
            finished: false,
        })
    }

    /// Rows accepted so far.
    #[must_use]
    pub fn next_scanline(&self) -> u32 {
        self.next_scanline
    }

    /// Appends interleaved rows. Rows beyond the declared height are
    /// silently dropped; the number of rows consumed is returned.
    pub fn write_scanlines(&mut self, rows: &[&[u8]]) -> Result<usize> {
        let remaining = (self.config.height - self.next_scanline) as usize;
        let take = rows.len().min(remaining);
        for (i, row) in rows[..take].iter().enumerate() {
            let y = (self.next_scanline as usize) + i;
            ingest_row(
                row,
                y,
                self.config.width as usize,
                &mut self.planes[..self.config.num_components],
                self.config.data_type,
                self.config.endianness,
            )?;
        }
        self.next_scanline += take as u32;
        Ok(take)
    }

    /// Appends a user APPn/COM marker, emitted between SOI and DQT.
    pub fn add_marker(&mut self, kind: u8, payload: &[u8]) -> Result<()> {
        self.markers.push(SpecialMarker::new(kind, payload)?);
        Ok(())
    }

    /// Embeds an ICC profile as a chunked APP2 chain, replacing any
    /// existing one.
    pub fn embed_icc_profile(&mut self, profile: &[u8]) {
        self.markers.upsert_app2(profile_to_app2_markers(profile));
    }

    /// Encodes into an in-memory buffer.
    pub fn encode_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut sink = MemorySink::new();
        self.finish(&mut sink)?;
        Ok(sink.into_bytes())
    }

    /// Runs the pipeline and writes the bitstream.
    ///
    /// The sink is finalized on every exit path; on error the stream is
    /// truncated mid-frame and should be discarded.
    pub fn finish<S: Sink>(&mut self, sink: &mut S) -> Result<()> {
        if self.finished {
            return Err(Error::InvalidConfig {
                reason: "finish was already called on this session",
            });
        }
        self.finished = true;
        let result = self.finish_inner(sink);
        let finalized = sink.finalize();
        result.and(finalized)
    }

    fn finish_inner<S: Sink>(&mut self, sink: &mut S) -> Result<()> {
        let config = &self.config;
        if self.next_scanline < config.height {
            return Err(Error::MissingScanlines {
                received: self.next_scanline,
                expected: config.height,
            });
        }

        let quant_mode = if config.xyb_mode {
            QuantMode::Xyb
        } else if config.use_std_tables {
            QuantMode::Std
        } else {
            QuantMode::YCbCr
        };

        // Input color encoding comes from any embedded ICC chain; the XYB
        // profile is upserted afterwards so the output advertises XYB.
        let encoding =
            color_encoding_from_markers(&self.markers, config.num_components, config.strict_icc_order);
        if config.xyb_mode {
            self.markers
                .upsert_app2(profile_to_app2_markers(&XYB_ICC_PROFILE));
        }

        if config.num_components == 1 {
            replicate_gray(&mut self.planes);
        }
        if config.xyb_mode {
            crate::xyb::rgb_planes_to_scaled_xyb(&mut self.planes, encoding);
        } else {
            rgb_planes_to_ycbcr(&mut self.planes);
        }
        for plane in &mut self.planes {
            plane.pad_from(config.width as usize, config.height as usize);
        }

        // Quant field over the luminance plane (channel 1 in XYB).
        let luma = if config.xyb_mode { 1 } else { 0 };
        let field = if config.use_adaptive_quantization {
            compute_quant_field(&self.planes[luma], config.distance)?
        } else {
            constant_quant_field(
                self.planes[0].width() / DCT_SIZE,
                self.planes[0].height() / DCT_SIZE,
            )?
        };
        let (field_min, field_max) = field.min_max();
        debug!(
            "quant field range [{field_min:.4}, {field_max:.4}], distance {}",
            config.distance
        );

        let scales = compute_scale_factors(quant_mode, config.distance, encoding.tf, field_max);
        let tables: Vec<_> = (0..config.num_components)
            .map(|c| make_quant_table(quant_mode, c, scales, config.force_baseline))
            .collect();
        let zero_bias: Vec<ZeroBias> = (0..config.num_components)
            .map(|c| match quant_mode {
                QuantMode::YCbCr => ZeroBias::for_ycbcr(config.distance, c),
                _ => ZeroBias::disabled(),
            })
            .collect();

        let coeffs = compute_coefficients(
            &self.planes[..config.num_components],
            &self.components,
            &tables,
            &zero_bias,
            &field,
            field_max,
            self.max_samp,
        )?;

        let scans = default_scan_script(
            config.progressive_level,
            config.num_components,
            self.max_shift,
        );
        validate_scan_script(&scans, config.num_components)?;

        // Marker stream.
        write_soi(sink)?;
        write_special_markers(sink, &self.markers)?;
        write_dqt(sink, &tables)?;
        write_sof(
            sink,
            config.progressive_level > 0,
            config.width,
            config.height,
            &self.components,
        )?;
        if config.restart_interval > 0 {
            write_dri(sink, config.restart_interval)?;
        }

        let mut written: [[Option<HuffmanCode>; 2]; 2] = Default::default();
        for scan in &scans {
            let (dht_defs, dc_tables, ac_tables) =
                optimize_scan_tables(&coeffs, &self.components, scan, config.restart_interval)?;

            let mut new_defs: Vec<(u8, u8, &HuffmanCode)> = Vec::new();
            for (class, id, code) in &dht_defs {
                let slot = &mut written[*class as usize][*id as usize];
                if slot.as_ref() != Some(code) {
                    *slot = Some(code.clone());
                    new_defs.push((*class, *id, code));
                }
            }
            write_dht(sink, &new_defs)?;

            write_sos(sink, scan, &self.components)?;

            let mut bits = BitstreamSink::new(dc_tables, ac_tables);
            encode_scan(&coeffs, &self.components, scan, config.restart_interval, &mut bits)?;
            sink.write(&bits.into_bytes())?;
        }

        write_eoi(sink)?;
        Ok(())
    }
}

/// Runs the statistics pass for one scan and builds its Huffman tables.
///
/// Returns the DHT definitions (class, id, code) plus the encode tables for
/// the bitstream pass.
#[allow(clippy::type_complexity)]
fn optimize_scan_tables(
    coeffs: &[crate::coeffs::ComponentCoeffs],
    components: &[Component],
    scan: &ScanInfo,
    restart_interval: u16,
) -> Result<(
    Vec<(u8, u8, HuffmanCode)>,
    [Option<crate::huffman::EncodeTable>; 2],
    [Option<crate::huffman::EncodeTable>; 2],
)> {
    let mut hist = HistogramSink::new();
    encode_scan(coeffs, components, scan, restart_interval, &mut hist)?;

    let needs_dc = scan.is_dc() && !scan.is_refinement();
    let needs_ac = scan.se > 0;

    let mut ids_used = [false; 2];
    for &comp in scan.components() {
        ids_used[table_of(comp as usize)] = true;
    }

    let mut defs = Vec::new();
    let mut dc_tables: [Option<crate::huffman::EncodeTable>; 2] = [None, None];
    let mut ac_tables: [Option<crate::huffman::EncodeTable>; 2] = [None, None];

    for id in 0..2 {
        if !ids_used[id] {
            continue;
        }
        if needs_dc {
            let code = hist.dc[id].build()?;
            dc_tables[id] = Some(code.encode_table()?);
            defs.push((0u8, id as u8, code));
        }
        if needs_ac {
            let code = hist.ac[id].build()?;
            ac_tables[id] = Some(code.encode_table()?);
            defs.push((1u8, id as u8, code));
        }
    }
    Ok((defs, dc_tables, ac_tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(Encoder::new(EncoderConfig::new(0, 8, 1)).is_err());
        assert!(Encoder::new(EncoderConfig::new(8, 8, 2)).is_err());
        assert!(Encoder::new(EncoderConfig::new(8, 8, 4)).is_err());

        let mut config = EncoderConfig::new(8, 8, 1);
        config.xyb_mode = true;
        assert!(matches!(
            Encoder::new(config),
            Err(Error::InvalidConfig { .. })
        ));

        let config = EncoderConfig::new(8, 8, 3).with_distance(-1.0);
        assert!(Encoder::new(config).is_err());

        let mut config = EncoderConfig::new(8, 8, 3);
        config.sampling = [3, 1, 1];
        assert!(matches!(
            Encoder::new(config),
            Err(Error::InvalidSampling { .. })
        ));
    }

    #[test]
    fn test_sampling_normalization() {
        let mut config = EncoderConfig::new(16, 16, 3);
        config.sampling = [2, 2, 2];
        let enc = Encoder::new(config).unwrap();
        assert!(enc.components.iter().all(|c| c.h_samp == 1));
        assert_eq!(enc.max_shift, 0);
    }

    #[test]
    fn test_subsampled_geometry() {
        let mut config = EncoderConfig::new(20, 12, 3);
        config.sampling = [2, 1, 1];
        let enc = Encoder::new(config).unwrap();
        assert_eq!(enc.max_shift, 1);
        // Coded T.81 block counts: luma covers 20x12, chroma 10x6.
        assert_eq!(enc.components[0].width_in_blocks, 3);
        assert_eq!(enc.components[0].height_in_blocks, 2);
        assert_eq!(enc.components[1].width_in_blocks, 2);
        assert_eq!(enc.components[1].height_in_blocks, 1);
        // The planes themselves pad to the 16-pixel MCU multiple.
        assert_eq!(enc.planes[0].width(), 32);
        assert_eq!(enc.planes[0].height(), 16);
    }

    #[test]
    fn test_xyb_forces_layout() {
        let mut config = EncoderConfig::new(16, 16, 3);
        config.xyb_mode = true;
        config.sampling = [1, 1, 1];
        let enc = Encoder::new(config).unwrap();
        assert_eq!(enc.components[0].id, b'R');
        assert_eq!(enc.components[0].h_samp, 2);
        assert_eq!(enc.components[2].h_samp, 1);
    }

    #[test]
    fn test_scanline_cursor_drops_excess() {
        let mut config = EncoderConfig::new(4, 2, 1);
        config.progressive_level = 0;
        let mut enc = Encoder::new(config).unwrap();
        let row: &[u8] = &[128u8; 4];
        assert_eq!(enc.write_scanlines(&[row, row, row]).unwrap(), 2);
        assert_eq!(enc.write_scanlines(&[row]).unwrap(), 0);
        assert_eq!(enc.next_scanline(), 2);
    }

    #[test]
    fn test_finish_requires_all_rows() {
        let mut config = EncoderConfig::new(4, 4, 1);
        config.progressive_level = 0;
        let mut enc = Encoder::new(config).unwrap();
        let row: &[u8] = &[0u8; 4];
        enc.write_scanlines(&[row]).unwrap();
        assert!(matches!(
            enc.encode_to_vec(),
            Err(Error::MissingScanlines {
                received: 1,
                expected: 4
            })
        ));
    }

    #[test]
    fn test_finish_twice_rejected() {
        let mut config = EncoderConfig::new(4, 1, 1);
        config.progressive_level = 0;
        let mut enc = Encoder::new(config).unwrap();
        enc.write_scanlines(&[&[0u8; 4][..]]).unwrap();
        enc.encode_to_vec().unwrap();
        assert!(enc.encode_to_vec().is_err());
    }

    #[test]
    fn test_quality_maps_to_distance() {
        let config = EncoderConfig::new(8, 8, 3).with_quality(90);
        assert!((config.distance - 1.0).abs() < 1e-5);
        let config = EncoderConfig::new(8, 8, 3).with_quality(100);
        assert!((config.distance - 0.01).abs() < 1e-6);
    }
}
