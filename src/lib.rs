//! # zenli - Perceptually Tuned JPEG Encoder Core
//!
//! zenli produces standards-conforming baseline and progressive JPEG
//! bitstreams (ITU-T T.81) with quality controlled by a single perceptual
//! `distance` scalar, in the manner of jpegli.
//!
//! ## Key Features
//!
//! - **Distance-based quality**: one scalar drives the DC/AC quantization
//!   scales through perceptually fitted curves; a libjpeg-style quality
//!   value maps onto it for convenience
//! - **Adaptive quantization**: a per-block quant field derived from local
//!   image statistics shifts bits away from regions that mask error
//! - **XYB mode**: encoding in the perceptually uniform XYB color space
//!   with an embedded ICC profile for standard decoders
//! - **Optimized Huffman coding**: per-scan length-limited tables built
//!   from the scan's own symbol statistics
//! - **Progressive scan scripts**: spectral selection and successive
//!   approximation passes selected by a progressive level
//!
//! ## Usage
//!
//! ```rust
//! use zenli::{Encoder, EncoderConfig};
//!
//! let pixels = vec![128u8; 16 * 16 * 3];
//! let rows: Vec<&[u8]> = pixels.chunks(16 * 3).collect();
//!
//! let mut config = EncoderConfig::new(16, 16, 3).with_distance(1.0);
//! config.progressive_level = 0;
//! let mut encoder = Encoder::new(config)?;
//! encoder.write_scanlines(&rows)?;
//! let jpeg = encoder.encode_to_vec()?;
//! assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
//! # Ok::<(), zenli::Error>(())
//! ```

// Core types and constants
pub mod consts;
pub mod error;
pub mod types;

// Buffers and I/O seams
pub mod image;
pub mod ingest;
pub mod markers;
pub mod sink;

// Transforms
pub mod color;
pub mod dct;
pub mod transfer;
pub mod xyb;

// Quantization
pub mod adaptive_quant;
pub mod coeffs;
pub mod quant;

// Entropy coding
pub mod bitstream;
pub mod entropy;
pub mod huffman;
pub mod scan_script;

// ICC color management
pub mod icc;

// Main encoder
pub mod encode;

// Re-exports for convenience
pub use encode::{Encoder, EncoderConfig};
pub use error::{Error, Result};
pub use sink::{FileSink, MemorySink, Sink};
pub use types::{DataType, Endianness, QuantMode};
