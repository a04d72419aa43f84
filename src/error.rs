//! Error types for the encoder.

use thiserror::Error;

/// Result type for zenli operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during JPEG encoding.
///
/// Configuration problems are detected eagerly when the session is created;
/// everything else surfaces from [`crate::Encoder::finish`]. A malformed ICC
/// marker chain is *not* an error: the encoder logs a warning and falls back
/// to sRGB.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid image dimensions (zero or above the JPEG limit).
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Width provided
        width: u32,
        /// Height provided
        height: u32,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Mutually inconsistent configuration settings.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the inconsistency
        reason: &'static str,
    },

    /// Unsupported component sampling factors.
    #[error("invalid sampling factor {factor} for component {component}: {reason}")]
    InvalidSampling {
        /// Component index
        component: usize,
        /// Offending factor
        factor: u8,
        /// Description of the rule violated
        reason: &'static str,
    },

    /// Input row has the wrong size for the declared format.
    #[error("invalid row size: expected {expected} bytes, got {actual}")]
    InvalidRowSize {
        /// Expected size in bytes
        expected: usize,
        /// Actual size in bytes
        actual: usize,
    },

    /// A marker payload the caller supplied cannot be represented.
    #[error("invalid marker 0x{kind:02X}: {reason}")]
    InvalidMarker {
        /// Marker kind byte
        kind: u8,
        /// Description of the issue
        reason: &'static str,
    },

    /// The scan script does not cover the spectrum correctly.
    #[error("invalid scan script: {0}")]
    InvalidScanScript(String),

    /// `finish` was called before all declared scanlines were received.
    #[error("missing scanlines: received {received} of {expected}")]
    MissingScanlines {
        /// Rows received so far
        received: u32,
        /// Rows declared in the configuration
        expected: u32,
    },

    /// A size computation overflowed.
    #[error("size calculation overflow while {context}")]
    SizeOverflow {
        /// Context where the overflow occurred
        context: &'static str,
    },

    /// Huffman construction violated an internal invariant.
    ///
    /// This indicates a bug in the encoder, not bad input.
    #[error("internal error: {reason}")]
    Internal {
        /// Description
        reason: &'static str,
    },

    /// The output sink failed.
    #[error("I/O error: {reason}")]
    Io {
        /// Stringified source error
        reason: String,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
            reason: "width cannot be zero",
        };
        assert!(err.to_string().contains("width cannot be zero"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io { .. }));
    }
}
