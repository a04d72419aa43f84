//! Output sinks.
//!
//! The encoder writes the finished bitstream through a [`Sink`], the
//! crate's replacement for libjpeg's destination-manager callbacks. A sink
//! is finalized on every exit path of `finish`, including error exits.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Abstract byte destination for the encoded stream.
pub trait Sink {
    /// Appends bytes to the destination.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Pushes buffered bytes toward the destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Terminates the destination. Called exactly once per encode, on both
    /// success and error paths.
    fn finalize(&mut self) -> Result<()> {
        self.flush()
    }
}

/// In-memory sink backed by a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct MemorySink {
    bytes: Vec<u8>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the sink, returning the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Sink for MemorySink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.bytes.extend_from_slice(buf);
        Ok(())
    }
}

/// Buffered file sink.
#[derive(Debug)]
pub struct FileSink {
    inner: BufWriter<File>,
}

impl FileSink {
    /// Creates (truncating) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            inner: BufWriter::new(File::create(path)?),
        })
    }
}

impl Sink for FileSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_accumulates() {
        let mut sink = MemorySink::new();
        sink.write(&[0xFF, 0xD8]).unwrap();
        sink.write(&[0xFF, 0xD9]).unwrap();
        sink.finalize().unwrap();
        assert_eq!(sink.into_bytes(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }
}
