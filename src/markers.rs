//! Special (APPn/COM) marker buffering.
//!
//! User markers and the ICC chain are held pre-assembled, in insertion
//! order, and emitted verbatim between SOI and the first table marker.
//! Each stored marker is a complete segment: `FF kind len_hi len_lo
//! payload...`.

use crate::consts::{MARKER_APP0, MARKER_APP15, MARKER_APP2, MARKER_COM, MAX_BYTES_IN_MARKER};
use crate::error::{Error, Result};

/// One pre-assembled marker segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialMarker {
    bytes: Vec<u8>,
}

impl SpecialMarker {
    /// Assembles a marker from its kind byte and raw payload (the payload
    /// excludes the two length bytes).
    pub fn new(kind: u8, payload: &[u8]) -> Result<Self> {
        if kind != MARKER_COM && !(MARKER_APP0..=MARKER_APP15).contains(&kind) {
            return Err(Error::InvalidMarker {
                kind,
                reason: "only APP0..APP15 and COM markers are supported",
            });
        }
        if payload.len() + 2 > MAX_BYTES_IN_MARKER {
            return Err(Error::InvalidMarker {
                kind,
                reason: "payload exceeds the 65531-byte marker budget",
            });
        }
        let total = payload.len() + 2;
        let mut bytes = Vec::with_capacity(total + 2);
        bytes.push(0xFF);
        bytes.push(kind);
        bytes.push((total >> 8) as u8);
        bytes.push(total as u8);
        bytes.extend_from_slice(payload);
        Ok(Self { bytes })
    }

    /// Marker kind byte.
    #[must_use]
    pub fn kind(&self) -> u8 {
        self.bytes[1]
    }

    /// Payload after the length bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[4..]
    }

    /// Complete segment bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Ordered collection of special markers.
#[derive(Debug, Clone, Default)]
pub struct SpecialMarkers {
    markers: Vec<SpecialMarker>,
}

impl SpecialMarkers {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a marker at the end.
    pub fn push(&mut self, marker: SpecialMarker) {
        self.markers.push(marker);
    }

    /// Replaces the first APP2 marker in place, or appends when none exists.
    ///
    /// Remaining APP2 markers are dropped; the ICC chain owns APP2.
    pub fn upsert_app2(&mut self, replacement: Vec<SpecialMarker>) {
        let mut out = Vec::with_capacity(self.markers.len() + replacement.len());
        let mut inserted = false;
        for marker in self.markers.drain(..) {
            if marker.kind() == MARKER_APP2 {
                if !inserted {
                    out.extend(replacement.iter().cloned());
                    inserted = true;
                }
            } else {
                out.push(marker);
            }
        }
        if !inserted {
            out.extend(replacement);
        }
        self.markers = out;
    }

    /// Markers in insertion order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, SpecialMarker> {
        self.markers.iter()
    }

    /// Number of stored markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// True when no markers are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
