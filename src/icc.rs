//! ICC profile assembly and recovery.
//!
//! Profiles travel in chunked APP2 markers: each payload is the 12-byte
//! `"ICC_PROFILE\0"` signature, a 1-based chunk index, the total chunk
//! count, then up to [`MAX_ICC_BYTES_PER_MARKER`] profile bytes.
//!
//! The parse path reassembles the chain from the special-marker buffer. Any
//! malformed chain is treated as an absent profile: the encoder logs a
//! warning and proceeds with sRGB.

use log::warn;

use crate::consts::{ICC_PROFILE_SIGNATURE, MARKER_APP2, MAX_ICC_BYTES_PER_MARKER};
use crate::markers::{SpecialMarker, SpecialMarkers};
use crate::types::{ColorEncoding, TransferFunction};

/// Splits a profile into chunked APP2 markers, ready for insertion.
pub fn profile_to_app2_markers(icc: &[u8]) -> Vec<SpecialMarker> {
    if icc.is_empty() {
        return Vec::new();
    }
    let num_chunks = (icc.len() + MAX_ICC_BYTES_PER_MARKER - 1) / MAX_ICC_BYTES_PER_MARKER;
    let mut markers = Vec::with_capacity(num_chunks);
    for (i, chunk) in icc.chunks(MAX_ICC_BYTES_PER_MARKER).enumerate() {
        let mut payload = Vec::with_capacity(14 + chunk.len());
        payload.extend_from_slice(&ICC_PROFILE_SIGNATURE);
        payload.push((i + 1) as u8);
        payload.push(num_chunks as u8);
        payload.extend_from_slice(chunk);
        // Chunk sizing guarantees the payload fits a marker.
        markers.push(SpecialMarker::new(MARKER_APP2, &payload).expect("chunk fits marker"));
    }
    markers
}

/// Why a chunked ICC chain could not be reassembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IccChainError {
    /// A chunk payload is shorter than its index/total header.
    ChunkTooSmall,
    /// A chunk declared a zero total.
    ZeroTotal,
    /// Chunks disagree on the total count.
    MismatchedTotal,
    /// A chunk index is outside [1, total].
    InvalidIndex,
    /// The same index appeared twice.
    DuplicateChunk,
    /// An index is missing from the chain.
    MissingChunk,
    /// Chunks arrived out of order under strict ordering.
    InvalidOrder,
}

/// Reassembles the ICC profile carried by the APP2 special markers.
///
/// Returns `Ok(None)` when no ICC markers are present. With
/// `strict_order`, chunk `n` must be the `n`-th ICC marker encountered.
pub fn parse_icc_chain(
    markers: &SpecialMarkers,
    strict_order: bool,
) -> Result<Option<Vec<u8>>, IccChainError> {
    let mut chunks: Vec<Option<&[u8]>> = Vec::new();
    let mut expected_total = 0usize;
    let mut ordinal = 0usize;

    for marker in markers.iter() {
        if marker.kind() != MARKER_APP2 {
            continue;
        }
        let payload = marker.payload();
        if payload.len() < ICC_PROFILE_SIGNATURE.len()
            || payload[..ICC_PROFILE_SIGNATURE.len()] != ICC_PROFILE_SIGNATURE
        {
            continue;
        }
        let rest = &payload[ICC_PROFILE_SIGNATURE.len()..];
        if rest.len() < 2 {
            return Err(IccChainError::ChunkTooSmall);
        }
        let index = rest[0] as usize;
        let total = rest[1] as usize;
        ordinal += 1;

        if total == 0 {
            return Err(IccChainError::ZeroTotal);
        }
        if strict_order && index != ordinal {
            return Err(IccChainError::InvalidOrder);
        }
        if chunks.is_empty() {
            expected_total = total;
            chunks.resize(total, None);
        } else if total != expected_total {
            return Err(IccChainError::MismatchedTotal);
        }
        if index == 0 || index > expected_total {
            return Err(IccChainError::InvalidIndex);
        }
        if chunks[index - 1].is_some() {
            return Err(IccChainError::DuplicateChunk);
        }
        chunks[index - 1] = Some(&rest[2..]);
    }

    if chunks.is_empty() {
        return Ok(None);
    }

    let mut profile = Vec::new();
    for chunk in &chunks {
        match chunk {
            Some(data) => profile.extend_from_slice(data),
            None => return Err(IccChainError::MissingChunk),
        }
    }
    Ok(Some(profile))
}

/// Recovers the source color encoding from the special markers.
///
/// Falls back to sRGB (grayscale sRGB for single-channel input) on a
/// missing or malformed profile, logging a warning for the latter.
pub fn color_encoding_from_markers(markers: &SpecialMarkers, num_components: usize, strict_order: bool) -> ColorEncoding {
    let is_gray = num_components == 1;
    match parse_icc_chain(markers, strict_order) {
        Ok(Some(profile)) => color_encoding_from_profile(&profile, is_gray),
        Ok(None) => ColorEncoding::srgb(is_gray),
        Err(err) => {
            warn!("corrupted ICC marker chain ({err:?}); assuming sRGB");
            ColorEncoding::srgb(is_gray)
        }
    }
}

/// Sniffs the parts of an ICC profile the quantizer cares about: gray vs
/// color, and PQ/HLG transfer characteristics via the CICP tag.
#[must_use]
pub fn color_encoding_from_profile(profile: &[u8], input_is_gray: bool) -> ColorEncoding {
    let is_gray = input_is_gray || profile.get(16..20) == Some(b"GRAY".as_slice());
    ColorEncoding {
        is_gray,
        tf: transfer_from_cicp(profile).unwrap_or(TransferFunction::Srgb),
    }
}

/// Reads the transfer characteristics byte out of a `cicp` tag, if present.
///
/// CICP transfer codes: 16 = PQ (ST 2084), 18 = HLG, 8 = linear.
fn transfer_from_cicp(profile: &[u8]) -> Option<TransferFunction> {
    if profile.len() < 132 {
        return None;
    }
    let tag_count = u32::from_be_bytes(profile.get(128..132)?.try_into().ok()?) as usize;
    for i in 0..tag_count.min(64) {
        let entry = profile.get(132 + i * 12..132 + i * 12 + 12)?;
        if &entry[0..4] != b"cicp" {
            continue;
        }
        let offset = u32::from_be_bytes(entry[4..8].try_into().ok()?) as usize;
        // cicp tag data: signature(4) reserved(4) primaries, transfer, matrix, full-range
        let transfer = *profile.get(offset + 9)?;
        return Some(match transfer {
            16 => TransferFunction::Pq,
            18 => TransferFunction::Hlg,
            8 => TransferFunction::Linear,
            _ => TransferFunction::Srgb,
        });
    }
    None
}
