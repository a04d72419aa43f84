//! Marker segment serialization.
//!
//! Byte-exact emission of the JPEG marker stream through a [`Sink`]:
//! SOI, special markers, DQT, SOF0/SOF2, DHT, SOS, DRI and EOI. Entropy
//! data is produced by [`crate::entropy`] and appended between SOS and the
//! next marker.

use crate::consts::{
    MARKER_DHT, MARKER_DQT, MARKER_DRI, MARKER_EOI, MARKER_SOF0, MARKER_SOF2, MARKER_SOI,
    MARKER_SOS,
};
use crate::entropy::table_of;
use crate::error::Result;
use crate::huffman::HuffmanCode;
use crate::markers::SpecialMarkers;
use crate::sink::Sink;
use crate::types::{Component, QuantTable, ScanInfo};

fn write_marker<S: Sink>(sink: &mut S, kind: u8) -> Result<()> {
    sink.write(&[0xFF, kind])
}

fn write_segment<S: Sink>(sink: &mut S, kind: u8, payload: &[u8]) -> Result<()> {
    let len = payload.len() + 2;
    debug_assert!(len <= 65535);
    sink.write(&[0xFF, kind, (len >> 8) as u8, len as u8])?;
    sink.write(payload)
}

/// SOI marker.
pub fn write_soi<S: Sink>(sink: &mut S) -> Result<()> {
    write_marker(sink, MARKER_SOI)
}

/// EOI marker.
pub fn write_eoi<S: Sink>(sink: &mut S) -> Result<()> {
    write_marker(sink, MARKER_EOI)
}

/// Pre-assembled special markers, in insertion order.
pub fn write_special_markers<S: Sink>(sink: &mut S, markers: &SpecialMarkers) -> Result<()> {
    for marker in markers.iter() {
        sink.write(marker.as_bytes())?;
    }
    Ok(())
}

/// One DQT segment per table.
///
/// Entries are already in zigzag order; a table with any entry above 255
/// uses the 16-bit representation.
pub fn write_dqt<S: Sink>(sink: &mut S, tables: &[QuantTable]) -> Result<()> {
    for (idx, table) in tables.iter().enumerate() {
        let mut payload = Vec::with_capacity(1 + 128);
        if table.is_baseline() {
            payload.push(idx as u8);
            for &v in &table.values {
                payload.push(v as u8);
            }
        } else {
            payload.push(0x10 | idx as u8);
            for &v in &table.values {
                payload.push((v >> 8) as u8);
                payload.push(v as u8);
            }
        }
        write_segment(sink, MARKER_DQT, &payload)?;
    }
    Ok(())
}

/// Frame header: SOF0 for baseline, SOF2 for progressive.
pub fn write_sof<S: Sink>(
    sink: &mut S,
    progressive: bool,
    width: u32,
    height: u32,
    components: &[Component],
) -> Result<()> {
    let marker = if progressive { MARKER_SOF2 } else { MARKER_SOF0 };
    let mut payload = Vec::with_capacity(6 + components.len() * 3);
    payload.push(8); // sample precision
    payload.push((height >> 8) as u8);
    payload.push(height as u8);
    payload.push((width >> 8) as u8);
    payload.push(width as u8);
    payload.push(components.len() as u8);
    for comp in components {
        payload.push(comp.id);
        payload.push((comp.h_samp << 4) | comp.v_samp);
        payload.push(comp.quant_idx);
    }
    write_segment(sink, marker, &payload)
}

/// One DHT segment per table definition.
///
/// `defs` holds `(class, id, code)` triples; class 0 is DC, 1 is AC.
pub fn write_dht<S: Sink>(sink: &mut S, defs: &[(u8, u8, &HuffmanCode)]) -> Result<()> {
    for &(class, id, code) in defs {
        let mut payload = Vec::with_capacity(17 + code.values.len());
        payload.push((class << 4) | id);
        payload.extend_from_slice(&code.bits);
        payload.extend_from_slice(&code.values);
        write_segment(sink, MARKER_DHT, &payload)?;
    }
    Ok(())
}

/// Restart interval definition.
pub fn write_dri<S: Sink>(sink: &mut S, interval: u16) -> Result<()> {
    write_segment(sink, MARKER_DRI, &interval.to_be_bytes())
}

/// Scan header for one scan.
pub fn write_sos<S: Sink>(sink: &mut S, scan: &ScanInfo, components: &[Component]) -> Result<()> {
    let n = scan.comps_in_scan as usize;
    let mut payload = Vec::with_capacity(4 + n * 2);
    payload.push(n as u8);
    for &comp in scan.components() {
        let c = comp as usize;
        let table = table_of(c) as u8;
        payload.push(components[c].id);
        payload.push((table << 4) | table);
    }
    payload.push(scan.ss);
    payload.push(scan.se);
    payload.push((scan.ah << 4) | scan.al);
    write_segment(sink, MARKER_SOS, &payload)
}
