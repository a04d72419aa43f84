//! Entropy coding.
//!
//! One scan walker drives both passes of the two-pass design: a dry run
//! feeds a [`HistogramSink`] to gather per-table symbol statistics, then
//! the same walk replays into a [`BitstreamSink`] holding the optimized
//! tables. Statistics therefore match emission by construction.
//!
//! The walker covers sequential scans, progressive DC first/refinement,
//! progressive AC first scans with EOB-run accumulation, and AC refinement
//! per T.81 Annex G (correction bits buffered across blocks until the
//! pending EOB run flushes). Restart markers flush everything, reset the DC
//! predictors, and cycle `RST0..RST7`.

use crate::coeffs::ComponentCoeffs;
use crate::consts::{DCT_BLOCK_SIZE, DC_ALPHABET_SIZE, MARKER_RST0, MAX_COMPONENTS};
use crate::error::{Error, Result};
use crate::huffman::{EncodeTable, Histogram};
use crate::types::{Component, ScanInfo};

/// Correction-bit buffer cap; flush the EOB run before exceeding it.
const MAX_CORRECTION_BITS: usize = 1000 - DCT_BLOCK_SIZE;

/// Huffman table class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    /// DC difference categories
    Dc,
    /// AC run/size symbols
    Ac,
}

/// Receiver for the scan walker's output.
pub trait TokenSink {
    /// A Huffman-coded symbol for table `table` of class `class`.
    fn symbol(&mut self, class: TableClass, table: usize, symbol: u8) -> Result<()>;
    /// Raw bits appended after the preceding symbol.
    fn bits(&mut self, value: u32, count: u8);
    /// A restart boundary: flush to a byte and emit `RSTn`.
    fn restart(&mut self);
}

/// Statistics-gathering sink for the optimization pass.
#[derive(Debug, Default)]
pub struct HistogramSink {
    /// DC histograms by table id
    pub dc: [Histogram; 2],
    /// AC histograms by table id
    pub ac: [Histogram; 2],
}

impl HistogramSink {
    /// Creates empty histograms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSink for HistogramSink {
    fn symbol(&mut self, class: TableClass, table: usize, symbol: u8) -> Result<()> {
        match class {
            TableClass::Dc => self.dc[table].count(symbol),
            TableClass::Ac => self.ac[table].count(symbol),
        }
        Ok(())
    }

    fn bits(&mut self, _value: u32, _count: u8) {}

    fn restart(&mut self) {}
}

/// Bit writer with JPEG byte stuffing (0xFF is followed by 0x00).
#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    bit_buffer: u64,
    bits_in_buffer: u32,
}

impl BitWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `count` right-aligned bits.
    #[inline]
    pub fn write_bits(&mut self, bits: u32, count: u8) {
        debug_assert!(count <= 32);
        debug_assert!(count == 32 || u64::from(bits) < (1u64 << count));
        self.bit_buffer = (self.bit_buffer << count) | u64::from(bits);
        self.bits_in_buffer += u32::from(count);
        while self.bits_in_buffer >= 8 {
            self.bits_in_buffer -= 8;
            let byte = (self.bit_buffer >> self.bits_in_buffer) as u8;
            self.buffer.push(byte);
            if byte == 0xFF {
                self.buffer.push(0x00);
            }
        }
    }

    /// Pads the partial byte with 1 bits and flushes it.
    pub fn align(&mut self) {
        if self.bits_in_buffer > 0 {
            let padding = 8 - self.bits_in_buffer;
            let byte =
                (((self.bit_buffer << padding) | ((1u64 << padding) - 1)) & 0xFF) as u8;
            self.buffer.push(byte);
            if byte == 0xFF {
                self.buffer.push(0x00);
            }
            self.bit_buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Appends a raw byte, bypassing stuffing (marker emission).
    pub fn push_raw(&mut self, byte: u8) {
        debug_assert_eq!(self.bits_in_buffer, 0);
        self.buffer.push(byte);
    }

    /// Aligns and returns the accumulated bytes.
    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.align();
        self.buffer
    }
}

/// Bit-emitting sink backed by per-class encode tables.
pub struct BitstreamSink {
    writer: BitWriter,
    dc_tables: [Option<EncodeTable>; 2],
    ac_tables: [Option<EncodeTable>; 2],
    restart_num: u8,
}

impl BitstreamSink {
    /// Creates a sink with the given tables (None for unused slots).
    #[must_use]
    pub fn new(dc_tables: [Option<EncodeTable>; 2], ac_tables: [Option<EncodeTable>; 2]) -> Self {
        Self {
            writer: BitWriter::new(),
            dc_tables,
            ac_tables,
            restart_num: 0,
        }
    }

    /// Finishes the scan, returning the entropy-coded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

impl TokenSink for BitstreamSink {
    fn symbol(&mut self, class: TableClass, table: usize, symbol: u8) -> Result<()> {
        let tables = match class {
            TableClass::Dc => &self.dc_tables,
            TableClass::Ac => &self.ac_tables,
        };
        let table = tables[table].as_ref().ok_or(Error::Internal {
            reason: "scan uses a Huffman table that was never built",
        })?;
        let (code, len) = table.encode(symbol);
        if len == 0 {
            return Err(Error::Internal {
                reason: "symbol missing from optimized Huffman table",
            });
        }
        self.writer.write_bits(code, len);
        Ok(())
    }

    fn bits(&mut self, value: u32, count: u8) {
        self.writer.write_bits(value, count);
    }

    fn restart(&mut self) {
        self.writer.align();
        self.writer.push_raw(0xFF);
        self.writer.push_raw(MARKER_RST0 + self.restart_num);
        self.restart_num = (self.restart_num + 1) & 7;
    }
}

/// Bit length of a magnitude.
#[inline]
#[must_use]
pub fn category(value: i32) -> u8 {
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

/// Magnitude bits: the value itself for positives, ones-complement for
/// negatives.
#[inline]
#[must_use]
pub fn magnitude_bits(value: i32, category: u8) -> u32 {
    if value >= 0 {
        value as u32
    } else {
        (value - 1) as u32 & ((1u32 << category) - 1)
    }
}

/// Point transform for AC coefficients: magnitude shift preserving sign.
#[inline]
fn point_transform(value: i32, al: u8) -> i32 {
    if value >= 0 {
        value >> al
    } else {
        -((-value) >> al)
    }
}

/// Which Huffman table a component uses: luma gets 0, chroma 1.
#[inline]
#[must_use]
pub fn table_of(component: usize) -> usize {
    usize::from(component > 0)
}

/// Walks one scan in MCU order, emitting symbols and bits into `sink`.
///
/// For multi-component scans the MCU is the interleaved block group; a
/// single-component scan's MCU is one block. Restart intervals apply to
/// both, per T.81.
pub fn encode_scan<S: TokenSink>(
    coeffs: &[ComponentCoeffs],
    components: &[Component],
    scan: &ScanInfo,
    restart_interval: u16,
    sink: &mut S,
) -> Result<()> {
    let interleaved = scan.comps_in_scan > 1;
    let first = scan.component_index[0] as usize;
    // Interleaved scans walk the padded MCU grid; a single-component scan
    // covers exactly the component's coded blocks (T.81 A.2.2).
    let (mcus_x, mcus_y) = if interleaved {
        (
            coeffs[first].width_in_blocks / components[first].h_samp as usize,
            coeffs[first].height_in_blocks / components[first].v_samp as usize,
        )
    } else {
        (
            components[first].width_in_blocks,
            components[first].height_in_blocks,
        )
    };

    let mut state = ScanState::new(scan);
    let mut mcu_index: u32 = 0;

    for mcu_y in 0..mcus_y {
        for mcu_x in 0..mcus_x {
            if restart_interval > 0
                && mcu_index > 0
                && mcu_index % u32::from(restart_interval) == 0
            {
                state.flush_eob_run(sink)?;
                sink.restart();
                state.dc_pred = [0; MAX_COMPONENTS];
            }

            for &comp in scan.components() {
                let c = comp as usize;
                let data = &coeffs[c];
                if interleaved {
                    let h = components[c].h_samp as usize;
                    let v = components[c].v_samp as usize;
                    for by in 0..v {
                        for bx in 0..h {
                            let block = data.block(mcu_x * h + bx, mcu_y * v + by);
                            state.encode_block(block, c, sink)?;
                        }
                    }
                } else {
                    let block = data.block(mcu_x, mcu_y);
                    state.encode_block(block, c, sink)?;
                }
            }
            mcu_index += 1;
        }
    }

    state.flush_eob_run(sink)?;
    Ok(())
}

/// Per-scan coding state.
struct ScanState {
    ss: usize,
    se: usize,
    ah: u8,
    al: u8,
    kind: ScanKind,
    dc_pred: [i32; MAX_COMPONENTS],
    eob_run: u32,
    /// Correction bits riding with the pending EOB run (refinement only).
    pending_bits: Vec<u8>,
    /// AC table carrying the pending EOB run.
    eob_table: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanKind {
    Sequential,
    DcFirst,
    DcRefine,
    AcFirst,
    AcRefine,
}

impl ScanState {
    fn new(scan: &ScanInfo) -> Self {
        let kind = if scan.ss == 0 && scan.se > 0 {
            ScanKind::Sequential
        } else if scan.is_dc() {
            if scan.is_refinement() {
                ScanKind::DcRefine
            } else {
                ScanKind::DcFirst
            }
        } else if scan.is_refinement() {
            ScanKind::AcRefine
        } else {
            ScanKind::AcFirst
        };
        Self {
            ss: scan.ss as usize,
            se: scan.se as usize,
            ah: scan.ah,
            al: scan.al,
            kind,
            dc_pred: [0; MAX_COMPONENTS],
            eob_run: 0,
            pending_bits: Vec::new(),
            eob_table: 0,
        }
    }

    fn encode_block<S: TokenSink>(
        &mut self,
        block: &[i16; DCT_BLOCK_SIZE],
        component: usize,
        sink: &mut S,
    ) -> Result<()> {
        match self.kind {
            ScanKind::Sequential => self.sequential(block, component, sink),
            ScanKind::DcFirst => self.dc_first(block, component, sink),
            ScanKind::DcRefine => {
                sink.bits(((i32::from(block[0]) >> self.al) & 1) as u32, 1);
                Ok(())
            }
            ScanKind::AcFirst => self.ac_first(block, component, sink),
            ScanKind::AcRefine => self.ac_refine(block, component, sink),
        }
    }

    fn dc_first<S: TokenSink>(
        &mut self,
        block: &[i16; DCT_BLOCK_SIZE],
        component: usize,
        sink: &mut S,
    ) -> Result<()> {
        let value = i32::from(block[0]) >> self.al;
        let diff = value - self.dc_pred[component];
        self.dc_pred[component] = value;

        let cat = category(diff);
        if cat as usize >= DC_ALPHABET_SIZE {
            return Err(Error::Internal {
                reason: "DC difference out of range",
            });
        }
        sink.symbol(TableClass::Dc, table_of(component), cat)?;
        if cat > 0 {
            sink.bits(magnitude_bits(diff, cat), cat);
        }
        Ok(())
    }

    fn sequential<S: TokenSink>(
        &mut self,
        block: &[i16; DCT_BLOCK_SIZE],
        component: usize,
        sink: &mut S,
    ) -> Result<()> {
        self.dc_first(block, component, sink)?;

        let table = table_of(component);
        let mut run = 0u32;
        for k in 1..=self.se {
            let v = i32::from(block[k]);
            if v == 0 {
                run += 1;
                continue;
            }
            while run > 15 {
                sink.symbol(TableClass::Ac, table, 0xF0)?;
                run -= 16;
            }
            let cat = category(v);
            if cat > 10 {
                return Err(Error::Internal {
                    reason: "AC coefficient out of range",
                });
            }
            sink.symbol(TableClass::Ac, table, ((run as u8) << 4) | cat)?;
            sink.bits(magnitude_bits(v, cat), cat);
            run = 0;
        }
        if run > 0 {
            sink.symbol(TableClass::Ac, table, 0x00)?;
        }
        Ok(())
    }

    fn ac_first<S: TokenSink>(
        &mut self,
        block: &[i16; DCT_BLOCK_SIZE],
        component: usize,
        sink: &mut S,
    ) -> Result<()> {
        let table = table_of(component);
        self.eob_table = table;

        let mut run = 0u32;
        let mut any = false;
        for k in self.ss..=self.se {
            let v = point_transform(i32::from(block[k]), self.al);
            if v == 0 {
                run += 1;
                continue;
            }
            if !any {
                self.flush_eob_run(sink)?;
                any = true;
            }
            while run > 15 {
                sink.symbol(TableClass::Ac, table, 0xF0)?;
                run -= 16;
            }
            let cat = category(v);
            if cat > 10 {
                return Err(Error::Internal {
                    reason: "AC coefficient out of range",
                });
            }
            sink.symbol(TableClass::Ac, table, ((run as u8) << 4) | cat)?;
            sink.bits(magnitude_bits(v, cat), cat);
            run = 0;
        }
        if run > 0 {
            self.eob_run += 1;
            if self.eob_run == 0x7FFF {
                self.flush_eob_run(sink)?;
            }
        }
        Ok(())
    }

    fn ac_refine<S: TokenSink>(
        &mut self,
        block: &[i16; DCT_BLOCK_SIZE],
        component: usize,
        sink: &mut S,
    ) -> Result<()> {
        let table = table_of(component);
        self.eob_table = table;

        // Shifted magnitudes; a value of exactly 1 is newly significant.
        let mut absvalues = [0i32; DCT_BLOCK_SIZE];
        let mut eob = 0usize;
        for k in self.ss..=self.se {
            let shifted = (i32::from(block[k]).unsigned_abs() >> self.al) as i32;
            absvalues[k] = shifted;
            if shifted == 1 {
                eob = k;
            }
        }

        let mut run = 0u32;
        let mut block_bits: Vec<u8> = Vec::new();
        for k in self.ss..=self.se {
            let value = absvalues[k];
            if value == 0 {
                run += 1;
                continue;
            }
            while run > 15 && k <= eob {
                self.flush_eob_run(sink)?;
                sink.symbol(TableClass::Ac, table, 0xF0)?;
                run -= 16;
                for bit in block_bits.drain(..) {
                    sink.bits(u32::from(bit), 1);
                }
            }
            if value > 1 {
                // Already significant: queue its correction bit.
                block_bits.push((value & 1) as u8);
                continue;
            }
            // Newly significant coefficient.
            self.flush_eob_run(sink)?;
            sink.symbol(TableClass::Ac, table, ((run as u8) << 4) | 1)?;
            sink.bits(u32::from(block[k] > 0), 1);
            for bit in block_bits.drain(..) {
                sink.bits(u32::from(bit), 1);
            }
            run = 0;
        }

        if run > 0 || !block_bits.is_empty() {
            self.eob_run += 1;
            self.pending_bits.append(&mut block_bits);
            if self.eob_run == 0x7FFF || self.pending_bits.len() > MAX_CORRECTION_BITS {
                self.flush_eob_run(sink)?;
            }
        }
        Ok(())
    }

    /// Emits the pending EOB run symbol, its extra bits, and any buffered
    /// correction bits.
    fn flush_eob_run<S: TokenSink>(&mut self, sink: &mut S) -> Result<()> {
        if self.eob_run > 0 {
            let run = self.eob_run;
            let nbits = if run == 1 {
                0
            } else {
                31 - run.leading_zeros()
            };
            sink.symbol(TableClass::Ac, self.eob_table, (nbits << 4) as u8)?;
            if nbits > 0 {
                sink.bits(run & ((1 << nbits) - 1), nbits as u8);
            }
            self.eob_run = 0;
        }
        for bit in self.pending_bits.drain(..) {
            sink.bits(u32::from(bit), 1);
        }
        Ok(())
    }
}
