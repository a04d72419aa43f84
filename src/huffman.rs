//! Huffman code construction.
//!
//! Builds length-limited canonical codes from per-scan symbol histograms
//! using the JPEG K.2 procedure. A sentinel symbol with count 1 takes part
//! in the construction and is dropped from the longest length afterwards,
//! which guarantees the all-ones code of any length is never assigned to a
//! real symbol (JPEG reserves it so a decoder can detect marker bytes).

use crate::consts::HUFFMAN_MAX_BIT_LENGTH;
use crate::error::{Error, Result};

/// Upper bound on code length during construction, before limiting to 16.
const MAX_CLEN: usize = 32;

/// Marker frequency for already-merged tree nodes.
const FREQ_MERGED: i64 = i64::MAX;

/// Symbol frequency histogram (256 real symbols plus the sentinel).
#[derive(Debug, Clone)]
pub struct Histogram {
    counts: [i64; 257],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { counts: [0; 257] }
    }
}

impl Histogram {
    /// Creates an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `symbol`.
    #[inline]
    pub fn count(&mut self, symbol: u8) {
        self.counts[symbol as usize] += 1;
    }

    /// Total number of counted symbols.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.counts[..256].iter().sum()
    }

    /// True when nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts[..256].iter().all(|&c| c == 0)
    }

    /// Builds the canonical DHT representation for this histogram.
    pub fn build(&self) -> Result<HuffmanCode> {
        let mut freq = self.counts;
        if self.is_empty() {
            // A used table must define at least one symbol.
            freq[0] = 1;
        }
        let lengths = generate_code_lengths(&mut freq)?;

        let mut bits = [0u8; HUFFMAN_MAX_BIT_LENGTH];
        let mut symbols_by_length: Vec<Vec<u8>> = vec![Vec::new(); HUFFMAN_MAX_BIT_LENGTH + 1];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len > 0 {
                debug_assert!(len as usize <= HUFFMAN_MAX_BIT_LENGTH);
                symbols_by_length[len as usize].push(symbol as u8);
                bits[len as usize - 1] += 1;
            }
        }
        // Canonical order: by (length, symbol).
        for syms in &mut symbols_by_length {
            syms.sort_unstable();
        }
        let values: Vec<u8> = symbols_by_length.into_iter().flatten().collect();

        Ok(HuffmanCode { bits, values })
    }
}

/// A Huffman table in DHT form: code counts per length plus symbol values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCode {
    /// Number of codes of each length 1..=16
    pub bits: [u8; HUFFMAN_MAX_BIT_LENGTH],
    /// Symbols in canonical order
    pub values: Vec<u8>,
}

impl HuffmanCode {
    /// Expands to a symbol-indexed encode table.
    pub fn encode_table(&self) -> Result<EncodeTable> {
        let total: usize = self.bits.iter().map(|&b| b as usize).sum();
        if total != self.values.len() || total > 256 {
            return Err(Error::Internal {
                reason: "Huffman bits/values mismatch",
            });
        }

        let mut table = EncodeTable::default();
        let mut code: u32 = 0;
        let mut idx = 0usize;
        for (len_minus_1, &count) in self.bits.iter().enumerate() {
            let len = (len_minus_1 + 1) as u8;
            for _ in 0..count {
                let symbol = self.values[idx] as usize;
                // The all-ones code must stay reserved.
                if code == (1u32 << len) - 1 {
                    return Err(Error::Internal {
                        reason: "all-ones Huffman code assigned",
                    });
                }
                table.codes[symbol] = code;
                table.lengths[symbol] = len;
                code += 1;
                idx += 1;
            }
            code <<= 1;
        }
        Ok(table)
    }
}

/// Symbol-to-(code, length) lookup used by the bit writer.
#[derive(Debug, Clone)]
pub struct EncodeTable {
    /// Code bits per symbol
    pub codes: [u32; 256],
    /// Code length per symbol; zero means the symbol is absent
    pub lengths: [u8; 256],
}

impl Default for EncodeTable {
    fn default() -> Self {
        Self {
            codes: [0; 256],
            lengths: [0; 256],
        }
    }
}

impl EncodeTable {
    /// Code and length for a symbol.
    #[inline]
    #[must_use]
    pub fn encode(&self, symbol: u8) -> (u32, u8) {
        (self.codes[symbol as usize], self.lengths[symbol as usize])
    }
}

/// Generates length-limited code lengths from frequencies.
///
/// Implements the tree-merging procedure of JPEG Annex K.2. `freq` holds
/// 257 entries; index 256 is the sentinel and receives count 1 here.
fn generate_code_lengths(freq: &mut [i64; 257]) -> Result<[u8; 256]> {
    let mut codesize = [0usize; 257];
    let mut others = [-1i32; 257];

    freq[256] = 1;

    loop {
        // Two smallest non-merged, non-zero frequencies; ties prefer the
        // higher index, matching the reference procedure.
        let mut c1: i32 = -1;
        let mut c2: i32 = -1;
        let mut v1 = i64::MAX;
        let mut v2 = i64::MAX;
        for (i, &f) in freq.iter().enumerate() {
            if f == 0 || f == FREQ_MERGED {
                continue;
            }
            if f <= v1 {
                v2 = v1;
                c2 = c1;
                v1 = f;
                c1 = i as i32;
            } else if f <= v2 {
                v2 = f;
                c2 = i as i32;
            }
        }
        if c2 < 0 {
            break;
        }
        let (c1, c2) = (c1 as usize, c2 as usize);

        freq[c1] = freq[c1].saturating_add(freq[c2]);
        freq[c2] = FREQ_MERGED;

        codesize[c1] += 1;
        let mut node = c1;
        while others[node] >= 0 {
            node = others[node] as usize;
            codesize[node] += 1;
        }
        others[node] = c2 as i32;
        codesize[c2] += 1;
        let mut node = c2;
        while others[node] >= 0 {
            node = others[node] as usize;
            codesize[node] += 1;
        }
    }

    // Count codes per length.
    let mut bits = [0i32; MAX_CLEN + 1];
    for &size in codesize.iter() {
        if size > 0 {
            if size > MAX_CLEN {
                return Err(Error::Internal {
                    reason: "Huffman code length exceeds construction bound",
                });
            }
            bits[size] += 1;
        }
    }

    // Limit to 16 bits by moving pairs of deep symbols up (K.2).
    for i in (HUFFMAN_MAX_BIT_LENGTH + 1..=MAX_CLEN).rev() {
        while bits[i] > 0 {
            let mut j = i - 2;
            while j > 0 && bits[j] == 0 {
                j -= 1;
            }
            if j == 0 {
                return Err(Error::Internal {
                    reason: "Huffman length limiting failed",
                });
            }
            bits[i] -= 2;
            bits[i - 1] += 1;
            bits[j + 1] += 2;
            bits[j] -= 1;
        }
    }

    // Drop the sentinel from the longest used length.
    let mut longest = HUFFMAN_MAX_BIT_LENGTH;
    while longest > 0 && bits[longest] == 0 {
        longest -= 1;
    }
    if longest > 0 {
        bits[longest] -= 1;
    }

    // Reassign lengths to real symbols in frequency order.
    let mut real: Vec<(usize, usize)> = (0..256)
        .filter(|&i| codesize[i] > 0)
        .map(|i| (i, codesize[i]))
        .collect();
    real.sort_by_key(|&(idx, size)| (size, idx));

    let mut lengths = [0u8; 256];
    let mut iter = real.iter();
    for len in 1..=HUFFMAN_MAX_BIT_LENGTH {
        for _ in 0..bits[len] {
            if let Some(&(idx, _)) = iter.next() {
                lengths[idx] = len as u8;
            }
        }
    }
    Ok(lengths)
}
