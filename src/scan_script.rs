//! Progressive scan scripting.
//!
//! Builds the default scan sequence for a progressive level and validates
//! that a script covers every coefficient position exactly once with
//! well-formed successive-approximation chains.

use crate::error::{Error, Result};
use crate::types::ScanInfo;

/// One pass over a spectral range, before component expansion.
#[derive(Debug, Clone, Copy)]
struct ScanSpec {
    ss: u8,
    se: u8,
    ah: u8,
    al: u8,
    interleaved: bool,
}

/// Builds the scan script for a progressive level.
///
/// Level 0 is baseline: a single interleaved full-spectrum scan. Level 1
/// splits DC from AC with one refinement pass; level 2 and above use the
/// five-pass script with successive approximation on the high AC band.
/// Non-interleaved specs expand to one scan per component; DC is
/// interleaved only when subsampling is in play (`max_shift > 0`).
#[must_use]
pub fn default_scan_script(
    progressive_level: u32,
    num_components: usize,
    max_shift: u8,
) -> Vec<ScanInfo> {
    let dc_interleaved = max_shift > 0;
    let specs: Vec<ScanSpec> = if progressive_level == 0 {
        vec![ScanSpec {
            ss: 0,
            se: 63,
            ah: 0,
            al: 0,
            interleaved: true,
        }]
    } else if progressive_level == 1 {
        vec![
            ScanSpec { ss: 0, se: 0, ah: 0, al: 0, interleaved: dc_interleaved },
            ScanSpec { ss: 1, se: 63, ah: 0, al: 1, interleaved: false },
            ScanSpec { ss: 1, se: 63, ah: 1, al: 0, interleaved: false },
        ]
    } else {
        vec![
            ScanSpec { ss: 0, se: 0, ah: 0, al: 0, interleaved: dc_interleaved },
            ScanSpec { ss: 1, se: 2, ah: 0, al: 0, interleaved: false },
            ScanSpec { ss: 3, se: 63, ah: 0, al: 2, interleaved: false },
            ScanSpec { ss: 3, se: 63, ah: 2, al: 1, interleaved: false },
            ScanSpec { ss: 3, se: 63, ah: 1, al: 0, interleaved: false },
        ]
    };

    let mut scans = Vec::new();
    for spec in specs {
        if spec.interleaved {
            let comps: Vec<u8> = (0..num_components as u8).collect();
            scans.push(ScanInfo::new(&comps, spec.ss, spec.se, spec.ah, spec.al));
        } else {
            for c in 0..num_components as u8 {
                scans.push(ScanInfo::new(&[c], spec.ss, spec.se, spec.ah, spec.al));
            }
        }
    }
    scans
}

/// Validates a scan script against T.81's progression rules.
///
/// Checks spectral bounds, single-component AC scans, DC-before-AC order,
/// exactly-once first-pass coverage of every coefficient, and that each
/// refinement's `Ah` continues the previous pass's `Al`.
pub fn validate_scan_script(scans: &[ScanInfo], num_components: usize) -> Result<()> {
    if scans.is_empty() {
        return Err(Error::InvalidScanScript(
            "scan script must contain at least one scan".into(),
        ));
    }

    // Per component and coefficient: (first_pass_done, last_al)
    let mut coverage: Vec<Vec<(bool, Option<u8>)>> = vec![vec![(false, None); 64]; num_components];

    for (idx, scan) in scans.iter().enumerate() {
        if scan.comps_in_scan == 0 {
            return Err(Error::InvalidScanScript(format!(
                "scan {idx}: no components"
            )));
        }
        if scan.se > 63 || scan.ss > scan.se {
            return Err(Error::InvalidScanScript(format!(
                "scan {idx}: invalid spectral range {}..{}",
                scan.ss, scan.se
            )));
        }
        if scan.ss > 0 && scan.comps_in_scan > 1 {
            return Err(Error::InvalidScanScript(format!(
                "scan {idx}: AC scans must carry exactly one component"
            )));
        }
        for window in scan.components().windows(2) {
            if window[1] <= window[0] {
                return Err(Error::InvalidScanScript(format!(
                    "scan {idx}: components must be strictly ascending"
                )));
            }
        }

        for &comp in scan.components() {
            let c = comp as usize;
            if c >= num_components {
                return Err(Error::InvalidScanScript(format!(
                    "scan {idx}: component {c} out of range"
                )));
            }
            if scan.ss > 0 && !coverage[c][0].0 {
                return Err(Error::InvalidScanScript(format!(
                    "scan {idx}: AC before DC for component {c}"
                )));
            }
            for k in scan.ss..=scan.se {
                let cell = &mut coverage[c][k as usize];
                if scan.ah == 0 {
                    if cell.0 {
                        return Err(Error::InvalidScanScript(format!(
                            "scan {idx}: coefficient {k} of component {c} covered twice"
                        )));
                    }
                    *cell = (true, Some(scan.al));
                } else {
                    match cell.1 {
                        Some(prev_al) if scan.ah == prev_al => {
                            if scan.al >= scan.ah {
                                return Err(Error::InvalidScanScript(format!(
                                    "scan {idx}: refinement must lower Al (Ah={} Al={})",
                                    scan.ah, scan.al
                                )));
                            }
                            cell.1 = Some(scan.al);
                        }
                        Some(prev_al) => {
                            return Err(Error::InvalidScanScript(format!(
                                "scan {idx}: Ah {} does not continue previous Al {prev_al}",
                                scan.ah
                            )));
                        }
                        None => {
                            return Err(Error::InvalidScanScript(format!(
                                "scan {idx}: refinement before first pass of coefficient {k}"
                            )));
                        }
                    }
                }
            }
        }
    }

    // Every coefficient position must have been covered, down to Al = 0.
    for (c, comp_cov) in coverage.iter().enumerate() {
        for (k, &(done, last_al)) in comp_cov.iter().enumerate() {
            if !done {
                return Err(Error::InvalidScanScript(format!(
                    "coefficient {k} of component {c} never coded"
                )));
            }
            if last_al != Some(0) {
                return Err(Error::InvalidScanScript(format!(
                    "coefficient {k} of component {c} not refined to full precision"
                )));
            }
        }
    }

    Ok(())
}
