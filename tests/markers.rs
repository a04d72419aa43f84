//! Marker-structure tests: scan the emitted bytes and check the stream
//! shape marker by marker.

use zenli::{Encoder, EncoderConfig};

fn gradient_rgb(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width) as u8);
            pixels.push((y * 255 / height) as u8);
            pixels.push(((x * y) % 256) as u8);
        }
    }
    pixels
}

fn encode(pixels: &[u8], width: usize, height: usize, comps: usize, config: EncoderConfig) -> Vec<u8> {
    let rows: Vec<&[u8]> = pixels.chunks(width * comps).collect();
    let mut encoder = Encoder::new(config).unwrap();
    encoder.write_scanlines(&rows).unwrap();
    encoder.encode_to_vec().unwrap()
}

/// Parsed view of the marker stream: (marker byte, offset of the 0xFF).
fn scan_markers(jpeg: &[u8]) -> Vec<(u8, usize)> {
    let mut markers = Vec::new();
    let mut i = 0usize;
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    markers.push((0xD8, 0));
    i += 2;
    loop {
        assert_eq!(jpeg[i], 0xFF, "expected marker at {i}");
        let kind = jpeg[i + 1];
        markers.push((kind, i));
        if kind == 0xD9 {
            break;
        }
        let len = ((jpeg[i + 2] as usize) << 8) | jpeg[i + 3] as usize;
        i += 2 + len;
        if kind == 0xDA {
            // Skip entropy-coded data: 0xFF is either stuffed (00) or a
            // restart/terminating marker.
            loop {
                if jpeg[i] != 0xFF {
                    i += 1;
                    continue;
                }
                match jpeg[i + 1] {
                    0x00 => i += 2,
                    0xD0..=0xD7 => {
                        markers.push((jpeg[i + 1], i));
                        i += 2;
                    }
                    _ => break,
                }
            }
        }
    }
    markers
}

#[test]
fn test_stream_starts_soi_ends_eoi() {
    let pixels = gradient_rgb(16, 16);
    let mut config = EncoderConfig::new(16, 16, 3);
    config.progressive_level = 0;
    let jpeg = encode(&pixels, 16, 16, 3, config);
    let markers = scan_markers(&jpeg);
    assert_eq!(markers.first().unwrap().0, 0xD8);
    assert_eq!(markers.last().unwrap().0, 0xD9);
    assert_eq!(markers.last().unwrap().1, jpeg.len() - 2);
}

#[test]
fn test_byte_stuffing_invariant() {
    // Every 0xFF inside an entropy segment is followed by 0x00 or a
    // restart marker; scan_markers asserts this while walking.
    let pixels = gradient_rgb(64, 64);
    let mut config = EncoderConfig::new(64, 64, 3).with_distance(0.5);
    config.progressive_level = 2;
    let jpeg = encode(&pixels, 64, 64, 3, config);
    scan_markers(&jpeg);
}

#[test]
fn test_marker_order_baseline() {
    let pixels = gradient_rgb(16, 16);
    let mut config = EncoderConfig::new(16, 16, 3);
    config.progressive_level = 0;
    config.restart_interval = 2;
    let jpeg = encode(&pixels, 16, 16, 3, config);
    let kinds: Vec<u8> = scan_markers(&jpeg)
        .iter()
        .map(|&(k, _)| k)
        .filter(|k| !(0xD0..=0xD7).contains(k))
        .collect();
    // SOI, DQT x3, SOF0, DRI, DHT x4, SOS, EOI
    assert_eq!(kinds[0], 0xD8);
    assert_eq!(&kinds[1..4], &[0xDB, 0xDB, 0xDB]);
    assert_eq!(kinds[4], 0xC0);
    assert_eq!(kinds[5], 0xDD);
    assert!(kinds[6..10].iter().all(|&k| k == 0xC4));
    assert_eq!(kinds[10], 0xDA);
    assert_eq!(kinds[11], 0xD9);
}

#[test]
fn test_progressive_level2_gray_has_five_scans() {
    let pixels = vec![77u8; 64];
    let mut config = EncoderConfig::new(8, 8, 1).with_distance(1.0);
    config.progressive_level = 2;
    let jpeg = encode(&pixels, 8, 8, 1, config);

    let markers = scan_markers(&jpeg);
    let sos: Vec<usize> = markers
        .iter()
        .filter(|&&(k, _)| k == 0xDA)
        .map(|&(_, off)| off)
        .collect();
    assert_eq!(sos.len(), 5);

    // First scan is the DC pass: Ss=0, Se=0.
    let first = sos[0];
    let n = jpeg[first + 4] as usize;
    let ss = jpeg[first + 5 + 2 * n];
    let se = jpeg[first + 6 + 2 * n];
    assert_eq!((ss, se), (0, 0));
    assert!(jpeg.windows(2).any(|w| w == [0xFF, 0xC2]), "SOF2 expected");
}

#[test]
fn test_progressive_level2_rgb_expands_scans() {
    // T.81 forbids interleaved AC scans, so 4:4:4 RGB level 2 expands to
    // 3 DC scans plus 4 x 3 AC scans.
    let pixels = gradient_rgb(8, 8);
    let mut config = EncoderConfig::new(8, 8, 3).with_distance(1.0);
    config.progressive_level = 2;
    let jpeg = encode(&pixels, 8, 8, 3, config);
    let count = scan_markers(&jpeg)
        .iter()
        .filter(|&&(k, _)| k == 0xDA)
        .count();
    assert_eq!(count, 15);
}

#[test]
fn test_progressive_subsampled_dc_interleaved() {
    let pixels = gradient_rgb(32, 32);
    let mut config = EncoderConfig::new(32, 32, 3).with_distance(1.0);
    config.progressive_level = 2;
    config.sampling = [2, 1, 1];
    let jpeg = encode(&pixels, 32, 32, 3, config);
    let markers = scan_markers(&jpeg);
    let sos: Vec<usize> = markers
        .iter()
        .filter(|&&(k, _)| k == 0xDA)
        .map(|&(_, off)| off)
        .collect();
    // 1 interleaved DC scan + 12 AC scans.
    assert_eq!(sos.len(), 13);
    // The DC scan carries all three components.
    assert_eq!(jpeg[sos[0] + 4], 3);
}

#[test]
fn test_user_app1_marker_preserved_before_tables() {
    let payload = b"Exif\0\0fake-exif-payload";
    let pixels = gradient_rgb(8, 8);
    let mut config = EncoderConfig::new(8, 8, 3);
    config.progressive_level = 0;
    let rows: Vec<&[u8]> = pixels.chunks(8 * 3).collect();
    let mut encoder = Encoder::new(config).unwrap();
    encoder.add_marker(0xE1, payload).unwrap();
    encoder.write_scanlines(&rows).unwrap();
    let jpeg = encoder.encode_to_vec().unwrap();

    let markers = scan_markers(&jpeg);
    assert_eq!(markers[1].0, 0xE1, "APP1 must directly follow SOI");
    let app1_off = markers[1].1;
    assert_eq!(&jpeg[app1_off + 4..app1_off + 4 + payload.len()], payload);
    // Tables come after.
    let dqt_off = markers.iter().find(|&&(k, _)| k == 0xDB).unwrap().1;
    assert!(dqt_off > app1_off);
}

#[test]
fn test_large_icc_profile_chunked() {
    let profile: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();
    let pixels = gradient_rgb(8, 8);
    let mut config = EncoderConfig::new(8, 8, 3);
    config.progressive_level = 0;
    let rows: Vec<&[u8]> = pixels.chunks(8 * 3).collect();
    let mut encoder = Encoder::new(config).unwrap();
    encoder.embed_icc_profile(&profile);
    encoder.write_scanlines(&rows).unwrap();
    let jpeg = encoder.encode_to_vec().unwrap();

    // Collect APP2 ICC chunks from the stream.
    let mut chunks = Vec::new();
    for &(kind, off) in &scan_markers(&jpeg) {
        if kind != 0xE2 {
            continue;
        }
        let len = ((jpeg[off + 2] as usize) << 8) | jpeg[off + 3] as usize;
        let payload = &jpeg[off + 4..off + 2 + len];
        assert_eq!(&payload[..12], b"ICC_PROFILE\0");
        chunks.push((payload[12], payload[13], payload[14..].to_vec()));
    }
    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].0, chunks[0].1), (1, 2));
    assert_eq!((chunks[1].0, chunks[1].1), (2, 2));

    let mut reassembled = chunks[0].2.clone();
    reassembled.extend_from_slice(&chunks[1].2);
    assert_eq!(reassembled, profile);
}

#[test]
fn test_xyb_mode_embeds_icc_profile() {
    let pixels = gradient_rgb(16, 16);
    let mut config = EncoderConfig::new(16, 16, 3).with_distance(1.0);
    config.progressive_level = 0;
    config.xyb_mode = true;
    let jpeg = encode(&pixels, 16, 16, 3, config);

    let markers = scan_markers(&jpeg);
    let app2 = markers
        .iter()
        .find(|&&(k, _)| k == 0xE2)
        .expect("XYB output must carry an APP2 ICC marker");
    let off = app2.1;
    assert_eq!(&jpeg[off + 4..off + 16], b"ICC_PROFILE\0");
    // Single chunk: 1 of 1.
    assert_eq!(jpeg[off + 16], 1);
    assert_eq!(jpeg[off + 17], 1);
}

#[test]
fn test_restart_markers_cycle() {
    let pixels = gradient_rgb(64, 64);
    let mut config = EncoderConfig::new(64, 64, 3).with_distance(1.0);
    config.progressive_level = 0;
    config.restart_interval = 4;
    let jpeg = encode(&pixels, 64, 64, 3, config);

    let restarts: Vec<u8> = scan_markers(&jpeg)
        .iter()
        .filter(|&&(k, _)| (0xD0..=0xD7).contains(&k))
        .map(|&(k, _)| k)
        .collect();
    // 64 MCUs with an interval of 4: a restart after every 4th MCU except
    // the last group.
    assert_eq!(restarts.len(), 15);
    for (i, &k) in restarts.iter().enumerate() {
        assert_eq!(k, 0xD0 + (i as u8 % 8), "restart {i} out of sequence");
    }
}

#[test]
fn test_force_baseline_quant_range() {
    // Punishing distance: entries would exceed 255 without the clamp.
    let pixels = gradient_rgb(16, 16);
    let mut config = EncoderConfig::new(16, 16, 3).with_distance(20.0);
    config.progressive_level = 0;
    config.force_baseline = true;
    let jpeg = encode(&pixels, 16, 16, 3, config);

    for &(kind, off) in &scan_markers(&jpeg) {
        if kind != 0xDB {
            continue;
        }
        let len = ((jpeg[off + 2] as usize) << 8) | jpeg[off + 3] as usize;
        let payload = &jpeg[off + 4..off + 2 + len];
        assert_eq!(payload[0] >> 4, 0, "8-bit precision expected");
        assert_eq!(payload.len(), 65);
        assert!(payload[1..].iter().all(|&v| v >= 1));
    }
}

#[test]
fn test_dht_precedes_each_scan_needing_tables() {
    let pixels = gradient_rgb(16, 16);
    let mut config = EncoderConfig::new(16, 16, 1).with_distance(1.0);
    config.progressive_level = 2;
    let gray: Vec<u8> = pixels.chunks(3).map(|p| p[0]).collect();
    let jpeg = encode(&gray, 16, 16, 1, config);

    let markers = scan_markers(&jpeg);
    // The DC-refinement-free level-2 script: every scan except none carries
    // symbols, so a DHT appears before the first scan at minimum.
    let first_dht = markers.iter().position(|&(k, _)| k == 0xC4).unwrap();
    let first_sos = markers.iter().position(|&(k, _)| k == 0xDA).unwrap();
    assert!(first_dht < first_sos);
}
