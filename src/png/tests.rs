use super::*;
use crate::png::crc32::png_chunk_crc;
use alloc::vec;
use miniz_oxide::deflate::compress_to_vec_zlib;

/// Assembles a PNG by hand from header fields and already filtered scanlines.
fn build_png(
  width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8, filtered: &[u8],
) -> Vec<u8> {
  let mut ihdr = Vec::new();
  ihdr.extend_from_slice(&width.to_be_bytes());
  ihdr.extend_from_slice(&height.to_be_bytes());
  ihdr.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
  let idat = compress_to_vec_zlib(filtered, 6);
  let mut out = PNG_SIGNATURE.to_vec();
  for (type_, data) in [(*b"IHDR", &ihdr[..]), (*b"IDAT", &idat[..]), (*b"IEND", &[][..])] {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&type_);
    out.extend_from_slice(data);
    out.extend_from_slice(&png_chunk_crc(type_, data).to_be_bytes());
  }
  out
}

/// Deterministic noise, so that the filters and deflate have real work to do.
fn noise(len: usize, mut seed: u32) -> Vec<u8> {
  (0..len)
    .map(|_| {
      seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
      (seed >> 24) as u8
    })
    .collect()
}

#[test]
fn test_reduced_image_dimensions() {
  assert_eq!(reduced_image_dimensions(0, 0), [(0, 0); 8]);
  for (w, ex) in (1..=8).zip([0, 0, 0, 0, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(w, 0)[2].0, ex, "failed w:{w}");
  }
  for (h, ex) in (1..=8).zip([0, 0, 0, 0, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(0, h)[3].1, ex, "failed h: {h}");
  }
  for (w, ex) in (1..=8).zip([0, 1, 1, 2, 2, 3, 3, 4]) {
    assert_eq!(reduced_image_dimensions(w, 0)[6].0, ex, "failed w: {w}");
  }
  for (h, ex) in (1..=8).zip([0, 1, 1, 2, 2, 3, 3, 4]) {
    assert_eq!(reduced_image_dimensions(0, h)[7].1, ex, "failed h: {h}");
  }
  assert_eq!(
    reduced_image_dimensions(8, 8),
    [(8, 8), (1, 1), (1, 1), (2, 1), (2, 2), (4, 2), (4, 4), (8, 4)]
  );
}

#[test]
fn test_adam7_passes_cover_every_pixel_once() {
  for (width, height) in [(1, 1), (2, 2), (3, 5), (8, 8), (9, 1), (13, 17)] {
    let mut seen = vec![0_u8; (width * height) as usize];
    let dims = reduced_image_dimensions(width, height);
    for level in 1..8 {
      let (rw, rh) = dims[level];
      for ry in 0..rh {
        for rx in 0..rw {
          let (x, y) = interlaced_pos_to_full_pos(level, rx, ry);
          assert!(x < width && y < height, "{width}x{height} level {level}: ({x},{y})");
          seen[(y * width + x) as usize] += 1;
        }
      }
    }
    assert!(seen.iter().all(|&n| n == 1), "{width}x{height}: {seen:?}");
  }
}

#[test]
fn test_encode_decode_round_trip() {
  let layouts = [ChannelLayout::Y, ChannelLayout::YA, ChannelLayout::RGB, ChannelLayout::RGBA];
  for layout in layouts {
    for (width, height) in [(1, 1), (2, 2), (3, 5), (9, 9), (31, 4)] {
      let len = (width * height) as usize * layout.channel_count();
      let samples = noise(len, width * 31 + height);
      for interlace in [false, true] {
        let options = PngEncodeOptions { interlace, ..Default::default() };
        let png = png_encode(&samples, width, height, layout, &options).unwrap();
        let header = png_get_header(&png).unwrap();
        assert_eq!(header.is_interlaced, interlace);
        assert_eq!(header.bit_depth, 8);
        assert_eq!(header.color_type, PngColorType::from_layout(layout));
        let decoded = png_decode(&png).unwrap();
        assert_eq!(
          decoded,
          DecodedPng { width, height, layout, samples: samples.clone() },
          "{layout:?} {width}x{height} interlace:{interlace}"
        );
      }
    }
  }
}

#[test]
fn test_encode_writes_valid_chunks() {
  // store-only noise is big enough to need several IDAT chunks.
  let samples = noise(200 * 100 * 4, 7);
  let options = PngEncodeOptions { interlace: false, compression_level: 0 };
  let png = png_encode(&samples, 200, 100, ChannelLayout::RGBA, &options).unwrap();
  assert!(is_png_header_correct(&png));

  let mut rest = &png[8..];
  let mut types = Vec::new();
  while !rest.is_empty() {
    let len = u32::from_be_bytes(rest[..4].try_into().unwrap()) as usize;
    let type_: [u8; 4] = rest[4..8].try_into().unwrap();
    let data = &rest[8..8 + len];
    let crc = u32::from_be_bytes(rest[8 + len..12 + len].try_into().unwrap());
    assert_eq!(crc, png_chunk_crc(type_, data), "{:?}", PngRawChunkType(type_));
    types.push(type_);
    rest = &rest[12 + len..];
  }
  assert_eq!(types.first(), Some(b"IHDR"));
  assert_eq!(types.last(), Some(b"IEND"));
  assert!(types.iter().filter(|t| *t == b"IDAT").count() > 1);
  assert_eq!(png_decode(&png).unwrap().samples, samples);
}

#[test]
fn test_encode_rejects_bad_sizes() {
  let opts = PngEncodeOptions::default();
  let bad = Err(PngError::BadParameters);
  assert_eq!(png_encode(&[1, 2, 3], 0, 1, ChannelLayout::RGB, &opts), bad);
  assert_eq!(png_encode(&[1, 2, 3], 2, 1, ChannelLayout::RGB, &opts), bad);
  assert_eq!(png_encode(&[1, 2, 3], 1, 1, ChannelLayout::Y, &opts), bad);
}

#[test]
fn test_decode_low_bit_depths() {
  // 1-bit, 3x2: the padding bits of each byte are ignored.
  let png = build_png(3, 2, 1, 0, 0, &[0, 0b1011_1111, 0, 0b0100_0000]);
  assert_eq!(png_decode(&png).unwrap().samples, [255, 0, 255, 0, 255, 0]);

  let png = build_png(4, 1, 2, 0, 0, &[0, 0b00_01_10_11]);
  assert_eq!(png_decode(&png).unwrap().samples, [0, 0x55, 0xAA, 0xFF]);

  let png = build_png(2, 1, 4, 0, 0, &[0, 0x7F]);
  assert_eq!(png_decode(&png).unwrap().samples, [0x77, 0xFF]);
}

#[test]
fn test_decode_16_bit_keeps_high_byte() {
  let png = build_png(1, 1, 16, 2, 0, &[0, 0x12, 0x34, 0xAB, 0xCD, 0xFF, 0x00]);
  let decoded = png_decode(&png).unwrap();
  assert_eq!(decoded.layout, ChannelLayout::RGB);
  assert_eq!(decoded.samples, [0x12, 0xAB, 0xFF]);

  // Sub filter on 16-bit data looks back a whole 2 byte pixel.
  let png = build_png(2, 1, 16, 0, 0, &[1, 10, 200, 5, 100]);
  assert_eq!(png_decode(&png).unwrap().samples, [10, 15]);
}

#[test]
fn test_decode_gray_alpha() {
  let png = build_png(2, 1, 8, 4, 0, &[0, 10, 20, 30, 40]);
  let decoded = png_decode(&png).unwrap();
  assert_eq!(decoded.layout, ChannelLayout::YA);
  assert_eq!(decoded.samples, [10, 20, 30, 40]);
}

#[test]
fn test_decode_errors() {
  let good = build_png(1, 1, 8, 0, 0, &[0, 9]);
  assert_eq!(png_decode(&good).unwrap().samples, [9]);

  let mut bad_sig = good.clone();
  bad_sig[1] = b'Q';
  assert_eq!(png_decode(&bad_sig), Err(PngError::BadSignature));
  assert_eq!(png_decode(&[]), Err(PngError::BadSignature));

  assert_eq!(png_decode(&PNG_SIGNATURE), Err(PngError::MissingHeader));

  let indexed = build_png(1, 1, 8, 3, 0, &[0, 0]);
  assert_eq!(png_decode(&indexed), Err(PngError::UnsupportedColorType));

  let short = build_png(4, 4, 8, 0, 0, &[0, 1, 2, 3, 4]);
  assert_eq!(png_decode(&short), Err(PngError::Truncated));

  let bad_filter = build_png(1, 1, 8, 0, 0, &[7, 9]);
  assert_eq!(png_decode(&bad_filter), Err(PngError::IllegalFilterType));

  let zero = build_png(0, 1, 8, 0, 0, &[0]);
  assert_eq!(png_decode(&zero), Err(PngError::WidthOrHeightZero));

  // signature + IHDR only
  let no_idat = &good[..8 + 12 + 13];
  assert_eq!(png_decode(no_idat), Err(PngError::NoImageData));

  // cut inside the IDAT length or type, so there's no IDAT at all
  let idat_start = 8 + 12 + 13;
  for cut in idat_start..idat_start + 8 {
    assert_eq!(png_decode(&good[..cut]), Err(PngError::NoImageData), "cut at {cut}");
  }
  // cut inside the compressed data, leaving the zlib trailer alone
  let data_end = good.len() - 12 - 4;
  for cut in idat_start + 8..data_end - 4 {
    assert_eq!(png_decode(&good[..cut]), Err(PngError::Truncated), "cut at {cut}");
  }
  // only the CRC is cut, the data itself is whole
  assert_eq!(png_decode(&good[..data_end + 2]).unwrap().samples, [9]);
}

#[test]
fn test_decode_tolerates_missing_iend() {
  let good = build_png(2, 1, 8, 0, 0, &[0, 9, 8]);
  let no_iend = &good[..good.len() - 12];
  assert_eq!(png_decode(no_iend).unwrap().samples, [9, 8]);
}

#[test]
fn test_decode_limits() {
  let big = build_png(17_001, 1, 8, 0, 0, &[]);
  assert_eq!(png_decode(&big), Err(PngError::DimensionsTooLarge));

  let png = build_png(4, 4, 8, 0, 0, &[0; 20]);
  assert!(png_decode(&png).is_ok());
  let tight = DecodeLimits { max_dimension: 4, max_pixels: 15, ..Default::default() };
  assert_eq!(png_decode_with_limits(&png, &tight), Err(PngError::DimensionsTooLarge));
  let loose = DecodeLimits { max_dimension: 4, max_pixels: 16, ..Default::default() };
  assert!(png_decode_with_limits(&png, &loose).is_ok());

  // (4 + 1) * 4 inflated bytes plus 16 samples
  let exact = DecodeLimits { max_alloc_bytes: 36, ..Default::default() };
  assert!(png_decode_with_limits(&png, &exact).is_ok());
  let short = DecodeLimits { max_alloc_bytes: 35, ..Default::default() };
  assert_eq!(png_decode_with_limits(&png, &short), Err(PngError::DimensionsTooLarge));
}

#[test]
fn test_tiny_file_with_huge_header_allocates_nothing() {
  // 16000x16000 RGBA at 16 bits passes the dimension and pixel limits, but
  // would need about 3 GB of buffers.
  let png = build_png(16_000, 16_000, 16, 6, 0, &[]);
  assert!(png.len() < 100, "{}", png.len());
  assert_eq!(png_decode(&png), Err(PngError::DimensionsTooLarge));

  // with no IDAT the answer comes before any size is even considered.
  let no_idat = &png[..8 + 12 + 13];
  let unlimited = DecodeLimits { max_alloc_bytes: u64::MAX, ..Default::default() };
  assert_eq!(png_decode_with_limits(no_idat, &unlimited), Err(PngError::NoImageData));
}
