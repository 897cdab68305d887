use alloc::vec::Vec;

use log::trace;
use miniz_oxide::deflate::compress_to_vec_zlib;

use super::{
  crc32::png_chunk_crc, filter::filter_line_adaptive, interlaced_pos_to_full_pos,
  PngColorType, PngError, PngRawChunkType, RawIhdr, IHDR, PNG_SIGNATURE,
};
use crate::image::ChannelLayout;

/// The most image data bytes written into a single `IDAT` chunk.
const IDAT_CHUNK_LIMIT: usize = 1 << 15;

/// How [`png_encode`] should write an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngEncodeOptions {
  /// Store the image with Adam7 interlacing.
  pub interlace: bool,
  /// zlib compression level, 0 (store) through 10. Higher values are clamped.
  pub compression_level: u8,
}
impl Default for PngEncodeOptions {
  #[inline]
  fn default() -> Self {
    Self { interlace: true, compression_level: 6 }
  }
}

fn push_chunk(out: &mut Vec<u8>, type_: PngRawChunkType, data: &[u8]) -> Result<(), PngError> {
  let len = u32::try_from(data.len()).map_err(|_| PngError::CheckedMath)?;
  out.try_reserve(12 + data.len())?;
  out.extend_from_slice(&len.to_be_bytes());
  out.extend_from_slice(&type_.0);
  out.extend_from_slice(data);
  out.extend_from_slice(&png_chunk_crc(type_.0, data).to_be_bytes());
  Ok(())
}

/// Encodes 8-bit interleaved samples as PNG bytes.
///
/// `samples` holds `width * height * layout.channel_count()` bytes in
/// `(row, col, channel)` order. The output is always 8 bits per sample, with
/// the color type picked from the layout.
///
/// ## Failure
/// * `width` or `height` is 0, or the sample count doesn't match.
pub fn png_encode(
  samples: &[u8], width: u32, height: u32, layout: ChannelLayout, options: &PngEncodeOptions,
) -> Result<Vec<u8>, PngError> {
  if width == 0 || height == 0 {
    return Err(PngError::BadParameters);
  }
  let nc = layout.channel_count();
  let full_row_len = (width as usize).checked_mul(nc).ok_or(PngError::CheckedMath)?;
  let expected = full_row_len.checked_mul(height as usize).ok_or(PngError::CheckedMath)?;
  if samples.len() != expected {
    return Err(PngError::BadParameters);
  }
  let ihdr = IHDR {
    width,
    height,
    bit_depth: 8,
    color_type: PngColorType::from_layout(layout),
    is_interlaced: options.interlace,
  };
  trace!("png_encode: {ihdr:?}");

  let mut filtered = Vec::new();
  filtered.try_reserve(ihdr.get_zlib_decompression_requirement())?;
  let (mut line, mut previous) = (Vec::new(), Vec::new());
  let (mut scratch, mut best) = (Vec::new(), Vec::new());
  for (image_level, reduced_width, reduced_height) in ihdr.reduced_images() {
    if reduced_width == 0 || reduced_height == 0 {
      continue;
    }
    // each reduced image starts over with an all-zero line above.
    previous.clear();
    for reduced_y in 0..reduced_height {
      line.clear();
      if image_level == 0 {
        let start = reduced_y as usize * full_row_len;
        line.extend_from_slice(&samples[start..start + full_row_len]);
      } else {
        for reduced_x in 0..reduced_width {
          let (x, y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y);
          let i = (y as usize * width as usize + x as usize) * nc;
          line.extend_from_slice(&samples[i..i + nc]);
        }
      }
      filter_line_adaptive(&line, &previous, nc, &mut filtered, &mut scratch, &mut best);
      core::mem::swap(&mut line, &mut previous);
    }
  }

  let level = options.compression_level.min(10);
  let compressed = compress_to_vec_zlib(&filtered, level);
  trace!(
    "png_encode: deflated {} filtered bytes to {} at level {level}",
    filtered.len(),
    compressed.len()
  );
  drop(filtered);

  let mut out = Vec::new();
  out.try_reserve(PNG_SIGNATURE.len() + 25 + compressed.len() + 12 * 2)?;
  out.extend_from_slice(&PNG_SIGNATURE);
  push_chunk(&mut out, PngRawChunkType::IHDR, bytemuck::bytes_of(&RawIhdr::from(&ihdr)))?;
  for idat in compressed.chunks(IDAT_CHUNK_LIMIT) {
    push_chunk(&mut out, PngRawChunkType::IDAT, idat)?;
  }
  push_chunk(&mut out, PngRawChunkType::IEND, &[])?;
  Ok(out)
}
