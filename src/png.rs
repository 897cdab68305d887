#![forbid(unsafe_code)]

//! The PNG codec: turns PNG data into 8-bit interleaved samples, and back.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! This is deliberately narrow. Whatever the stream holds, decoding always
//! gives one byte per sample, pixels in rows, channels of a pixel adjacent:
//!
//! * 16-bit samples keep only their high byte.
//! * 1, 2, and 4-bit greyscale is scaled up to the full 8-bit range by bit
//!   replication.
//! * Adam7 interlaced streams are put back into normal row order.
//! * Indexed color is rejected, and `tRNS` is ignored.
//!
//! Encoding always writes 8-bit samples, with the color type picked from the
//! channel count. Interlacing and compression level are picked with
//! [`PngEncodeOptions`].
//!
//! ## Parsing Errors
//!
//! We're strict where a mistake would give the wrong pixels (bad signature,
//! bad header, short or broken image data, unknown filter types) and lenient
//! about everything else: chunk ordering, duplicate chunks, CRCs, and the
//! Adler-32 of the zlib stream are not checked.

use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter, Write};

use bitfrob::u8_replicate_bits;
use bytemuck::{Pod, Zeroable};
use log::{trace, warn};
use miniz_oxide::inflate::{decompress_slice_iter_to_slice, TINFLStatus};

use crate::image::ChannelLayout;

mod crc32;
mod encode;
mod filter;

pub use encode::*;

#[cfg(test)]
mod tests;

/// The 8 bytes that every PNG data stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// An error from the PNG codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PngError {
  /// The data doesn't start with the PNG signature.
  BadSignature,
  /// No valid `IHDR` chunk was found.
  MissingHeader,
  /// No `IDAT` chunks were found.
  NoImageData,
  /// The image data ended before the whole image was filled in.
  Truncated,
  /// The compressed image data is broken.
  Corrupt,
  /// A scanline used a filter type other than 0 through 4.
  IllegalFilterType,
  /// The image uses indexed color.
  UnsupportedColorType,
  /// The declared width and/or height of this image is 0.
  WidthOrHeightZero,
  /// The image is larger than the [`DecodeLimits`] allow.
  DimensionsTooLarge,
  /// The samples given to the encoder don't match the size given.
  BadParameters,
  /// The allocator couldn't give us enough space.
  Alloc,
  /// A checked math operation failed.
  CheckedMath,
}
impl Display for PngError {
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    f.write_str(match self {
      Self::BadSignature => "the data is not a PNG image",
      Self::MissingHeader => "no image header",
      Self::NoImageData => "no image data",
      Self::Truncated => "image data is truncated",
      Self::Corrupt => "image data is corrupt",
      Self::IllegalFilterType => "illegal scanline filter type",
      Self::UnsupportedColorType => "indexed color is not supported",
      Self::WidthOrHeightZero => "width or height is zero",
      Self::DimensionsTooLarge => "image dimensions exceed the decode limits",
      Self::BadParameters => "bad parameters",
      Self::Alloc => "not enough memory",
      Self::CheckedMath => "image size overflowed",
    })
  }
}
#[cfg(feature = "std")]
impl std::error::Error for PngError {}
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}

/// Limits that the decoder enforces before allocating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeLimits {
  /// Largest width or height accepted.
  pub max_dimension: u32,
  /// Largest `width * height` accepted.
  pub max_pixels: u64,
  /// Largest number of bytes the decoder may allocate, counting both the
  /// inflated image data and the decoded samples.
  ///
  /// The default is enough for any 8-bit image within the other limits.
  pub max_alloc_bytes: u64,
}
impl Default for DecodeLimits {
  #[inline]
  fn default() -> Self {
    Self { max_dimension: 17_000, max_pixels: 1 << 28, max_alloc_bytes: 1 << 31 }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
struct PngRawChunkType([u8; 4]);
#[allow(nonstandard_style)]
impl PngRawChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
}
impl Debug for PngRawChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for ch in self.0.iter().copied().map(|u| u as char) {
      f.write_char(ch)?;
    }
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PngRawChunk<'b> {
  type_: PngRawChunkType,
  data: &'b [u8],
}
impl Debug for PngRawChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngRawChunk")
      .field("type_", &self.type_)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .finish()
  }
}

/// Produces successive raw chunks from PNG bytes.
///
/// A chunk that claims more bytes than remain is given with whatever data is
/// there, and then the iteration ends. That way a cut off `IDAT` shows up as
/// short image data rather than no image data.
#[derive(Debug, Clone)]
struct PngRawChunkIter<'b>(&'b [u8]);
impl<'b> PngRawChunkIter<'b> {
  /// Pass the full PNG bytes, the signature is skipped automatically.
  const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }

  fn split_off(&mut self, n: usize) -> Option<&'b [u8]> {
    if self.0.len() >= n {
      let (head, tail) = self.0.split_at(n);
      self.0 = tail;
      Some(head)
    } else {
      self.0 = &[];
      None
    }
  }

  fn split_off_array<const N: usize>(&mut self) -> Option<[u8; N]> {
    self.split_off(N)?.try_into().ok()
  }
}
impl<'b> Iterator for PngRawChunkIter<'b> {
  type Item = PngRawChunk<'b>;
  fn next(&mut self) -> Option<Self::Item> {
    let chunk_len = u32::from_be_bytes(self.split_off_array()?);
    let type_ = PngRawChunkType(self.split_off_array()?);
    if self.0.len() < chunk_len as usize {
      let partial = core::mem::take(&mut self.0);
      return Some(PngRawChunk { type_, data: partial });
    }
    let data = self.split_off(chunk_len as usize)?;
    // the CRC isn't checked, and a missing one is just the end of the data.
    let _declared_crc: Option<[u8; 4]> = self.split_off_array();
    Some(PngRawChunk { type_, data })
  }
}

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// The PNG color type used to store samples in this layout.
  #[inline]
  #[must_use]
  pub const fn from_layout(layout: ChannelLayout) -> Self {
    match layout {
      ChannelLayout::Y => Self::Y,
      ChannelLayout::YA => Self::YA,
      ChannelLayout::RGB => Self::RGB,
      ChannelLayout::RGBA => Self::RGBA,
    }
  }

  /// The layout of decoded samples, or `None` for indexed color.
  #[inline]
  #[must_use]
  pub const fn to_layout(self) -> Option<ChannelLayout> {
    match self {
      Self::Y => Some(ChannelLayout::Y),
      Self::YA => Some(ChannelLayout::YA),
      Self::RGB => Some(ChannelLayout::RGB),
      Self::RGBA => Some(ChannelLayout::RGBA),
      Self::Index => None,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = ();
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(()),
    })
  }
}

/// The `IHDR` payload exactly as it's laid out in the file.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct RawIhdr {
  width: [u8; 4],
  height: [u8; 4],
  bit_depth: u8,
  color_type: u8,
  compression_method: u8,
  filter_method: u8,
  interlace_method: u8,
}

/// Image Header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored with Adam7 interlacing.
  pub is_interlaced: bool,
}
impl IHDR {
  /// Bytes per complete pixel, rounded up to 1. This is the distance that
  /// scanline filters look back.
  #[inline]
  #[must_use]
  pub const fn filter_chunk_size(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  #[inline]
  #[must_use]
  const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Each line is a filter byte (1) + pixel data. When pixels are less than 8
  /// bits it's possible to end up with partial bytes on the end, so we must
  /// round up.
  #[inline]
  #[must_use]
  const fn bytes_per_scanline(&self, width: u32) -> usize {
    (self.bits_per_pixel().saturating_mul(width as usize)).saturating_add(7) / 8
  }

  /// Gets the buffer size required to perform Zlib decompression.
  ///
  /// This saturates instead of overflowing, so a silly header gives a size
  /// that just fails to allocate.
  #[must_use]
  pub fn get_zlib_decompression_requirement(&self) -> usize {
    self
      .reduced_images()
      .map(|(_, w, h)| {
        if w == 0 || h == 0 {
          0
        } else {
          self.bytes_per_scanline(w).saturating_add(1).saturating_mul(h as usize)
        }
      })
      .fold(0_usize, usize::saturating_add)
  }

  /// Iterates `(image_level, width, height)` of each image stored in the
  /// data: the full image (level 0) when not interlaced, or reduced images 1
  /// through 7 when interlaced.
  fn reduced_images(&self) -> impl Iterator<Item = (usize, u32, u32)> {
    let levels = if self.is_interlaced { 1..8 } else { 0..1 };
    let dims = reduced_image_dimensions(self.width, self.height);
    levels.map(move |i| (i, dims[i].0, dims[i].1))
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = ();
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    let raw: RawIhdr = bytemuck::try_pod_read_unaligned(value).map_err(|_| ())?;
    if raw.compression_method != 0 || raw.filter_method != 0 {
      return Err(());
    }
    let bit_depth = raw.bit_depth;
    Ok(Self {
      width: u32::from_be_bytes(raw.width),
      height: u32::from_be_bytes(raw.height),
      bit_depth: match raw.color_type {
        0 if [1, 2, 4, 8, 16].contains(&bit_depth) => bit_depth,
        2 if [8, 16].contains(&bit_depth) => bit_depth,
        3 if [1, 2, 4, 8].contains(&bit_depth) => bit_depth,
        4 if [8, 16].contains(&bit_depth) => bit_depth,
        6 if [8, 16].contains(&bit_depth) => bit_depth,
        _ => return Err(()),
      },
      color_type: PngColorType::try_from(raw.color_type)?,
      is_interlaced: match raw.interlace_method {
        0 => false,
        1 => true,
        _ => return Err(()),
      },
    })
  }
}
impl From<&IHDR> for RawIhdr {
  #[inline]
  fn from(ihdr: &IHDR) -> Self {
    Self {
      width: ihdr.width.to_be_bytes(),
      height: ihdr.height.to_be_bytes(),
      bit_depth: ihdr.bit_depth,
      color_type: ihdr.color_type as u8,
      compression_method: 0,
      filter_method: 0,
      interlace_method: ihdr.is_interlaced as u8,
    }
  }
}

/// Checks if the PNG's initial 8 bytes are correct.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Gets the [IHDR] out of the PNG bytes.
#[must_use]
pub fn png_get_header(bytes: &[u8]) -> Option<IHDR> {
  PngRawChunkIter::new(bytes)
    .find(|raw_chunk| raw_chunk.type_ == PngRawChunkType::IHDR)
    .and_then(|raw_chunk| IHDR::try_from(raw_chunk.data).ok())
}

/// Gets an iterator over all the `IDAT` slices in the PNG bytes.
pub fn png_get_idat(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
  PngRawChunkIter::new(bytes)
    .filter(|raw_chunk| raw_chunk.type_ == PngRawChunkType::IDAT)
    .map(|raw_chunk| raw_chunk.data)
}

/// Given the dimensions of the full PNG image, computes the size of each
/// reduced image.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
#[inline]
#[must_use]
const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  // ```
  // 1 6 4 6 2 6 4 6
  // 7 7 7 7 7 7 7 7
  // 5 6 5 6 5 6 5 6
  // 7 7 7 7 7 7 7 7
  // 3 6 4 6 3 6 4 6
  // 7 7 7 7 7 7 7 7
  // 5 6 5 6 5 6 5 6
  // 7 7 7 7 7 7 7 7
  // ```
  let full_patterns_wide = full_width / 8;
  let full_patterns_high = full_height / 8;
  //
  let partial_pattern_width = full_width % 8;
  let partial_pattern_height = full_height % 8;
  //
  let zero = (full_width, full_height);
  //
  let first = (
    full_patterns_wide + (partial_pattern_width + 7) / 8,
    full_patterns_high + (partial_pattern_height + 7) / 8,
  );
  let second = (
    full_patterns_wide + (partial_pattern_width + 3) / 8,
    full_patterns_high + (partial_pattern_height + 7) / 8,
  );
  let third = (
    full_patterns_wide * 2 + ((partial_pattern_width + 3) / 4),
    full_patterns_high + ((partial_pattern_height + 3) / 8),
  );
  let fourth = (
    full_patterns_wide * 2 + (partial_pattern_width + 1) / 4,
    full_patterns_high * 2 + (partial_pattern_height + 3) / 4,
  );
  let fifth = (
    full_patterns_wide * 4 + ((partial_pattern_width + 1) / 2),
    full_patterns_high * 2 + (partial_pattern_height + 1) / 4,
  );
  let sixth = (
    full_patterns_wide * 4 + partial_pattern_width / 2,
    full_patterns_high * 4 + ((partial_pattern_height + 1) / 2),
  );
  let seventh = (
    full_patterns_wide * 8 + partial_pattern_width,
    full_patterns_high * 4 + (partial_pattern_height / 2),
  );
  //
  [zero, first, second, third, fourth, fifth, sixth, seventh]
}

/// Converts a reduced image location into the full image location.
///
/// An `image_level` of 0 is the full image, so the output is the input.
///
/// ## Panics
/// * If the image level given exceeds 7.
#[inline]
#[must_use]
#[allow(clippy::identity_op)]
const fn interlaced_pos_to_full_pos(
  image_level: usize, reduced_x: u32, reduced_y: u32,
) -> (u32, u32) {
  match image_level {
    0 /* full image */ => (reduced_x, reduced_y),
    1 => (reduced_x * 8 + 0, reduced_y * 8 + 0),
    2 => (reduced_x * 8 + 4, reduced_y * 8 + 0),
    3 => (reduced_x * 4 + 0, reduced_y * 8 + 4),
    4 => (reduced_x * 4 + 2, reduced_y * 4 + 0),
    5 => (reduced_x * 2 + 0, reduced_y * 4 + 2),
    6 => (reduced_x * 2 + 1, reduced_y * 2 + 0),
    7 => (reduced_x * 1 + 0, reduced_y * 2 + 1),
    _ => panic!("reduced image level must be 1 through 7")
  }
}

impl IHDR {
  /// Sends each pixel of one unfiltered scanline to `op` as `(x, y, data)`,
  /// with `x` and `y` already in full image coordinates.
  ///
  /// * Bit depths 1, 2, and 4 give the value in the low bits of a one byte
  ///   slice.
  /// * Bit depth 8 gives one byte per channel.
  /// * Bit depth 16 gives two big-endian bytes per channel.
  fn send_out_scanline<F: FnMut(u32, u32, &[u8])>(
    &self, image_level: usize, reduced_y: u32, reduced_width: u32, line: &[u8], op: &mut F,
  ) {
    match self.bit_depth {
      depth @ (1 | 2 | 4) => {
        let depth = u32::from(depth);
        let per_byte = 8 / depth;
        let mask = (1_u8 << depth) - 1;
        let pixel_it = line
          .iter()
          .flat_map(|&byte| (0..per_byte).rev().map(move |i| (byte >> (i * depth)) & mask));
        // anything past the reduced width is padding bits.
        for (reduced_x, value) in (0..reduced_width).zip(pixel_it) {
          let (x, y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y);
          op(x, y, &[value]);
        }
      }
      _ => {
        for (reduced_x, pixel) in
          (0..reduced_width).zip(line.chunks_exact(self.filter_chunk_size()))
        {
          let (x, y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y);
          op(x, y, pixel);
        }
      }
    }
  }

  /// Unfilters data from the zlib decompression buffer, sending every pixel
  /// to `op(x, y, data)` as it's finished.
  ///
  /// ## Failure
  /// * The buffer is shorter than the header says the image data should be.
  /// * A scanline has an illegal filter type.
  pub fn unfilter_decompressed_data<F>(
    &self, mut decompressed: &mut [u8], mut op: F,
  ) -> Result<(), PngError>
  where
    F: FnMut(u32, u32, &[u8]),
  {
    if self.width == 0 || self.height == 0 {
      return Err(PngError::WidthOrHeightZero);
    }
    let filter_chunk_size = self.filter_chunk_size();

    // From here on we're "always" working with reduced images: a
    // non-interlaced image is just the one reduced image at level 0.
    for (image_level, reduced_width, reduced_height) in self.reduced_images() {
      if reduced_width == 0 || reduced_height == 0 {
        // the full image can't be empty, but a reduced image can be.
        continue;
      }
      let bytes_per_filterline = self.bytes_per_scanline(reduced_width) + 1;
      let bytes_used_this_image = bytes_per_filterline.saturating_mul(reduced_height as usize);
      if decompressed.len() < bytes_used_this_image {
        return Err(PngError::Truncated);
      }
      let (these_bytes, more_bytes) =
        core::mem::take(&mut decompressed).split_at_mut(bytes_used_this_image);
      decompressed = more_bytes;

      // the line before the first line is implied zeroes.
      let mut previous: &[u8] = &[];
      for (reduced_y, filterline) in
        these_bytes.chunks_exact_mut(bytes_per_filterline).enumerate()
      {
        let (filter_type, line) = match filterline.split_first_mut() {
          Some((f, line)) => (*f, line),
          None => return Err(PngError::Truncated),
        };
        filter::reconstruct_line(filter_type, line, previous, filter_chunk_size)?;
        self.send_out_scanline(image_level, reduced_y as u32, reduced_width, line, &mut op);
        previous = line;
      }
    }
    Ok(())
  }
}

/// PNG data decoded into 8-bit interleaved samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPng {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// the channels of each pixel
  pub layout: ChannelLayout,
  /// `width * height * channels` samples, in `(row, col, channel)` order.
  pub samples: Vec<u8>,
}

#[inline]
fn try_zeroed_vec(len: usize) -> Result<Vec<u8>, PngError> {
  let mut v = Vec::new();
  v.try_reserve_exact(len)?;
  v.resize(len, 0);
  Ok(v)
}

/// Decodes PNG bytes with the default [`DecodeLimits`].
#[inline]
pub fn png_decode(bytes: &[u8]) -> Result<DecodedPng, PngError> {
  png_decode_with_limits(bytes, &DecodeLimits::default())
}

/// Decodes PNG bytes into 8-bit interleaved samples.
///
/// See the [module docs](crate::png) for how the various PNG sample formats
/// are normalized.
pub fn png_decode_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<DecodedPng, PngError> {
  if !is_png_header_correct(bytes) {
    return Err(PngError::BadSignature);
  }
  let ihdr = png_get_header(bytes).ok_or(PngError::MissingHeader)?;
  trace!("png_decode: {ihdr:?}");
  if ihdr.width == 0 || ihdr.height == 0 {
    return Err(PngError::WidthOrHeightZero);
  }
  if ihdr.width > limits.max_dimension
    || ihdr.height > limits.max_dimension
    || u64::from(ihdr.width) * u64::from(ihdr.height) > limits.max_pixels
  {
    return Err(PngError::DimensionsTooLarge);
  }
  let layout = ihdr.color_type.to_layout().ok_or(PngError::UnsupportedColorType)?;
  let mut idat_it = png_get_idat(bytes).peekable();
  if idat_it.peek().is_none() {
    return Err(PngError::NoImageData);
  }

  let nc = layout.channel_count();
  let sample_count = (ihdr.width as usize)
    .checked_mul(ihdr.height as usize)
    .and_then(|n| n.checked_mul(nc))
    .ok_or(PngError::CheckedMath)?;
  let zlib_len = ihdr.get_zlib_decompression_requirement();
  let alloc_bytes = (zlib_len as u64).saturating_add(sample_count as u64);
  if alloc_bytes > limits.max_alloc_bytes {
    trace!("png_decode: needs {alloc_bytes} bytes, limit is {}", limits.max_alloc_bytes);
    return Err(PngError::DimensionsTooLarge);
  }
  let mut zlib_buffer = try_zeroed_vec(zlib_len)?;
  match decompress_slice_iter_to_slice(&mut zlib_buffer, idat_it, true, true) {
    Ok(count) if count < zlib_len => {
      trace!("png_decode: inflated {count} of {zlib_len} bytes");
      return Err(PngError::Truncated);
    }
    Ok(_) => (),
    Err(TINFLStatus::HasMoreOutput) => {
      warn!("png_decode: extra compressed image data after {zlib_len} bytes, ignoring it");
    }
    Err(TINFLStatus::FailedCannotMakeProgress) | Err(TINFLStatus::NeedsMoreInput) => {
      return Err(PngError::Truncated);
    }
    Err(e) => {
      trace!("png_decode: inflate failed: {e:?}");
      return Err(PngError::Corrupt);
    }
  }
  if !PngRawChunkIter::new(bytes).any(|raw_chunk| raw_chunk.type_ == PngRawChunkType::IEND) {
    warn!("png_decode: no IEND chunk, the image data was complete so continuing anyway");
  }

  let mut samples = try_zeroed_vec(sample_count)?;
  let width = ihdr.width as usize;
  let bit_depth = ihdr.bit_depth;
  ihdr.unfilter_decompressed_data(&mut zlib_buffer, |x, y, data| {
    let i = (y as usize * width + x as usize) * nc;
    let Some(pixel) = samples.get_mut(i..i + nc) else {
      return;
    };
    match bit_depth {
      16 => {
        if let Ok(pairs) = bytemuck::try_cast_slice::<u8, [u8; 2]>(data) {
          pixel.iter_mut().zip(pairs).for_each(|(p, [hi, _lo])| *p = *hi);
        }
      }
      8 => pixel.copy_from_slice(data),
      low => pixel[0] = u8_replicate_bits(u32::from(low), data[0]),
    }
  })?;

  Ok(DecodedPng { width: ihdr.width, height: ihdr.height, layout, samples })
}
