#![forbid(unsafe_code)]

//! Reading and writing PNG data as planar images.
//!
//! A read decodes the PNG into 8-bit interleaved samples, splits those into
//! planes, applies the requested [`ColorModel`], and finally converts to the
//! sample type the caller asked for. A write goes the other way: convert to
//! bytes, interleave, encode.
//!
//! Every write produces 8 bits per sample, whatever the input type was.
//!
//! ```no_run
//! # fn main() -> Result<(), planar_png::PlanarPngError> {
//! use planar_png::{read_png, write_png, ColorModel, PlanarImage};
//! let image: PlanarImage<f32> = read_png("input.png", ColorModel::Gray)?;
//! assert_eq!(image.channels(), 1);
//! write_png("output.png", &image)?;
//! # Ok(())
//! # }
//! ```

use alloc::vec::Vec;

use log::debug;

use crate::{
  color_model::{apply_color_model, ColorModel},
  image::{checked_image_len, checked_plane_len, ChannelLayout, PlanarImage},
  layout::{deinterlace, interlace},
  png::{png_decode, png_encode, DecodedPng, PngEncodeOptions},
  sample::{samples_from_bytes, samples_to_bytes, Sample},
  PlanarPngError, PlanarPngResult,
};

/// A crate name and version string, such as `"planar_png 0.1.0"`.
#[inline]
#[must_use]
pub const fn version_info() -> &'static str {
  concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

/// Reads PNG bytes into a planar image of `T` samples.
///
/// ## Failure
/// * The PNG codec rejects the data (see [`PngError`](crate::png::PngError)).
/// * Allocation failure.
pub fn read_png_bytes<T: Sample>(
  bytes: &[u8], model: ColorModel,
) -> PlanarPngResult<PlanarImage<T>> {
  let DecodedPng { width, height, layout, samples } = png_decode(bytes)?;
  debug!("read_png_bytes: {width}x{height} {layout:?} from {} bytes", bytes.len());
  let plane_len = checked_plane_len(width, height)?;
  let mut planar = deinterlace(&samples, plane_len, layout.channel_count())?;
  drop(samples);
  let layout = apply_color_model(&mut planar, layout, model)?;
  if model != ColorModel::Unchanged {
    debug!("read_png_bytes: applied {model:?}, now {layout:?}");
  }
  PlanarImage::new(width, height, layout, samples_from_bytes(&planar))
}

/// Encodes a planar buffer that isn't wrapped in a [`PlanarImage`].
///
/// `samples` holds `channels` planes of `width * height` samples each.
///
/// ## Failure
/// * `width` or `height` is 0, `channels` isn't `1..=4`, or the buffer length
///   doesn't match.
/// * Allocation failure.
pub fn write_planar_png_bytes<T: Sample>(
  samples: &[T], width: u32, height: u32, channels: usize, options: &PngEncodeOptions,
) -> PlanarPngResult<Vec<u8>> {
  let layout = ChannelLayout::try_from(channels)?;
  if checked_image_len(width, height, layout)? != samples.len() {
    return Err(PlanarPngError::BadParameters);
  }
  debug!("write_planar_png_bytes: {width}x{height} {layout:?} {options:?}");
  let plane_len = checked_plane_len(width, height)?;
  let bytes = samples_to_bytes(samples);
  let interleaved = interlace(&bytes, plane_len, channels)?;
  drop(bytes);
  Ok(png_encode(&interleaved, width, height, layout, options)?)
}

/// Encodes a planar image as PNG bytes.
#[inline]
pub fn write_png_bytes<T: Sample>(
  image: &PlanarImage<T>, options: &PngEncodeOptions,
) -> PlanarPngResult<Vec<u8>> {
  write_planar_png_bytes(image.samples(), image.width(), image.height(), image.channels(), options)
}

#[cfg(feature = "std")]
mod std_io {
  use std::{
    io::{Read, Write},
    path::Path,
  };

  use super::*;

  /// The path that means stdin for a read, or stdout for a write.
  const STDIO_PATH: &str = "-";

  pub(super) fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
  }

  /// Reads all of a stream as PNG data.
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub fn read_png_from<T: Sample, R: Read>(
    mut reader: R, model: ColorModel,
  ) -> PlanarPngResult<PlanarImage<T>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    read_png_bytes(&bytes, model)
  }

  /// Encodes the image and writes all of it to a stream.
  ///
  /// Nothing is written if encoding fails.
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub fn write_png_to<T: Sample, W: Write>(
    mut writer: W, image: &PlanarImage<T>, options: &PngEncodeOptions,
  ) -> PlanarPngResult<()> {
    let png = write_png_bytes(image, options)?;
    writer.write_all(&png)?;
    writer.flush()?;
    Ok(())
  }

  /// Reads a PNG file. A path of `-` reads from stdin.
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub fn read_png<T: Sample, P: AsRef<Path>>(
    path: P, model: ColorModel,
  ) -> PlanarPngResult<PlanarImage<T>> {
    let path = path.as_ref();
    debug!("read_png: {}", path.display());
    if is_stdio(path) {
      read_png_from(std::io::stdin().lock(), model)
    } else {
      let bytes = std::fs::read(path)?;
      read_png_bytes(&bytes, model)
    }
  }

  /// Writes a PNG file with the default [`PngEncodeOptions`]. A path of `-`
  /// writes to stdout.
  #[inline]
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub fn write_png<T: Sample, P: AsRef<Path>>(
    path: P, image: &PlanarImage<T>,
  ) -> PlanarPngResult<()> {
    write_png_with(path, image, &PngEncodeOptions::default())
  }

  /// Writes a PNG file. A path of `-` writes to stdout.
  ///
  /// The image is fully encoded before the file is created, so an encoding
  /// failure never leaves a file behind.
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub fn write_png_with<T: Sample, P: AsRef<Path>>(
    path: P, image: &PlanarImage<T>, options: &PngEncodeOptions,
  ) -> PlanarPngResult<()> {
    let path = path.as_ref();
    debug!("write_png_with: {}", path.display());
    let png = write_png_bytes(image, options)?;
    if is_stdio(path) {
      let mut stdout = std::io::stdout().lock();
      stdout.write_all(&png)?;
      stdout.flush()?;
    } else {
      std::fs::write(path, &png)?;
    }
    Ok(())
  }
}
#[cfg(feature = "std")]
pub use std_io::*;
