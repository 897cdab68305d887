#![forbid(unsafe_code)]

//! Provides the heap-allocated planar image type.

use alloc::vec::Vec;

use crate::{PlanarPngError, PlanarPngResult};

/// The channels that each pixel of an image has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ChannelLayout {
  /// Greyscale
  Y = 1,
  /// Greyscale + Alpha
  YA = 2,
  /// Red, Green, Blue
  RGB = 3,
  /// Red, Green, Blue, Alpha
  RGBA = 4,
}
impl ChannelLayout {
  /// The number of channels in this layout.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    self as usize
  }

  /// If the last channel of this layout is alpha.
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    matches!(self, Self::YA | Self::RGBA)
  }

  /// This layout with the alpha channel removed, if it had one.
  #[inline]
  #[must_use]
  pub const fn without_alpha(self) -> Self {
    match self {
      Self::YA => Self::Y,
      Self::RGBA => Self::RGB,
      other => other,
    }
  }
}
impl TryFrom<usize> for ChannelLayout {
  type Error = PlanarPngError;
  #[inline]
  fn try_from(value: usize) -> Result<Self, Self::Error> {
    Ok(match value {
      1 => Self::Y,
      2 => Self::YA,
      3 => Self::RGB,
      4 => Self::RGBA,
      _ => return Err(PlanarPngError::BadParameters),
    })
  }
}

/// Gets the number of samples in a single channel plane, with overflow and
/// zero size checks.
#[inline]
pub(crate) fn checked_plane_len(width: u32, height: u32) -> PlanarPngResult<usize> {
  if width == 0 || height == 0 {
    return Err(PlanarPngError::BadParameters);
  }
  (width as usize).checked_mul(height as usize).ok_or(PlanarPngError::CheckedMath)
}

/// Gets the number of samples in a whole image, with overflow and zero size
/// checks.
#[inline]
pub(crate) fn checked_image_len(
  width: u32, height: u32, layout: ChannelLayout,
) -> PlanarPngResult<usize> {
  checked_plane_len(width, height)?
    .checked_mul(layout.channel_count())
    .ok_or(PlanarPngError::CheckedMath)
}

/// A planar image: each channel is stored as its own contiguous plane, one
/// after the other.
///
/// Within a plane, samples go left to right and then top to bottom. The
/// sample for `(x, y)` in channel `c` is at index
/// `c * width * height + y * width + x`.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct PlanarImage<T> {
  width: u32,
  height: u32,
  layout: ChannelLayout,
  samples: Vec<T>,
}
impl<T> PlanarImage<T> {
  /// Wraps a buffer of planar samples.
  ///
  /// ## Failure
  /// * `width` or `height` is 0.
  /// * `samples.len()` isn't `width * height * layout.channel_count()`.
  #[inline]
  pub fn new(
    width: u32, height: u32, layout: ChannelLayout, samples: Vec<T>,
  ) -> PlanarPngResult<Self> {
    if checked_image_len(width, height, layout)? != samples.len() {
      return Err(PlanarPngError::BadParameters);
    }
    Ok(Self { width, height, layout, samples })
  }

  /// Image width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Image height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// The channels of each pixel.
  #[inline]
  #[must_use]
  pub const fn layout(&self) -> ChannelLayout {
    self.layout
  }

  /// Number of channels, `1..=4`.
  #[inline]
  #[must_use]
  pub const fn channels(&self) -> usize {
    self.layout().channel_count()
  }

  /// Number of pixels, which is also the length of each plane.
  #[inline]
  #[must_use]
  pub const fn pixel_count(&self) -> usize {
    self.width as usize * self.height as usize
  }

  /// All the samples, plane after plane.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> &[T] {
    &self.samples
  }

  /// All the samples, plane after plane.
  #[inline]
  #[must_use]
  pub fn samples_mut(&mut self) -> &mut [T] {
    &mut self.samples
  }

  /// Takes the sample buffer out of the image.
  #[inline]
  #[must_use]
  pub fn into_samples(self) -> Vec<T> {
    self.samples
  }

  /// Gets one channel plane, or `None` if the channel doesn't exist.
  #[inline]
  #[must_use]
  pub fn channel(&self, c: usize) -> Option<&[T]> {
    let plane_len = self.pixel_count();
    self.samples.get(c.checked_mul(plane_len)?..c.checked_add(1)?.checked_mul(plane_len)?)
  }

  /// Gets one channel plane, or `None` if the channel doesn't exist.
  #[inline]
  #[must_use]
  pub fn channel_mut(&mut self, c: usize) -> Option<&mut [T]> {
    let plane_len = self.pixel_count();
    self.samples.get_mut(c.checked_mul(plane_len)?..c.checked_add(1)?.checked_mul(plane_len)?)
  }

  /// Gets the sample at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32, c: usize) -> Option<&T> {
    if x < self.width && y < self.height {
      let i = y as usize * self.width as usize + x as usize;
      self.channel(c)?.get(i)
    } else {
      None
    }
  }
}

#[test]
fn test_channel_layout_counts() {
  for n in 1..=4 {
    assert_eq!(ChannelLayout::try_from(n).unwrap().channel_count(), n);
  }
  assert_eq!(ChannelLayout::try_from(0), Err(PlanarPngError::BadParameters));
  assert_eq!(ChannelLayout::try_from(5), Err(PlanarPngError::BadParameters));
  assert_eq!(ChannelLayout::RGBA.without_alpha(), ChannelLayout::RGB);
  assert_eq!(ChannelLayout::YA.without_alpha(), ChannelLayout::Y);
  assert_eq!(ChannelLayout::RGB.without_alpha(), ChannelLayout::RGB);
}

#[test]
fn test_planar_image_indexing() {
  let samples: Vec<u8> = (0..12).collect();
  let image = PlanarImage::new(2, 2, ChannelLayout::RGB, samples).unwrap();
  assert_eq!(image.channel(0).unwrap(), &[0, 1, 2, 3]);
  assert_eq!(image.channel(2).unwrap(), &[8, 9, 10, 11]);
  assert!(image.channel(3).is_none());
  assert_eq!(image.get(1, 1, 1), Some(&7));
  assert_eq!(image.get(0, 1, 2), Some(&10));
  assert_eq!(image.get(2, 0, 0), None);
}

#[test]
fn test_planar_image_rejects_bad_length() {
  assert_eq!(
    PlanarImage::new(2, 2, ChannelLayout::RGB, alloc::vec![0_u8; 11]),
    Err(PlanarPngError::BadParameters)
  );
  assert_eq!(
    PlanarImage::<u8>::new(0, 2, ChannelLayout::Y, alloc::vec![]),
    Err(PlanarPngError::BadParameters)
  );
}
