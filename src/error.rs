use core::fmt::{Display, Formatter};

#[cfg(feature = "png")]
use crate::png::PngError;

/// An error from the `planar_png` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanarPngError {
  /// A size, channel count, or buffer length didn't fit the image it was
  /// supposed to describe.
  ///
  /// This covers zero width or height, a channel count outside of `1..=4`, and
  /// a sample buffer whose length isn't `width * height * channels`.
  BadParameters,

  /// The allocator couldn't give us enough space.
  Alloc,

  /// A checked math operation failed.
  CheckedMath,

  /// The PNG codec rejected the data.
  #[cfg(feature = "png")]
  Png(PngError),

  /// Opening, reading, or writing a file or stream failed.
  #[cfg(feature = "std")]
  Io(std::io::ErrorKind),
}

impl Display for PlanarPngError {
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::BadParameters => f.write_str("bad parameters"),
      Self::Alloc => f.write_str("not enough memory"),
      Self::CheckedMath => f.write_str("image size overflowed"),
      #[cfg(feature = "png")]
      Self::Png(e) => write!(f, "png codec error: {e}"),
      #[cfg(feature = "std")]
      Self::Io(kind) => write!(f, "i/o error: {kind}"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for PlanarPngError {}

impl From<alloc::collections::TryReserveError> for PlanarPngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}

#[cfg(feature = "png")]
impl From<PngError> for PlanarPngError {
  #[inline]
  fn from(e: PngError) -> Self {
    match e {
      PngError::Alloc => Self::Alloc,
      other => Self::Png(other),
    }
  }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for PlanarPngError {
  #[inline]
  fn from(e: std::io::Error) -> Self {
    Self::Io(e.kind())
  }
}

/// Result alias for this crate's operations.
pub type PlanarPngResult<T> = Result<T, PlanarPngError>;
