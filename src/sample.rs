#![forbid(unsafe_code)]

//! Numeric sample types and the conversions between them.
//!
//! Every sample type denotes the same underlying intensity, scaled to the
//! full range of the type:
//!
//! | type  | range          |
//! |:-----:|:--------------:|
//! | `u8`  | `0 ..= 255`    |
//! | `u16` | `0 ..= 65535`  |
//! | `f32` | `0.0 ..= 1.0`  |
//! | `f64` | `0.0 ..= 1.0`  |
//!
//! Going to a type with more precision is a plain rescale. Going to an integer
//! type rounds half up (`floor(x + 0.5)`, never round-half-even) and then
//! clamps to the integer's range, so out of range floats saturate instead of
//! wrapping. NaN becomes 0.

use alloc::vec::Vec;
use core::fmt::Debug;

use bytemuck::Pod;

use crate::color_model::{LUMA_B, LUMA_B_FIXED, LUMA_G, LUMA_G_FIXED, LUMA_R, LUMA_R_FIXED};

/// A numeric representation that planar pixel data can be stored as.
pub trait Sample: Pod + Default + PartialOrd + Debug + Send + Sync + 'static {
  /// The value of full intensity.
  const MAX: Self;

  /// Converts an 8-bit sample into this representation.
  fn from_u8(byte: u8) -> Self;

  /// Converts this sample into an 8-bit sample, rounding and clamping.
  fn to_u8(self) -> u8;

  /// Gets the intensity as a fraction of [`MAX`](Sample::MAX).
  fn to_unit(self) -> f64;

  /// Makes a sample from a fraction of [`MAX`](Sample::MAX).
  ///
  /// Integer types round and clamp, float types take the value as-is.
  fn from_unit(unit: f64) -> Self;

  /// ITU-R BT.709 luma of an RGB triple in this representation.
  fn luma(r: Self, g: Self, b: Self) -> Self;
}

/// `clamp(floor(v + 0.5), 0, max)`, computed without `f64::floor` so that it
/// works in `no_std`.
#[inline]
#[must_use]
fn round_half_up_clamp(v: f64, max: f64) -> f64 {
  let v = v + 0.5;
  // written so that NaN lands in the first arm
  if !(v >= 1.0) {
    0.0
  } else if v >= max {
    max
  } else {
    // truncation is floor for positive values
    (v as u64) as f64
  }
}

/// Fixed point BT.709 luma: the weights are scaled by `1 << 15` and sum to
/// exactly `1 << 15`, so equal inputs give back the same value.
#[inline]
#[must_use]
const fn luma_fixed(r: u32, g: u32, b: u32) -> u32 {
  (LUMA_R_FIXED * r + LUMA_G_FIXED * g + LUMA_B_FIXED * b + (1 << 14)) >> 15
}

#[inline]
#[must_use]
fn luma_real(r: f64, g: f64, b: f64) -> f64 {
  LUMA_R * r + LUMA_G * g + LUMA_B * b
}

impl Sample for u8 {
  const MAX: Self = u8::MAX;
  #[inline]
  fn from_u8(byte: u8) -> Self {
    byte
  }
  #[inline]
  fn to_u8(self) -> u8 {
    self
  }
  #[inline]
  fn to_unit(self) -> f64 {
    f64::from(self) / 255.0
  }
  #[inline]
  fn from_unit(unit: f64) -> Self {
    round_half_up_clamp(unit * 255.0, 255.0) as u8
  }
  #[inline]
  fn luma(r: Self, g: Self, b: Self) -> Self {
    luma_fixed(u32::from(r), u32::from(g), u32::from(b)) as u8
  }
}

impl Sample for u16 {
  const MAX: Self = u16::MAX;
  #[inline]
  fn from_u8(byte: u8) -> Self {
    // 65535 / 255 == 257
    u16::from(byte) * 257
  }
  #[inline]
  fn to_u8(self) -> u8 {
    ((u32::from(self) * 255 + 32767) / 65535) as u8
  }
  #[inline]
  fn to_unit(self) -> f64 {
    f64::from(self) / 65535.0
  }
  #[inline]
  fn from_unit(unit: f64) -> Self {
    round_half_up_clamp(unit * 65535.0, 65535.0) as u16
  }
  #[inline]
  fn luma(r: Self, g: Self, b: Self) -> Self {
    luma_fixed(u32::from(r), u32::from(g), u32::from(b)) as u16
  }
}

impl Sample for f32 {
  const MAX: Self = 1.0;
  #[inline]
  fn from_u8(byte: u8) -> Self {
    f32::from(byte) / 255.0
  }
  #[inline]
  fn to_u8(self) -> u8 {
    round_half_up_clamp(f64::from(self) * 255.0, 255.0) as u8
  }
  #[inline]
  fn to_unit(self) -> f64 {
    f64::from(self)
  }
  #[inline]
  fn from_unit(unit: f64) -> Self {
    unit as f32
  }
  #[inline]
  fn luma(r: Self, g: Self, b: Self) -> Self {
    luma_real(f64::from(r), f64::from(g), f64::from(b)) as f32
  }
}

impl Sample for f64 {
  const MAX: Self = 1.0;
  #[inline]
  fn from_u8(byte: u8) -> Self {
    f64::from(byte) / 255.0
  }
  #[inline]
  fn to_u8(self) -> u8 {
    round_half_up_clamp(self * 255.0, 255.0) as u8
  }
  #[inline]
  fn to_unit(self) -> f64 {
    self
  }
  #[inline]
  fn from_unit(unit: f64) -> Self {
    unit
  }
  #[inline]
  fn luma(r: Self, g: Self, b: Self) -> Self {
    luma_real(r, g, b)
  }
}

/// Converts 8-bit samples into a freshly allocated buffer of `T` samples.
#[inline]
#[must_use]
pub fn samples_from_bytes<T: Sample>(bytes: &[u8]) -> Vec<T> {
  bytes.iter().copied().map(T::from_u8).collect()
}

/// Converts `T` samples into a freshly allocated buffer of 8-bit samples.
#[inline]
#[must_use]
pub fn samples_to_bytes<T: Sample>(samples: &[T]) -> Vec<u8> {
  samples.iter().copied().map(T::to_u8).collect()
}

/// Converts samples of one representation into another, preserving relative
/// intensity.
///
/// The input is left alone, the output is always a new buffer of the same
/// length.
#[inline]
#[must_use]
pub fn convert_samples<A: Sample, B: Sample>(src: &[A]) -> Vec<B> {
  src.iter().copied().map(|a| B::from_unit(a.to_unit())).collect()
}

#[test]
fn test_round_half_up_clamp() {
  assert_eq!(round_half_up_clamp(2.5, 255.0), 3.0);
  assert_eq!(round_half_up_clamp(3.5, 255.0), 4.0);
  assert_eq!(round_half_up_clamp(2.49, 255.0), 2.0);
  assert_eq!(round_half_up_clamp(-0.5, 255.0), 0.0);
  assert_eq!(round_half_up_clamp(-1000.0, 255.0), 0.0);
  assert_eq!(round_half_up_clamp(254.5, 255.0), 255.0);
  assert_eq!(round_half_up_clamp(1e30, 255.0), 255.0);
  assert_eq!(round_half_up_clamp(f64::NAN, 255.0), 0.0);
  assert_eq!(round_half_up_clamp(f64::INFINITY, 65535.0), 65535.0);
}

#[test]
fn test_float_clamping() {
  assert_eq!(1.5_f32.to_u8(), 255);
  assert_eq!((-0.5_f32).to_u8(), 0);
  assert_eq!(1.5_f64.to_u8(), 255);
  assert_eq!((-0.5_f64).to_u8(), 0);
  assert_eq!(f32::NAN.to_u8(), 0);
  assert_eq!(<u16 as Sample>::from_unit(7.0), u16::MAX);
  assert_eq!(<u16 as Sample>::from_unit(-7.0), 0);
}

#[test]
fn test_bytes_survive_every_representation() {
  let bytes: Vec<u8> = (0..=255).collect();

  let floats: Vec<f32> = samples_from_bytes(&bytes);
  assert_eq!(floats[0], 0.0);
  assert_eq!(floats[255], 1.0);
  assert_eq!(samples_to_bytes(&floats), bytes);

  let doubles: Vec<f64> = samples_from_bytes(&bytes);
  assert_eq!(samples_to_bytes(&doubles), bytes);

  let words: Vec<u16> = samples_from_bytes(&bytes);
  assert_eq!(words[1], 257);
  assert_eq!(words[255], u16::MAX);
  assert_eq!(samples_to_bytes(&words), bytes);
}

#[test]
fn test_convert_samples() {
  let words: Vec<u16> = convert_samples(&[0_u8, 128, 255]);
  assert_eq!(words, [0, 128 * 257, 65535]);

  let bytes: Vec<u8> = convert_samples(&[0_u16, 257, 32896, 65535]);
  assert_eq!(bytes, [0, 1, 128, 255]);

  let floats: Vec<f32> = convert_samples(&[0.25_f64, 2.0, -1.0]);
  assert_eq!(floats, [0.25, 2.0, -1.0]);

  let src = [3_u8, 200, 17];
  let same: Vec<u8> = convert_samples(&src);
  assert_eq!(same, src);

  let none: Vec<f64> = convert_samples::<u8, f64>(&[]);
  assert!(none.is_empty());
}

#[test]
fn test_luma_of_gray_is_gray() {
  for v in 0..=255_u8 {
    assert_eq!(u8::luma(v, v, v), v);
  }
  for v in [0_u16, 1, 1000, 32768, 65535] {
    assert_eq!(u16::luma(v, v, v), v);
  }
  let f = 0.4_f64;
  let y = f64::luma(f, f, f);
  assert!(y - f < 1e-12 && f - y < 1e-12);
}

#[test]
fn test_luma_matches_real_weights() {
  for (r, g, b) in [(255_u8, 0, 0), (0, 255, 0), (0, 0, 255), (12, 200, 99), (255, 128, 1)] {
    let real = luma_real(f64::from(r), f64::from(g), f64::from(b));
    let fixed = f64::from(u8::luma(r, g, b));
    assert!(real - fixed <= 1.0 && fixed - real <= 1.0, "{r} {g} {b}: {real} vs {fixed}");
  }
}
