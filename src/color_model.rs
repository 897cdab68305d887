#![forbid(unsafe_code)]

//! Changes the color model of planar sample buffers.
//!
//! All of these work on a planar buffer that the caller owns, so changing the
//! channel count is just a resize of the buffer: alpha is always the last
//! plane, so stripping it is a truncation, and RGB planes are appended after
//! the gray plane.
//!
//! Gray to RGB copies the gray value into each of the three color planes. RGB
//! to gray isn't a plain average; it's the ITU-R BT.709 luma:
//! ```text
//! Y = 0.212639005871510 * R + 0.715168678767756 * G + 0.072192315360734 * B
//! ```
//! Integer samples use a 15-bit fixed point version of those weights.
//! No transfer function is applied first, the sample values are used as-is.

use alloc::vec::Vec;
use core::str::FromStr;

use crate::{image::ChannelLayout, sample::Sample, PlanarPngError, PlanarPngResult};

/// BT.709 red weight.
pub const LUMA_R: f64 = 0.212639005871510;
/// BT.709 green weight.
pub const LUMA_G: f64 = 0.715168678767756;
/// BT.709 blue weight.
pub const LUMA_B: f64 = 0.072192315360734;

/// BT.709 red weight, scaled by `1 << 15`.
pub const LUMA_R_FIXED: u32 = 6968;
/// BT.709 green weight, scaled by `1 << 15`.
pub const LUMA_G_FIXED: u32 = 23434;
/// BT.709 blue weight, scaled by `1 << 15`.
pub const LUMA_B_FIXED: u32 = 2366;

/// What color model a read should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorModel {
  /// Keep whatever channels the file has.
  #[default]
  Unchanged,
  /// Drop alpha and force three channels.
  Rgb,
  /// Drop alpha and force one channel.
  Gray,
}
impl ColorModel {
  /// The layout that applying this model to `layout` gives.
  #[inline]
  #[must_use]
  pub const fn target_layout(self, layout: ChannelLayout) -> ChannelLayout {
    match self {
      Self::Unchanged => layout,
      Self::Rgb => ChannelLayout::RGB,
      Self::Gray => ChannelLayout::Y,
    }
  }
}
impl FromStr for ColorModel {
  type Err = PlanarPngError;
  /// Parses the option strings `"none"` (or empty), `"rgb"`, and `"gray"` (or
  /// `"grey"`), ignoring ASCII case.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
      Ok(Self::Unchanged)
    } else if s.eq_ignore_ascii_case("rgb") {
      Ok(Self::Rgb)
    } else if s.eq_ignore_ascii_case("gray") || s.eq_ignore_ascii_case("grey") {
      Ok(Self::Gray)
    } else {
      Err(PlanarPngError::BadParameters)
    }
  }
}

#[inline]
fn plane_len_for(len: usize, layout: ChannelLayout) -> PlanarPngResult<usize> {
  let nc = layout.channel_count();
  if len == 0 || len % nc != 0 {
    return Err(PlanarPngError::BadParameters);
  }
  Ok(len / nc)
}

/// Removes the alpha plane, if there is one.
///
/// `YA` becomes `Y` and `RGBA` becomes `RGB`. Other layouts are unchanged.
pub fn strip_alpha<T>(
  samples: &mut Vec<T>, layout: ChannelLayout,
) -> PlanarPngResult<ChannelLayout> {
  let plane_len = plane_len_for(samples.len(), layout)?;
  if !layout.has_alpha() {
    return Ok(layout);
  }
  let out = layout.without_alpha();
  samples.truncate(plane_len * out.channel_count());
  samples.shrink_to_fit();
  Ok(out)
}

/// Turns a single gray plane into three identical R, G, and B planes.
///
/// An `RGB` buffer is left alone. Any other layout is an error, strip the
/// alpha first.
pub fn gray_to_rgb<T: Copy>(
  samples: &mut Vec<T>, layout: ChannelLayout,
) -> PlanarPngResult<ChannelLayout> {
  let plane_len = plane_len_for(samples.len(), layout)?;
  match layout {
    ChannelLayout::RGB => Ok(layout),
    ChannelLayout::Y => {
      samples.try_reserve_exact(plane_len * 2)?;
      samples.extend_from_within(..plane_len);
      samples.extend_from_within(..plane_len);
      Ok(ChannelLayout::RGB)
    }
    _ => Err(PlanarPngError::BadParameters),
  }
}

/// Turns R, G, and B planes into a single luma plane.
///
/// A `Y` buffer is left alone. Any other layout is an error, strip the alpha
/// first.
pub fn rgb_to_gray<T: Sample>(
  samples: &mut Vec<T>, layout: ChannelLayout,
) -> PlanarPngResult<ChannelLayout> {
  let plane_len = plane_len_for(samples.len(), layout)?;
  match layout {
    ChannelLayout::Y => Ok(layout),
    ChannelLayout::RGB => {
      let (r_plane, gb) = samples.split_at_mut(plane_len);
      let (g_plane, b_plane) = gb.split_at(plane_len);
      r_plane.iter_mut().zip(g_plane.iter().zip(b_plane.iter())).for_each(|(r, (g, b))| {
        *r = T::luma(*r, *g, *b);
      });
      samples.truncate(plane_len);
      samples.shrink_to_fit();
      Ok(ChannelLayout::Y)
    }
    _ => Err(PlanarPngError::BadParameters),
  }
}

/// Applies a [`ColorModel`] to a planar buffer, giving the new layout.
///
/// The buffer's length must be a whole number of planes of `layout`.
pub fn apply_color_model<T: Sample>(
  samples: &mut Vec<T>, layout: ChannelLayout, model: ColorModel,
) -> PlanarPngResult<ChannelLayout> {
  plane_len_for(samples.len(), layout)?;
  match model {
    ColorModel::Unchanged => Ok(layout),
    ColorModel::Rgb => {
      let layout = strip_alpha(samples, layout)?;
      gray_to_rgb(samples, layout)
    }
    ColorModel::Gray => {
      let layout = strip_alpha(samples, layout)?;
      rgb_to_gray(samples, layout)
    }
  }
}

#[test]
fn test_strip_alpha() {
  let mut v: Vec<u8> = (0..8).collect();
  assert_eq!(strip_alpha(&mut v, ChannelLayout::RGBA), Ok(ChannelLayout::RGB));
  assert_eq!(v, [0, 1, 2, 3, 4, 5]);

  let mut v: Vec<u8> = (0..6).collect();
  assert_eq!(strip_alpha(&mut v, ChannelLayout::YA), Ok(ChannelLayout::Y));
  assert_eq!(v, [0, 1, 2]);

  let mut v: Vec<u8> = (0..6).collect();
  assert_eq!(strip_alpha(&mut v, ChannelLayout::RGB), Ok(ChannelLayout::RGB));
  assert_eq!(v.len(), 6);
}

#[test]
fn test_gray_rgb_gray_is_stable() {
  let gray: Vec<u8> = (0..=255).collect();
  let mut v = gray.clone();
  assert_eq!(gray_to_rgb(&mut v, ChannelLayout::Y), Ok(ChannelLayout::RGB));
  assert_eq!(v.len(), 256 * 3);
  assert_eq!(&v[256..512], &gray[..]);
  assert_eq!(&v[512..], &gray[..]);
  assert_eq!(rgb_to_gray(&mut v, ChannelLayout::RGB), Ok(ChannelLayout::Y));
  assert_eq!(v, gray);

  let gray: Vec<f32> = (0..=255).map(|b| f32::from(b as u8) / 255.0).collect();
  let mut v = gray.clone();
  gray_to_rgb(&mut v, ChannelLayout::Y).unwrap();
  rgb_to_gray(&mut v, ChannelLayout::RGB).unwrap();
  for (a, b) in v.iter().zip(gray.iter()) {
    assert!(a - b <= 1.0 / 255.0 && b - a <= 1.0 / 255.0, "{a} vs {b}");
  }
}

#[test]
fn test_rgb_to_gray_weights() {
  // planes: R = [255, 0, 0], G = [0, 255, 0], B = [0, 0, 255]
  let mut v: Vec<u8> = alloc::vec![255, 0, 0, 0, 255, 0, 0, 0, 255];
  rgb_to_gray(&mut v, ChannelLayout::RGB).unwrap();
  assert_eq!(v, [54, 182, 18]);

  let mut v: Vec<f64> = alloc::vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
  rgb_to_gray(&mut v, ChannelLayout::RGB).unwrap();
  assert_eq!(v, [LUMA_R, LUMA_G + LUMA_B]);
}

#[test]
fn test_apply_color_model() {
  use ChannelLayout::*;
  // 2 pixels of RGBA
  let rgba: Vec<u8> = alloc::vec![10, 20, 30, 40, 50, 60, 255, 255];

  let mut v = rgba.clone();
  assert_eq!(apply_color_model(&mut v, RGBA, ColorModel::Unchanged), Ok(RGBA));
  assert_eq!(v, rgba);

  let mut v = rgba.clone();
  assert_eq!(apply_color_model(&mut v, RGBA, ColorModel::Rgb), Ok(RGB));
  assert_eq!(v, [10, 20, 30, 40, 50, 60]);

  let mut v = rgba.clone();
  assert_eq!(apply_color_model(&mut v, RGBA, ColorModel::Gray), Ok(Y));
  assert_eq!(v.len(), 2);

  // gray + alpha forced to rgb
  let mut v: Vec<u8> = alloc::vec![7, 8, 200, 100];
  assert_eq!(apply_color_model(&mut v, YA, ColorModel::Rgb), Ok(RGB));
  assert_eq!(v, [7, 8, 7, 8, 7, 8]);

  // already in the target model
  let mut v: Vec<u8> = alloc::vec![1, 2, 3];
  assert_eq!(apply_color_model(&mut v, RGB, ColorModel::Rgb), Ok(RGB));
  assert_eq!(apply_color_model(&mut v, Y, ColorModel::Gray), Ok(Y));
  assert_eq!(v, [1, 2, 3]);

  let mut v: Vec<u8> = alloc::vec![1, 2, 3];
  assert_eq!(apply_color_model(&mut v, YA, ColorModel::Gray), Err(PlanarPngError::BadParameters));
}

#[test]
fn test_color_model_from_str() {
  assert_eq!("none".parse(), Ok(ColorModel::Unchanged));
  assert_eq!("".parse(), Ok(ColorModel::Unchanged));
  assert_eq!("RGB".parse(), Ok(ColorModel::Rgb));
  assert_eq!("gray".parse(), Ok(ColorModel::Gray));
  assert_eq!("grey".parse(), Ok(ColorModel::Gray));
  assert_eq!("cmyk".parse::<ColorModel>(), Err(PlanarPngError::BadParameters));
}
