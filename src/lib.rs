#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! Read and write PNG images as planar arrays of samples.
//!
//! PNG stores pixels interleaved (`RGBRGB...`). This crate hands out, and
//! takes back, images where each channel is its own contiguous plane
//! (`RRR...GGG...BBB...`), with the samples stored as `u8`, `u16`, `f32`, or
//! `f64` (see [`Sample`]).
//!
//! * [`read_png_bytes`] / [`write_png_bytes`] work on in-memory PNG data.
//! * [`read_png`] / [`write_png`] work on files (`std` feature), with `-`
//!   meaning stdin or stdout.
//! * [`ColorModel`] lets a read force the image to RGB or greyscale,
//!   discarding any alpha channel.
//!
//! The building blocks ([`deinterlace`], [`interlace`], [`convert_samples`],
//! [`apply_color_model`], and the [`png`] codec) are public too.
//!
//! ## Features
//! * `std` (default): file and stream entry points, `std::error::Error`.
//! * `png` (default): the PNG codec, using `miniz_oxide` for zlib.
//!
//! This crate uses the `log` facade. Install any logger to see what it's
//! doing, at `trace` for codec details and `debug` for the entry points.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod sample;
pub use sample::*;

pub mod layout;
pub use layout::*;

pub mod image;
pub use image::*;

pub mod color_model;
pub use color_model::*;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "png")]
mod png_io;
#[cfg(feature = "png")]
pub use png::{DecodeLimits, PngEncodeOptions, PngError};
#[cfg(feature = "png")]
pub use png_io::*;

const _: () = {
  const fn assert_send_sync<T: Send + Sync>() {}
  assert_send_sync::<PlanarImage<u8>>();
  assert_send_sync::<PlanarImage<u16>>();
  assert_send_sync::<PlanarImage<f32>>();
  assert_send_sync::<PlanarImage<f64>>();
  assert_send_sync::<ColorModel>();
  assert_send_sync::<PlanarPngError>();
  #[cfg(feature = "png")]
  assert_send_sync::<PngEncodeOptions>();
};
