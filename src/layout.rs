#![forbid(unsafe_code)]

//! Moves samples between interleaved and planar order.
//!
//! * **Interleaved** (what PNG stores): all channels of a pixel are adjacent,
//!   `RGBRGBRGB...`.
//! * **Planar** (what this crate hands out): all samples of a channel are
//!   adjacent, `RRR...GGG...BBB...`.
//!
//! In both functions `csize` is the number of samples per channel (the pixel
//! count) and `nc` is the number of channels. Planar index `c * csize + k`
//! and interleaved index `k * nc + c` name the same sample.

use alloc::vec::Vec;

use crate::{PlanarPngError, PlanarPngResult};

#[inline]
fn checked_total(src_len: usize, csize: usize, nc: usize) -> PlanarPngResult<usize> {
  if csize == 0 || nc == 0 {
    return Err(PlanarPngError::BadParameters);
  }
  let total = csize.checked_mul(nc).ok_or(PlanarPngError::CheckedMath)?;
  if total != src_len {
    return Err(PlanarPngError::BadParameters);
  }
  Ok(total)
}

#[inline]
fn try_copy<T: Copy>(src: &[T]) -> PlanarPngResult<Vec<T>> {
  let mut out = Vec::new();
  out.try_reserve_exact(src.len())?;
  out.extend_from_slice(src);
  Ok(out)
}

/// Converts interleaved samples into planar samples.
///
/// The output is always a new buffer, even when one channel or one pixel
/// makes the two orders coincide.
///
/// ## Failure
/// * `csize` or `nc` is zero, or `src.len()` isn't `csize * nc`.
/// * Allocation failure.
pub fn deinterlace<T: Copy>(src: &[T], csize: usize, nc: usize) -> PlanarPngResult<Vec<T>> {
  let total = checked_total(src.len(), csize, nc)?;
  if nc == 1 || csize == 1 {
    return try_copy(src);
  }
  let mut out = Vec::new();
  out.try_reserve_exact(total)?;
  for c in 0..nc {
    out.extend(src.iter().skip(c).step_by(nc).copied());
  }
  debug_assert_eq!(out.len(), total);
  Ok(out)
}

/// Converts planar samples into interleaved samples.
///
/// This is the exact inverse of [`deinterlace`].
///
/// ## Failure
/// * `csize` or `nc` is zero, or `src.len()` isn't `csize * nc`.
/// * Allocation failure.
pub fn interlace<T: Copy>(src: &[T], csize: usize, nc: usize) -> PlanarPngResult<Vec<T>> {
  let total = checked_total(src.len(), csize, nc)?;
  if nc == 1 || csize == 1 {
    return try_copy(src);
  }
  let mut out = Vec::new();
  out.try_reserve_exact(total)?;
  out.extend((0..total).map(|i| src[(i % nc) * csize + i / nc]));
  Ok(out)
}

#[test]
fn test_interlace_known_order() {
  let planar = [1, 2, 3, 10, 20, 30];
  let interleaved = interlace(&planar, 3, 2).unwrap();
  assert_eq!(interleaved, [1, 10, 2, 20, 3, 30]);
  assert_eq!(deinterlace(&interleaved, 3, 2).unwrap(), planar);
}

#[test]
fn test_transpose_round_trip() {
  for nc in 1..=4 {
    for csize in [1, 2, 3, 7, 64, 65] {
      let src: Vec<u32> = (0..(csize * nc) as u32).collect();
      let there = interlace(&src, csize, nc).unwrap();
      let back = deinterlace(&there, csize, nc).unwrap();
      assert_eq!(back, src, "nc: {nc}, csize: {csize}");
      let there = deinterlace(&src, csize, nc).unwrap();
      let back = interlace(&there, csize, nc).unwrap();
      assert_eq!(back, src, "nc: {nc}, csize: {csize}");
    }
  }
}

#[test]
fn test_degenerate_transpose_is_identity_copy() {
  let src = [5_u8, 6, 7, 8];
  let a = interlace(&src, 4, 1).unwrap();
  let b = deinterlace(&src, 4, 1).unwrap();
  assert_eq!(a, src);
  assert_eq!(b, src);
  assert_ne!(a.as_ptr(), src.as_ptr());
  // one pixel with four channels is the same in both orders too
  assert_eq!(interlace(&src, 1, 4).unwrap(), src);
  assert_eq!(deinterlace(&src, 1, 4).unwrap(), src);
}

#[test]
fn test_transpose_rejects_bad_sizes() {
  assert_eq!(interlace(&[1_u8, 2, 3], 2, 2), Err(PlanarPngError::BadParameters));
  assert_eq!(deinterlace(&[1_u8, 2, 3], 0, 3), Err(PlanarPngError::BadParameters));
  assert_eq!(deinterlace::<u8>(&[], 1, 0), Err(PlanarPngError::BadParameters));
  assert_eq!(interlace(&[1_u8], usize::MAX, 2), Err(PlanarPngError::CheckedMath));
}
