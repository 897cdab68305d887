//! Scanline filtering, in both directions.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! For each byte `x` the filters look at `a` (the matching byte of the pixel
//! to the left), `b` (the matching byte of the line above), and `c` (the
//! matching byte of the pixel above and to the left). Anything off the edge of
//! the image is 0. "Pixel" here means `bpp` bytes, rounded up to 1 for bit
//! depths under 8.

use alloc::vec::Vec;

use super::PngError;

/// The five filter types of filter method 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl FilterType {
  pub(crate) const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(PngError::IllegalFilterType),
    })
  }
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring bytes (left `a`, above `b`, upper left `c`), then picks
/// whichever neighbor is closest to that.
#[inline]
#[must_use]
const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // Note(Lokathor): PNG spec says "The calculations within the PaethPredictor
  // function shall be performed exactly, without overflow.", so we use i32 math
  // here, which is wide enough to never give us trouble no matter what the u8
  // input values are.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // the order of these tests is fixed by the PNG standard.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// The prediction that filter type `f` makes for a byte.
#[inline]
#[must_use]
const fn predict(f: FilterType, a: u8, b: u8, c: u8) -> u8 {
  match f {
    FilterType::None => 0,
    FilterType::Sub => a,
    FilterType::Up => b,
    FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
    FilterType::Paeth => paeth_predictor(a, b, c),
  }
}

/// Undoes the filter on one scanline, in place.
///
/// `previous` is the already reconstructed line above, or an empty slice for
/// the first line of an image.
pub(crate) fn reconstruct_line(
  filter_type: u8, line: &mut [u8], previous: &[u8], bpp: usize,
) -> Result<(), PngError> {
  let f = FilterType::try_from(filter_type)?;
  if f == FilterType::None || (f == FilterType::Up && previous.is_empty()) {
    return Ok(());
  }
  for i in 0..line.len() {
    let a = if i >= bpp { line[i - bpp] } else { 0 };
    let b = previous.get(i).copied().unwrap_or(0);
    let c = if i >= bpp { previous.get(i - bpp).copied().unwrap_or(0) } else { 0 };
    line[i] = line[i].wrapping_add(predict(f, a, b, c));
  }
  Ok(())
}

/// Applies filter `f` to one raw scanline, writing the filtered bytes to `out`.
fn filter_line_with(f: FilterType, line: &[u8], previous: &[u8], bpp: usize, out: &mut Vec<u8>) {
  out.clear();
  out.extend(line.iter().enumerate().map(|(i, &x)| {
    let a = if i >= bpp { line[i - bpp] } else { 0 };
    let b = previous.get(i).copied().unwrap_or(0);
    let c = if i >= bpp { previous.get(i - bpp).copied().unwrap_or(0) } else { 0 };
    x.wrapping_sub(predict(f, a, b, c))
  }));
}

/// The usual "minimum sum of absolute differences" heuristic: treat each
/// filtered byte as signed and add up the magnitudes.
#[inline]
#[must_use]
fn filter_cost(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&x| u64::from((x as i8).unsigned_abs())).sum()
}

/// Filters one raw scanline with whichever filter type looks cheapest to
/// compress, pushing the filter type byte and the filtered bytes onto `dest`.
///
/// `scratch` and `best` are reused between calls to avoid allocating per line.
pub(crate) fn filter_line_adaptive(
  line: &[u8], previous: &[u8], bpp: usize, dest: &mut Vec<u8>, scratch: &mut Vec<u8>,
  best: &mut Vec<u8>,
) {
  let mut best_type = FilterType::None;
  let mut best_cost = u64::MAX;
  for f in FilterType::ALL {
    filter_line_with(f, line, previous, bpp, scratch);
    let cost = filter_cost(scratch);
    if cost < best_cost {
      best_cost = cost;
      best_type = f;
      core::mem::swap(best, scratch);
    }
  }
  dest.push(best_type as u8);
  dest.extend_from_slice(best);
}

#[test]
fn test_paeth_predictor() {
  assert_eq!(paeth_predictor(0, 0, 0), 0);
  // p = a + b - c = 10, closest to a
  assert_eq!(paeth_predictor(10, 20, 20), 10);
  // p = 30, closest to b
  assert_eq!(paeth_predictor(20, 30, 20), 30);
  // p = 255 + 255 - 0 = 510, ties go to a
  assert_eq!(paeth_predictor(255, 255, 0), 255);
  // p = -255, a and b tie and a wins
  assert_eq!(paeth_predictor(0, 0, 255), 0);
  assert_eq!(paeth_predictor(100, 0, 200), 0);
}

#[test]
fn test_every_filter_reverses() {
  let previous: Vec<u8> = (0..24).map(|i| (i * 37 % 256) as u8).collect();
  let line: Vec<u8> = (0..24).map(|i| (255 - i * 11 % 256) as u8).collect();
  for bpp in [1, 2, 3, 4, 6, 8] {
    for prev in [&previous[..], &[][..]] {
      for f in FilterType::ALL {
        let mut filtered = Vec::new();
        filter_line_with(f, &line, prev, bpp, &mut filtered);
        reconstruct_line(f as u8, &mut filtered, prev, bpp).unwrap();
        assert_eq!(filtered, line, "filter {f:?} bpp {bpp} prev len {}", prev.len());
      }
    }
  }
}

#[test]
fn test_adaptive_filter_picks_cheapest() {
  // a flat line compresses best with Sub: everything after the first pixel
  // becomes 0.
  let line = [9_u8; 12];
  let (mut dest, mut scratch, mut best) = (Vec::new(), Vec::new(), Vec::new());
  filter_line_adaptive(&line, &[], 3, &mut dest, &mut scratch, &mut best);
  assert_eq!(dest[0], FilterType::Sub as u8);
  assert_eq!(&dest[1..], &[9, 9, 9, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_illegal_filter_type() {
  let mut line = [1_u8, 2, 3];
  assert_eq!(reconstruct_line(5, &mut line, &[], 1), Err(PngError::IllegalFilterType));
}
