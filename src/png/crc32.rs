//! The CRC-32 that PNG chunks end with.
//!
//! This is the ISO 3309 CRC over the chunk type and chunk data, but not the
//! length field.

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

#[inline]
fn update_crc(crc: u32, bytes: &[u8]) -> u32 {
  bytes.iter().fold(crc, |crc, &byte| {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    CRC_TABLE[i] ^ (crc >> 8)
  })
}

/// The CRC that goes after a chunk with this type and data.
#[inline]
#[must_use]
pub(crate) fn png_chunk_crc(type_: [u8; 4], data: &[u8]) -> u32 {
  update_crc(update_crc(u32::MAX, &type_), data) ^ u32::MAX
}

#[test]
fn test_known_chunk_crcs() {
  // every IEND chunk ends in these bytes.
  assert_eq!(png_chunk_crc(*b"IEND", &[]), 0xAE42_6082);
  // the standard CRC-32 check value.
  assert_eq!(update_crc(u32::MAX, b"123456789") ^ u32::MAX, 0xCBF4_3926);
}
