use planar_png::{
  png::{png_decode, PngError},
  read_png, ChannelLayout, ColorModel, PlanarImage, PlanarPngError,
};
use walkdir::WalkDir;

use super::fixture_sample;

fn fixture(name: &str) -> PlanarImage<u8> {
  read_png(format!("tests/fixtures/{name}"), ColorModel::Unchanged).unwrap()
}

fn check_pixels(image: &PlanarImage<u8>, expected: impl Fn(u32, u32, usize) -> u8) {
  for c in 0..image.channels() {
    for y in 0..image.height() {
      for x in 0..image.width() {
        assert_eq!(image.get(x, y, c), Some(&expected(x, y, c)), "x:{x} y:{y} c:{c}");
      }
    }
  }
}

#[test]
fn test_png_decode_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = png_decode(&v);
    // also with a broken byte somewhere in the middle
    if let Some(byte) = v.get(v.len() / 2) {
      let mut v2 = v.clone();
      v2[v.len() / 2] = byte ^ 0x5A;
      let _ = png_decode(&v2);
    }
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    assert!(png_decode(&v).is_err());
    // random data after a real signature gets further into the parser.
    let mut v2 = b"\x89PNG\r\n\x1a\n".to_vec();
    v2.extend_from_slice(&v);
    let _ = png_decode(&v2);
  }
}

#[test]
fn test_low_bit_depth_fixtures() {
  let image = fixture("gray_1bit.png");
  assert_eq!((image.width(), image.height(), image.layout()), (5, 3, ChannelLayout::Y));
  check_pixels(&image, |x, y, _| if (x + y) % 2 == 1 { 255 } else { 0 });

  let image = fixture("gray_2bit.png");
  assert_eq!((image.width(), image.height()), (7, 2));
  check_pixels(&image, |x, y, _| ((x + y) % 4) as u8 * 0x55);

  let image = fixture("gray_4bit_adam7.png");
  assert_eq!((image.width(), image.height()), (9, 9));
  check_pixels(&image, |x, y, _| ((x + 2 * y) % 16) as u8 * 0x11);
}

#[test]
fn test_16_bit_fixtures() {
  let image = fixture("rgb_16bit.png");
  assert_eq!((image.width(), image.height(), image.layout()), (3, 2, ChannelLayout::RGB));
  check_pixels(&image, fixture_sample);

  let image = fixture("rgba_16bit_adam7.png");
  assert_eq!((image.width(), image.height(), image.layout()), (6, 5, ChannelLayout::RGBA));
  check_pixels(&image, fixture_sample);
}

#[test]
fn test_8_bit_fixtures() {
  let image = fixture("rgb_adam7.png");
  assert_eq!((image.width(), image.height(), image.layout()), (11, 7, ChannelLayout::RGB));
  check_pixels(&image, fixture_sample);

  let image = fixture("gray_alpha.png");
  assert_eq!((image.width(), image.height(), image.layout()), (4, 3, ChannelLayout::YA));
  check_pixels(&image, fixture_sample);

  let image = fixture("rgba.png");
  assert_eq!((image.width(), image.height(), image.layout()), (4, 4, ChannelLayout::RGBA));
  check_pixels(&image, fixture_sample);
}

#[test]
fn test_alpha_is_dropped_by_color_models() {
  let rgba = fixture("rgba.png");
  let rgb: PlanarImage<u8> = read_png("tests/fixtures/rgba.png", ColorModel::Rgb).unwrap();
  assert_eq!(rgb.channels(), 3);
  assert_eq!(rgb.samples(), &rgba.samples()[..4 * 4 * 3]);

  let gray: PlanarImage<u8> = read_png("tests/fixtures/gray_alpha.png", ColorModel::Gray).unwrap();
  assert_eq!(gray.layout(), ChannelLayout::Y);
  check_pixels(&gray, fixture_sample);

  let from_gray: PlanarImage<u8> =
    read_png("tests/fixtures/gray_alpha.png", ColorModel::Rgb).unwrap();
  assert_eq!(from_gray.channels(), 3);
  check_pixels(&from_gray, |x, y, _| fixture_sample(x, y, 0));
}

#[test]
fn test_bad_fixtures_are_errors() {
  let indexed = read_png::<u8, _>("tests/fixtures/indexed.png", ColorModel::Unchanged);
  assert_eq!(indexed, Err(PlanarPngError::Png(PngError::UnsupportedColorType)));

  let truncated = read_png::<u8, _>("tests/fixtures/truncated.png", ColorModel::Unchanged);
  assert_eq!(truncated, Err(PlanarPngError::Png(PngError::Truncated)));

  let missing = read_png::<u8, _>("tests/fixtures/no_such_file.png", ColorModel::Unchanged);
  assert_eq!(missing, Err(PlanarPngError::Io(std::io::ErrorKind::NotFound)));
}
