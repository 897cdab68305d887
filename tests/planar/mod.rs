use planar_png::{
  read_png, read_png_bytes, read_png_from, write_png, write_png_bytes, write_png_to,
  write_png_with, ChannelLayout, ColorModel, PlanarImage, PngEncodeOptions,
};

use super::fixture_sample;

fn pattern_image(width: u32, height: u32, layout: ChannelLayout) -> PlanarImage<u8> {
  let mut samples = Vec::new();
  for c in 0..layout.channel_count() {
    for y in 0..height {
      for x in 0..width {
        samples.push(fixture_sample(x, y, c));
      }
    }
  }
  PlanarImage::new(width, height, layout, samples).unwrap()
}

fn temp_path(name: &str) -> std::path::PathBuf {
  std::env::temp_dir().join(format!("planar_png_{}_{name}", std::process::id()))
}

/// Only set in the child process; the `child_` tests do nothing without it.
const CHILD_ENV: &str = "PLANAR_PNG_CHILD_TEST";

/// Runs one ignored test of this binary in a child process, with `stdin` fed
/// to it, and returns the child's whole stdout.
fn run_child_test(name: &str, stdin: &[u8]) -> Vec<u8> {
  use std::{
    io::Write,
    process::{Command, Stdio},
  };
  let mut child = Command::new(std::env::current_exe().unwrap())
    .args([name, "--exact", "--ignored", "--nocapture", "--test-threads=1"])
    .env(CHILD_ENV, "1")
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .spawn()
    .unwrap();
  let mut pipe = child.stdin.take().unwrap();
  pipe.write_all(stdin).unwrap();
  drop(pipe);
  let output = child.wait_with_output().unwrap();
  assert!(output.status.success(), "{name} failed in the child process");
  let text = String::from_utf8_lossy(&output.stdout);
  assert!(text.contains("1 passed"), "{name} didn't run in the child process");
  output.stdout
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[test]
fn test_rgb_2x2_survives_a_file_round_trip() {
  let samples = vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
  let image = PlanarImage::new(2, 2, ChannelLayout::RGB, samples).unwrap();
  for interlace in [false, true] {
    let path = temp_path(&format!("rgb_2x2_{interlace}.png"));
    let options = PngEncodeOptions { interlace, ..Default::default() };
    write_png_with(&path, &image, &options).unwrap();
    let back: PlanarImage<u8> = read_png(&path, ColorModel::Unchanged).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(back, image);
  }
}

#[test]
fn test_every_sample_type_round_trips() {
  let image = pattern_image(13, 6, ChannelLayout::RGBA);
  let png = write_png_bytes(&image, &PngEncodeOptions::default()).unwrap();

  let words: PlanarImage<u16> = read_png_bytes(&png, ColorModel::Unchanged).unwrap();
  assert_eq!(words.get(3, 2, 1), Some(&(u16::from(fixture_sample(3, 2, 1)) * 257)));
  let floats: PlanarImage<f32> = read_png_bytes(&png, ColorModel::Unchanged).unwrap();
  let doubles: PlanarImage<f64> = read_png_bytes(&png, ColorModel::Unchanged).unwrap();

  for png in [
    write_png_bytes(&words, &PngEncodeOptions::default()).unwrap(),
    write_png_bytes(&floats, &PngEncodeOptions::default()).unwrap(),
    write_png_bytes(&doubles, &PngEncodeOptions::default()).unwrap(),
  ] {
    let back: PlanarImage<u8> = read_png_bytes(&png, ColorModel::Unchanged).unwrap();
    assert_eq!(back, image);
  }
}

#[test]
fn test_streams() {
  let image = pattern_image(5, 4, ChannelLayout::YA);
  let mut buffer = Vec::new();
  write_png_to(&mut buffer, &image, &PngEncodeOptions::default()).unwrap();
  let back: PlanarImage<u8> = read_png_from(buffer.as_slice(), ColorModel::Unchanged).unwrap();
  assert_eq!(back, image);
}

#[test]
fn test_gray_file_is_one_channel() {
  let path = temp_path("gray.png");
  write_png(&path, &pattern_image(7, 3, ChannelLayout::RGB)).unwrap();
  let gray: PlanarImage<f64> = read_png(&path, ColorModel::Gray).unwrap();
  std::fs::remove_file(&path).unwrap();
  assert_eq!(gray.channels(), 1);
  assert_eq!(gray.samples().len(), 7 * 3);
}

#[test]
#[ignore = "run by test_dash_path_writes_stdout in a child process"]
fn child_write_pattern_to_stdout() {
  if std::env::var_os(CHILD_ENV).is_none() {
    return;
  }
  write_png("-", &pattern_image(6, 5, ChannelLayout::RGB)).unwrap();
}

#[test]
fn test_dash_path_writes_stdout() {
  let out = run_child_test("planar::child_write_pattern_to_stdout", &[]);
  // the test harness prints its own lines around the PNG data.
  let start = find(&out, b"\x89PNG\r\n\x1a\n").unwrap();
  let end = rfind(&out, b"IEND").unwrap() + 8;
  let back: PlanarImage<u8> = read_png_bytes(&out[start..end], ColorModel::Unchanged).unwrap();
  assert_eq!(back, pattern_image(6, 5, ChannelLayout::RGB));
}

#[test]
#[ignore = "run by test_dash_path_reads_stdin in a child process"]
fn child_read_pattern_from_stdin() {
  if std::env::var_os(CHILD_ENV).is_none() {
    return;
  }
  let image: PlanarImage<u8> = read_png("-", ColorModel::Unchanged).unwrap();
  assert_eq!(image, pattern_image(3, 7, ChannelLayout::YA));
}

#[test]
fn test_dash_path_reads_stdin() {
  let png = write_png_bytes(&pattern_image(3, 7, ChannelLayout::YA), &Default::default()).unwrap();
  run_child_test("planar::child_read_pattern_from_stdin", &png);
}

#[test]
fn test_threads_match_sequential() {
  let layouts = [ChannelLayout::Y, ChannelLayout::YA, ChannelLayout::RGB, ChannelLayout::RGBA];
  let run = |i: usize| {
    let image = pattern_image(9 + i as u32, 4 + i as u32, layouts[i % 4]);
    let options = PngEncodeOptions { interlace: i % 2 == 0, ..Default::default() };
    let png = write_png_bytes(&image, &options).unwrap();
    let back: PlanarImage<f32> = read_png_bytes(&png, ColorModel::Rgb).unwrap();
    (png, back)
  };
  let sequential: Vec<_> = (0..8).map(run).collect();
  let threaded: Vec<_> = std::thread::scope(|s| {
    let handles: Vec<_> = (0..8).map(|i| s.spawn(move || run(i))).collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });
  assert_eq!(sequential, threaded);
}
