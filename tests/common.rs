#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use img_budget::ImagePayload;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Xorshift so the fixtures stay reproducible without a rand dependency.
struct NoiseSource(u32);

impl NoiseSource {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

pub fn noise_image(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut source = NoiseSource(seed.max(1));
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        let v = source.next();
        Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
    }))
}

pub fn noise_image_with_alpha(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut source = NoiseSource(seed.max(1));
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |_, _| {
        let v = source.next();
        Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8])
    }))
}

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

pub fn png_payload(img: &DynamicImage) -> ImagePayload {
    ImagePayload::new(encode(img, ImageFormat::Png), "image/png")
}

pub fn bmp_payload(img: &DynamicImage) -> ImagePayload {
    ImagePayload::new(encode(img, ImageFormat::Bmp), "image/bmp")
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn write_png(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode(img, ImageFormat::Png)).unwrap();
    path
}
