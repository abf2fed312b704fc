//! Source images generated in code.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const GLYPH_WIDTH: u32 = 30;
pub const GLYPH_HEIGHT: u32 = 42;

fn glyph() -> DynamicImage {
    // Dark "F" on a light background: a 10x14 bitmap scaled x3.
    DynamicImage::ImageRgb8(RgbImage::from_fn(GLYPH_WIDTH, GLYPH_HEIGHT, |x, y| {
        let (cx, cy) = (x / 3, y / 3);
        let stem = (2..=3).contains(&cx) && (2..=11).contains(&cy);
        let top = (2..=7).contains(&cx) && (2..=3).contains(&cy);
        let middle = (2..=6).contains(&cx) && (6..=7).contains(&cy);
        if stem || top || middle {
            Rgb([20, 20, 20])
        } else {
            Rgb([235, 235, 235])
        }
    }))
}

fn encode(format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    glyph().write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn glyph_png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

pub fn glyph_jpeg() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

/// Bytes that no decoder accepts.
pub fn noise() -> Vec<u8> {
    b"this is not an image, just text pretending to be one".to_vec()
}
