use anyhow::Result;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use resizer_core::OutputFormat;
use std::io::Cursor;

/// Encoder for rendered images
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` as `format`. `quality` (1-100) is honoured by lossy formats only.
    pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Bytes> {
        match format {
            OutputFormat::Jpeg => Self::compress_jpeg(img, quality),
            OutputFormat::Png => Self::compress_png(img),
            OutputFormat::Gif => Self::compress_gif(img),
        }
    }

    /// Compress to JPEG using mozjpeg
    fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality.clamp(1, 100) as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(&rgb_img)?;
        let jpeg_data = comp.finish()?;

        Ok(Bytes::from(jpeg_data))
    }

    fn compress_png(img: &DynamicImage) -> Result<Bytes> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(Bytes::from(buffer))
    }

    /// GIF output goes through RGBA so that every source color type can be quantized.
    fn compress_gif(img: &DynamicImage) -> Result<Bytes> {
        let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
        let mut buffer = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Gif)?;
        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn noisy() -> DynamicImage {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8, 255])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_encode_each_format() {
        let img = noisy();
        for (format, expected) in [
            (OutputFormat::Jpeg, ImageFormat::Jpeg),
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Gif, ImageFormat::Gif),
        ] {
            let data = ImageCompressor::encode(&img, format, 80).unwrap();
            assert_eq!(image::guess_format(&data).unwrap(), expected);
            let decoded = image::load_from_memory(&data).unwrap();
            assert_eq!(decoded.dimensions(), (64, 64));
        }
    }

    #[test]
    fn test_jpeg_quality_changes_size() {
        let img = noisy();
        let low = ImageCompressor::encode(&img, OutputFormat::Jpeg, 10).unwrap();
        let high = ImageCompressor::encode(&img, OutputFormat::Jpeg, 100).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_png_ignores_quality() {
        let img = noisy();
        let a = ImageCompressor::encode(&img, OutputFormat::Png, 1).unwrap();
        let b = ImageCompressor::encode(&img, OutputFormat::Png, 100).unwrap();
        assert_eq!(a, b);
    }
}
