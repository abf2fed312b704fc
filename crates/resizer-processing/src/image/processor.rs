//! Image processor - decoding and orientation correction of fetched sources

use crate::image::orientation::ImageOrientation;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use img_parts::{jpeg::Jpeg, png::Png, ImageEXIF};
use resizer_core::{ResizerError, ResizerResult};
use std::io::Cursor;

/// Upright pixels of a decoded source, owned by one pipeline run.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: DynamicImage,
    source_format: ImageFormat,
    orientation: u8,
}

impl DecodedImage {
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Natural size after orientation correction.
    pub fn natural_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    /// EXIF orientation found in the source, 1 when absent.
    pub fn orientation(&self) -> u8 {
        self.orientation
    }
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode JPEG, PNG or GIF bytes and bring them upright.
    ///
    /// The format is sniffed from content. Anything else, including a truncated or
    /// corrupt stream, is an [`ResizerError::UnprocessableSource`].
    pub fn preprocess(data: &[u8]) -> ResizerResult<DecodedImage> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizerError::UnprocessableSource(format!("Unreadable source: {}", e)))?;

        let source_format = match reader.format() {
            Some(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif)) => format,
            Some(other) => {
                return Err(ResizerError::UnprocessableSource(format!(
                    "Unsupported source format: {:?}",
                    other
                )))
            }
            None => {
                return Err(ResizerError::UnprocessableSource(
                    "Source is not a recognised image".to_string(),
                ))
            }
        };

        let img = reader.decode().map_err(|e| {
            ResizerError::UnprocessableSource(format!("Failed to decode source: {}", e))
        })?;

        let orientation = Self::read_exif_orientation(data);
        let pixels = ImageOrientation::apply(img, orientation);

        Ok(DecodedImage {
            pixels,
            source_format,
            orientation,
        })
    }

    /// Read the EXIF orientation tag (1-8) from JPEG or PNG data. Returns 1 when there is
    /// no EXIF block, no orientation tag, or an out-of-range value.
    pub fn read_exif_orientation(data: &[u8]) -> u8 {
        let Some(raw_exif) = Self::extract_exif(data) else {
            return 1;
        };

        let exif = match exif::Reader::new().read_raw(raw_exif) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable EXIF block");
                return 1;
            }
        };

        exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .and_then(|value| u8::try_from(value).ok())
            .filter(|value| (1..=8).contains(value))
            .unwrap_or(1)
    }

    /// Raw TIFF-structured EXIF payload of a JPEG APP1 segment or PNG eXIf chunk.
    fn extract_exif(data: &[u8]) -> Option<Vec<u8>> {
        let bytes = bytes::Bytes::copy_from_slice(data);
        if let Ok(jpeg) = Jpeg::from_bytes(bytes.clone()) {
            return jpeg.exif().map(|exif| exif.to_vec());
        }
        if let Ok(png) = Png::from_bytes(bytes) {
            return png.exif().map(|exif| exif.to_vec());
        }
        None
    }
}
