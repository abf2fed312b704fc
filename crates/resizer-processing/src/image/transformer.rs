//! Rendering: resample, crop and encode a decoded source according to a [`FitPlan`].

use crate::compression::ImageCompressor;
use crate::image::fit::FitPlan;
use crate::image::processor::DecodedImage;
use crate::image::resize::ImageResize;
use bytes::Bytes;
use image::GenericImageView;
use resizer_core::fingerprint::content_etag;
use resizer_core::{OutputFormat, ResizerError, ResizerResult};

/// Encoded output of one render.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl RenderedImage {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Strong entity tag of the encoded bytes.
    pub fn etag(&self) -> String {
        content_etag(&self.bytes)
    }
}

pub struct ImageTransformer;

impl ImageTransformer {
    pub fn render(
        decoded: &DecodedImage,
        plan: &FitPlan,
        format: OutputFormat,
        quality: u8,
    ) -> ResizerResult<RenderedImage> {
        if decoded.natural_size() != plan.natural {
            return Err(ResizerError::InvalidGeometry(format!(
                "plan computed for {:?} applied to a {:?} source",
                plan.natural,
                decoded.natural_size()
            )));
        }

        let mut img = if plan.needs_resample() {
            ImageResize::resize_image(decoded.pixels(), plan.scaled.0, plan.scaled.1)
        } else {
            decoded.pixels().clone()
        };

        if let Some(crop) = plan.crop {
            img = img.crop_imm(crop.x, crop.y, crop.width, crop.height);
        }

        let (width, height) = img.dimensions();
        if (width, height) != plan.canvas {
            return Err(ResizerError::InvalidGeometry(format!(
                "rendered {}x{} but expected {}x{}",
                width, height, plan.canvas.0, plan.canvas.1
            )));
        }

        tracing::debug!(
            method = %plan.method,
            natural = ?plan.natural,
            scaled = ?plan.scaled,
            canvas = ?plan.canvas,
            format = %format,
            "Rendering image"
        );

        let bytes = ImageCompressor::encode(&img, format, quality).map_err(|e| {
            ResizerError::Internal(format!("Failed to encode {} output: {}", format, e))
        })?;

        Ok(RenderedImage {
            bytes,
            width,
            height,
            format,
        })
    }
}
