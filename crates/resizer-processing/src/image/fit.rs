//! Fit geometry
//!
//! A [`FitPlan`] is the pure arithmetic part of a resize: given the fit method, the
//! requested box and the natural source size, it fixes the scaled size, the optional crop
//! and the final canvas. Neither method ever upscales: each requested axis is first clamped
//! to the natural length, and an unconstrained axis takes the natural length.

use resizer_core::{Dimension, FitMethod, ResizerError, ResizerResult};

/// Crop window applied to the scaled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    pub method: FitMethod,
    pub natural: (u32, u32),
    /// Requested box after clamping to the natural size.
    pub bounds: (u32, u32),
    /// Size the source is resampled to.
    pub scaled: (u32, u32),
    /// Center crop for cover fits that overflow the box.
    pub crop: Option<CropRect>,
    /// Size of the encoded output.
    pub canvas: (u32, u32),
}

impl FitPlan {
    pub fn compute(
        method: FitMethod,
        width: Dimension,
        height: Dimension,
        natural_width: u32,
        natural_height: u32,
    ) -> ResizerResult<Self> {
        if natural_width == 0 || natural_height == 0 {
            return Err(ResizerError::InvalidGeometry(format!(
                "source has an empty axis: {}x{}",
                natural_width, natural_height
            )));
        }

        let bounds = (
            width.clamp_to(natural_width),
            height.clamp_to(natural_height),
        );
        let ratio_w = bounds.0 as f64 / natural_width as f64;
        let ratio_h = bounds.1 as f64 / natural_height as f64;

        let plan = match method {
            FitMethod::Contain => {
                let scale = ratio_w.min(ratio_h);
                let scaled = (
                    scale_axis(natural_width, scale).min(bounds.0),
                    scale_axis(natural_height, scale).min(bounds.1),
                );
                FitPlan {
                    method,
                    natural: (natural_width, natural_height),
                    bounds,
                    scaled,
                    crop: None,
                    canvas: scaled,
                }
            }
            FitMethod::Cover => {
                let scale = ratio_w.max(ratio_h);
                let scaled = (
                    scale_axis(natural_width, scale).max(bounds.0),
                    scale_axis(natural_height, scale).max(bounds.1),
                );
                let crop = (scaled != bounds).then(|| CropRect {
                    x: (scaled.0 - bounds.0) / 2,
                    y: (scaled.1 - bounds.1) / 2,
                    width: bounds.0,
                    height: bounds.1,
                });
                FitPlan {
                    method,
                    natural: (natural_width, natural_height),
                    bounds,
                    scaled,
                    crop,
                    canvas: bounds,
                }
            }
        };

        if plan.canvas.0 == 0 || plan.canvas.1 == 0 || plan.scaled.0 == 0 || plan.scaled.1 == 0 {
            return Err(ResizerError::InvalidGeometry(format!(
                "{} fit of {}x{} into {}x{} collapses to {}x{}",
                method, natural_width, natural_height, width, height, plan.canvas.0, plan.canvas.1
            )));
        }

        Ok(plan)
    }

    /// Whether the source has to be resampled at all.
    pub fn needs_resample(&self) -> bool {
        self.scaled != self.natural
    }
}

fn scale_axis(natural: u32, scale: f64) -> u32 {
    (natural as f64 * scale).round() as u32
}
