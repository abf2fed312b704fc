//! Resizer Processing Library
//!
//! Decoding, orientation correction, fit geometry, resampling and encoding of images, plus
//! the normalizer that resolves a request against the decoded source size.

pub mod compression;
pub mod image;
pub mod normalize;

pub use compression::ImageCompressor;
pub use crate::image::fit::{CropRect, FitPlan};
pub use crate::image::processor::{DecodedImage, ImageProcessor};
pub use crate::image::transformer::{ImageTransformer, RenderedImage};
pub use normalize::{normalize, Normalized};
