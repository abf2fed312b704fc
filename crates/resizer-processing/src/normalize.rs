//! Normalizer
//!
//! Resolves a validated request against the decoded source size. The destination box is the
//! canvas the render will produce, so requests that differ only in how they were phrased
//! ("width unconstrained" vs "width larger than the source") share one normalized key.

use crate::image::fit::FitPlan;
use resizer_core::{NormalizedFingerprint, NormalizedKey, ResizerResult, ValidatedRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub fingerprint: NormalizedFingerprint,
    pub dest_width: u32,
    pub dest_height: u32,
    pub plan: FitPlan,
}

impl Normalized {
    /// Tier-2 lookup key for `request`.
    pub fn key(&self, request: &ValidatedRequest) -> NormalizedKey {
        NormalizedKey {
            fingerprint: self.fingerprint.clone(),
            dest_width: self.dest_width,
            dest_height: self.dest_height,
            method: request.method,
            format: request.format,
            quality: request.quality,
        }
    }
}

pub fn normalize(request: &ValidatedRequest, natural: (u32, u32)) -> ResizerResult<Normalized> {
    let (natural_width, natural_height) = natural;
    let plan = FitPlan::compute(
        request.method,
        request.width,
        request.height,
        natural_width,
        natural_height,
    )?;

    Ok(Normalized {
        fingerprint: NormalizedFingerprint::derive(
            &request.fingerprint,
            natural_width,
            natural_height,
        ),
        dest_width: plan.canvas.0,
        dest_height: plan.canvas.1,
        plan,
    })
}
