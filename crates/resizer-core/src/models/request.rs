use crate::error::ResizerError;
use crate::fingerprint::ValidatedFingerprint;
use crate::models::record::ValidatedKey;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::NonZeroU32;
use std::str::FromStr;
use url::Url;

/// One axis of the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// The axis follows the source aspect ratio.
    Unconstrained,
    Pixels(NonZeroU32),
}

impl Dimension {
    pub fn pixels(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Dimension::Pixels)
    }

    /// Resolve against a natural length. Never exceeds `natural`.
    pub fn clamp_to(self, natural: u32) -> u32 {
        match self {
            Dimension::Unconstrained => natural,
            Dimension::Pixels(n) => n.get().min(natural),
        }
    }

    /// Column encoding: `0` stands for unconstrained.
    pub fn to_stored(self) -> i32 {
        match self {
            Dimension::Unconstrained => 0,
            Dimension::Pixels(n) => i32::try_from(n.get()).unwrap_or(i32::MAX),
        }
    }

    pub fn from_stored(value: i32) -> Self {
        u32::try_from(value)
            .ok()
            .and_then(Dimension::pixels)
            .unwrap_or(Dimension::Unconstrained)
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Dimension::Unconstrained => f.write_str("auto"),
            Dimension::Pixels(n) => write!(f, "{}", n),
        }
    }
}

/// How the source is fitted into the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitMethod {
    /// Scale uniformly so the whole image fits inside the box; no padding.
    #[default]
    Contain,
    /// Scale uniformly so the box is filled, then center-crop the overflow.
    Cover,
}

impl FitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            FitMethod::Contain => "contain",
            FitMethod::Cover => "cover",
        }
    }
}

impl FromStr for FitMethod {
    type Err = ResizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contain" => Ok(FitMethod::Contain),
            "cover" => Ok(FitMethod::Cover),
            _ => Err(ResizerError::InvalidRequest(format!(
                "Unsupported method: {}",
                s
            ))),
        }
    }
}

impl Display for FitMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Encoded output format. The set is closed: unknown tokens are rejected at validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
        }
    }

    /// Whether the encoder honours a quality setting.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = ResizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(ResizerError::InvalidRequest(format!(
                "Unsupported format: {}",
                s
            ))),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A request that passed validation. Produced only by [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub url: Url,
    pub fingerprint: ValidatedFingerprint,
    pub width: Dimension,
    pub height: Dimension,
    pub method: FitMethod,
    pub format: OutputFormat,
    /// 1-100 for lossy formats, 0 otherwise.
    pub quality: u8,
}

impl ValidatedRequest {
    pub fn validated_key(&self) -> ValidatedKey {
        ValidatedKey {
            fingerprint: self.fingerprint.clone(),
            width: self.width,
            height: self.height,
            method: self.method,
            format: self.format,
            quality: self.quality,
        }
    }

    /// Deterministic object name under `prefix` for this request's output.
    pub fn object_name(&self, prefix: &str) -> String {
        format!(
            "{}{}/{}x{}-{}-q{}.{}",
            prefix,
            self.fingerprint,
            self.width,
            self.height,
            self.method,
            self.quality,
            self.format.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_clamp() {
        assert_eq!(Dimension::Unconstrained.clamp_to(14), 14);
        assert_eq!(Dimension::pixels(5).unwrap().clamp_to(14), 5);
        assert_eq!(Dimension::pixels(100).unwrap().clamp_to(14), 14);
        assert!(Dimension::pixels(0).is_none());
    }

    #[test]
    fn test_dimension_stored_encoding() {
        assert_eq!(Dimension::Unconstrained.to_stored(), 0);
        assert_eq!(Dimension::from_stored(0), Dimension::Unconstrained);
        assert_eq!(Dimension::from_stored(-3), Dimension::Unconstrained);
        assert_eq!(Dimension::from_stored(42), Dimension::pixels(42).unwrap());
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("Gif".parse::<OutputFormat>().unwrap(), OutputFormat::Gif);
        assert!("webp".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
    }

    #[test]
    fn test_method_tokens() {
        assert_eq!("COVER".parse::<FitMethod>().unwrap(), FitMethod::Cover);
        assert!("fill".parse::<FitMethod>().is_err());
    }

    #[test]
    fn test_object_name() {
        let url = Url::parse("https://example.com/a.png").unwrap();
        let request = ValidatedRequest {
            fingerprint: ValidatedFingerprint::of_url(&url),
            url,
            width: Dimension::pixels(300).unwrap(),
            height: Dimension::Unconstrained,
            method: FitMethod::Cover,
            format: OutputFormat::Png,
            quality: 0,
        };
        let name = request.object_name("resized/");
        assert!(name.starts_with("resized/"));
        assert!(name.ends_with("/300xauto-cover-q0.png"));
    }
}
