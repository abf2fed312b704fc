//! Deterministic SHA-256 fingerprints for the two cache tiers and for encoded results.
//!
//! A [`ValidatedFingerprint`] identifies a source image by its canonical URL only, so every
//! size/format variant of one source shares it. A [`NormalizedFingerprint`] additionally
//! binds the decoded natural size, which lets requests that resolve to the same output
//! share a cache entry.

use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter, Result as FmtResult};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFingerprint(String);

impl ValidatedFingerprint {
    /// Hash the WHATWG serialisation of `url` with its fragment removed.
    pub fn of_url(url: &Url) -> Self {
        let mut canonical = url.clone();
        canonical.set_fragment(None);
        Self(hex::encode(Sha256::digest(canonical.as_str().as_bytes())))
    }

    /// Rehydrate a fingerprint read back from the metadata store.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ValidatedFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedFingerprint(String);

impl NormalizedFingerprint {
    pub fn derive(validated: &ValidatedFingerprint, natural_width: u32, natural_height: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(validated.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(natural_width.to_be_bytes());
        hasher.update(natural_height.to_be_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NormalizedFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Content hash of encoded bytes, sent as the `ETag` header and stored with the record.
pub fn content_etag(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_validated_fingerprint_is_stable() {
        let a = ValidatedFingerprint::of_url(&url("https://example.com/a.jpg"));
        let b = ValidatedFingerprint::of_url(&url("https://example.com/a.jpg"));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_validated_fingerprint_canonicalises_url() {
        let plain = ValidatedFingerprint::of_url(&url("https://example.com/a.jpg"));
        let noisy = ValidatedFingerprint::of_url(&url("HTTPS://Example.COM:443/a.jpg#frag"));
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_validated_fingerprint_keeps_query() {
        let a = ValidatedFingerprint::of_url(&url("https://example.com/a.jpg?v=1"));
        let b = ValidatedFingerprint::of_url(&url("https://example.com/a.jpg?v=2"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalized_fingerprint_binds_natural_size() {
        let v = ValidatedFingerprint::of_url(&url("https://example.com/a.jpg"));
        let a = NormalizedFingerprint::derive(&v, 10, 14);
        let b = NormalizedFingerprint::derive(&v, 10, 14);
        let c = NormalizedFingerprint::derive(&v, 14, 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_content_etag() {
        assert_eq!(
            content_etag(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
