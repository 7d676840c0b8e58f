//! # Media References
//!
//! URIs pointing at photos or videos stored by the upload service.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length of a media URI.
pub const MAX_MEDIA_URI_LEN: usize = 2048;

/// Reference to an uploaded photo or video.
///
/// # Invariants
///
/// - Of the form `scheme://rest` with an alphanumeric scheme
/// - No whitespace, at most [`MAX_MEDIA_URI_LEN`] characters
///
/// # Examples
///
/// ```
/// use estimate_workflow::domain::value_objects::media::MediaRef;
///
/// assert!(MediaRef::parse("https://cdn.example.com/a.jpg").is_ok());
/// assert!(MediaRef::parse("a.jpg").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaRef(String);

impl MediaRef {
    /// Parses a media URI.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` for `mediaRefs` when the URI is
    /// empty, too long, contains whitespace or lacks a scheme.
    pub fn parse(value: &str) -> DomainResult<Self> {
        if value.is_empty() {
            return Err(DomainError::invalid_value("mediaRefs", "must not be empty"));
        }
        if value.len() > MAX_MEDIA_URI_LEN {
            return Err(DomainError::invalid_value(
                "mediaRefs",
                format!("must be at most {MAX_MEDIA_URI_LEN} characters"),
            ));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_value(
                "mediaRefs",
                "must not contain whitespace",
            ));
        }
        let valid_scheme = value.split_once("://").is_some_and(|(scheme, rest)| {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        });
        if !valid_scheme {
            return Err(DomainError::invalid_value(
                "mediaRefs",
                "must be a URI of the form scheme://location",
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the URI.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MediaRef {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaRef> for String {
    fn from(media: MediaRef) -> Self {
        media.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_schemes() {
        for uri in [
            "https://cdn.example.com/damage/1.jpg",
            "s3://bucket/key.mp4",
            "gs://bucket/object",
        ] {
            assert!(MediaRef::parse(uri).is_ok(), "{uri} should parse");
        }
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(MediaRef::parse("photo.jpg").is_err());
        assert!(MediaRef::parse("://nowhere").is_err());
        assert!(MediaRef::parse("https://").is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(MediaRef::parse("https://cdn.example.com/a b.jpg").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let uri = format!("https://{}", "a".repeat(MAX_MEDIA_URI_LEN));
        assert!(MediaRef::parse(&uri).is_err());
    }
}
