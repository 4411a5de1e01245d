//! Error types for the epitaph-core library.
//!
//! This module provides comprehensive error handling using the `thiserror` crate,
//! with one variant per decode failure kind. Decoding is first-failure-wins:
//! every error describes the single invariant violation that stopped the decode.

use thiserror::Error;

/// Result type alias for epitaph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all artifact decode failures
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Input buffer too short to contain the framing header and a payload
    #[error("truncated input: {length} bytes, but the framing header alone is {expected} bytes")]
    TruncatedInput {
        /// Length of the input buffer
        length: usize,
        /// Size of the framing header the buffer must exceed
        expected: usize,
    },

    /// Input does not begin with the crash-report magic bytes
    #[error("invalid header: input does not begin with the crash-report magic")]
    InvalidHeader,

    /// Artifact was produced with a format version this decoder does not support
    #[error("unsupported format version {found} (this decoder supports version {supported})")]
    UnsupportedVersion {
        /// Version number found in the header
        found: u32,
        /// The one version this decoder supports
        supported: u32,
    },

    /// The payload could not be parsed as a message tree
    #[error("malformed message tree: {0}")]
    MalformedMessageTree(#[from] prost::DecodeError),

    /// A required section is absent from the artifact
    #[error("missing required section '{section}'")]
    MissingSection {
        /// Name of the absent section
        section: &'static str,
    },

    /// A required field is absent within a present section
    #[error("missing required field '{field}' in section '{section}'")]
    MissingField {
        /// Section the field belongs to
        section: &'static str,
        /// Name of the absent field
        field: &'static str,
    },

    /// A field is present but its value violates an invariant
    #[error("invalid value for field '{field}' in section '{section}': {reason}")]
    InvalidFieldValue {
        /// Section the field belongs to
        section: &'static str,
        /// Name of the offending field
        field: &'static str,
        /// Description of the violated invariant
        reason: String,
    },
}

impl Error {
    /// Creates a new truncated input error
    pub fn truncated(length: usize, expected: usize) -> Self {
        Self::TruncatedInput { length, expected }
    }

    /// Creates a new unsupported version error
    pub fn unsupported_version(found: u32, supported: u32) -> Self {
        Self::UnsupportedVersion { found, supported }
    }

    /// Creates a new missing section error
    pub fn missing_section(section: &'static str) -> Self {
        Self::MissingSection { section }
    }

    /// Creates a new missing field error
    pub fn missing_field(section: &'static str, field: &'static str) -> Self {
        Self::MissingField { section, field }
    }

    /// Creates a new invalid field value error
    pub fn invalid_field(
        section: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            section,
            field,
            reason: reason.into(),
        }
    }

    /// Returns true if this error was raised by header validation, before any
    /// payload bytes were inspected.
    ///
    /// Framing errors mean the input is not an artifact of this format family
    /// at all (or not a supported revision of it); content errors mean the
    /// framing matched but the payload violates the schema.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::TruncatedInput { .. } | Self::InvalidHeader | Self::UnsupportedVersion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_field("system_info", "os_version");
        assert!(err.to_string().contains("os_version"));
        assert!(err.to_string().contains("system_info"));

        let err = Error::invalid_field("binary_image", "uuid", "expected 16 bytes, found 4");
        assert!(err.to_string().contains("expected 16 bytes"));
    }

    #[test]
    fn test_is_framing() {
        assert!(Error::truncated(3, 8).is_framing());
        assert!(Error::InvalidHeader.is_framing());
        assert!(Error::unsupported_version(9, 1).is_framing());
        assert!(!Error::missing_section("threads").is_framing());
        assert!(!Error::invalid_field("signal", "name", "empty").is_framing());
    }
}
