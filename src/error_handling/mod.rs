//! Error handling.
//!
//! This module provides:
//! - Error type definitions for initialization, probe input and the cache
//! - The coarse failure kinds reported for failed hops
//! - Categorization of `reqwest` errors into those kinds
//!
//! Probe errors never escape as `Err`: malformed input and transport failures
//! are folded into the structured probe result.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, describe_error_chain};
pub use types::{
    BodyError, CacheError, FailureKind, InitializationError, ProbeInputError, ResolveError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_failure_kind_descriptions_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in FailureKind::iter() {
            assert!(seen.insert(kind.as_str()), "duplicate description for {:?}", kind);
        }
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
        let json = serde_json::to_string(&FailureKind::Dns).unwrap();
        assert_eq!(json, "\"dns\"");
    }

    #[test]
    fn test_probe_input_error_messages() {
        let err = ProbeInputError::UnsupportedScheme {
            scheme: "ftp".to_string(),
            url: "ftp://example.com/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported URL scheme 'ftp' in ftp://example.com/"
        );
        assert_eq!(
            ProbeInputError::InvalidMethod("G ET".to_string()).to_string(),
            "Invalid HTTP method: G ET"
        );
    }

    #[test]
    fn test_cache_error_messages() {
        assert_eq!(
            CacheError::Full(256).to_string(),
            "Response cache is full (256 entries)"
        );
    }
}
