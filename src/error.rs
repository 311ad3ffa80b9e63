//! Unified error handling for the track-stitcher library.
//!
//! Only the upstream boundary can abort an import. Unusable fragments,
//! empty results and fragments the stitcher could not connect are absorbed
//! into the data instead of being reported here.

use thiserror::Error;

/// Unified error type for track-stitcher operations.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// The geographic-data service failed, returned a non-success status,
    /// or sent a body that could not be decoded.
    #[error("{}", upstream_message(.message, .status_code))]
    UpstreamUnavailable {
        message: String,
        status_code: Option<u16>,
    },
    /// Region name is not in the region catalogue
    #[error("Unknown region '{name}'")]
    UnknownRegion { name: String },
    /// Review action referenced a candidate that is not in the session
    #[error("Unknown import candidate '{id}'")]
    UnknownCandidate { id: String },
    /// Bulk import was called without any approved records
    #[error("No approved roads to import")]
    NothingToImport,
    /// Curated-dataset store error
    #[error("Store error: {message}")]
    Store { message: String },
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn upstream_message(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("Upstream unavailable ({}): {}", code, message),
        None => format!("Upstream unavailable: {}", message),
    }
}

impl ImportError {
    /// Shorthand for an upstream failure without an HTTP status.
    pub fn upstream(message: impl Into<String>) -> Self {
        ImportError::UpstreamUnavailable {
            message: message.into(),
            status_code: None,
        }
    }

    /// Whether this error aborts the pipeline as an upstream failure.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ImportError::UpstreamUnavailable { .. })
    }
}

/// Result type alias for track-stitcher operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Extension trait for converting Option to ImportError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an unknown candidate error.
    fn ok_or_unknown_candidate(self, id: &str) -> Result<T>;

    /// Convert Option to Result with an unknown region error.
    fn ok_or_unknown_region(self, name: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unknown_candidate(self, id: &str) -> Result<T> {
        self.ok_or_else(|| ImportError::UnknownCandidate { id: id.to_string() })
    }

    fn ok_or_unknown_region(self, name: &str) -> Result<T> {
        self.ok_or_else(|| ImportError::UnknownRegion {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImportError::UpstreamUnavailable {
            message: "gateway timeout".to_string(),
            status_code: Some(504),
        };
        assert_eq!(err.to_string(), "Upstream unavailable (504): gateway timeout");
        assert!(err.is_upstream());

        let err = ImportError::upstream("connection refused");
        assert_eq!(err.to_string(), "Upstream unavailable: connection refused");
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_unknown_candidate("42-43");
        assert!(matches!(result, Err(ImportError::UnknownCandidate { .. })));
        assert!(!result.unwrap_err().is_upstream());
    }
}
