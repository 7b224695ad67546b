//! Error types for the alias resolution engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaxonError>;

/// Errors produced by the precompute pipeline, the index loader, and the
/// matching paths.
///
/// Build-time errors are fatal to that build attempt only; a previously
/// published corpus stays authoritative. Matching-time errors degrade to
/// [`TaxonError::IndexUnavailable`] at the manager boundary rather than
/// propagating a panic to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaxonError {
    /// No valid index snapshot is loaded; every match request short-circuits
    /// to this until a corpus is installed.
    #[error("alias index unavailable")]
    IndexUnavailable,

    /// Corrupt or truncated corpus bytes. Collapses to `IndexUnavailable`
    /// once it crosses the alias-manager boundary.
    #[error("corpus decode error: {0}")]
    Decode(String),

    /// An artifact's content hash does not match the manifest entry.
    #[error("checksum mismatch for {path}")]
    ChecksumMismatch { path: String },

    /// A malformed master-list entry. Aborts the whole build; nothing is
    /// published.
    #[error("build failure at row {row}: {reason}")]
    BuildFailure { row: usize, reason: String },

    /// Cooperative abort. Not a failure: no `MatchResult` is emitted and
    /// nothing is logged at error level.
    #[error("evaluation cancelled")]
    Cancelled,

    /// The master list could not be parsed.
    #[error("master list error: {0}")]
    MasterList(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TaxonError {
    fn from(err: std::io::Error) -> Self {
        TaxonError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for TaxonError {
    fn from(err: serde_yaml::Error) -> Self {
        TaxonError::MasterList(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TaxonError::IndexUnavailable.to_string(),
            "alias index unavailable"
        );
        assert_eq!(
            TaxonError::Decode("truncated".to_string()).to_string(),
            "corpus decode error: truncated"
        );
        assert_eq!(
            TaxonError::ChecksumMismatch {
                path: "corpus.bin".to_string()
            }
            .to_string(),
            "checksum mismatch for corpus.bin"
        );
        assert_eq!(
            TaxonError::BuildFailure {
                row: 7,
                reason: "empty alias".to_string()
            }
            .to_string(),
            "build failure at row 7: empty alias"
        );
        assert_eq!(TaxonError::Cancelled.to_string(), "evaluation cancelled");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TaxonError = io.into();
        assert!(matches!(err, TaxonError::Io(_)));
    }

    #[test]
    fn test_cancelled_is_distinct_from_no_index() {
        assert_ne!(TaxonError::Cancelled, TaxonError::IndexUnavailable);
    }
}
