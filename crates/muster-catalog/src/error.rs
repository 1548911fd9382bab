//! Error types for document sources.
//!
//! Sources distinguish "the document is absent" (`Ok(None)`, a normal
//! outcome) from genuine failure. Failures are absorbed at the catalog and
//! loader boundaries — composition must degrade, never abort — but the
//! distinction is kept so hosts can log and surface them.

/// Errors a [`DocumentSource`](crate::source::DocumentSource) can report.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached or refused the request.
    #[error("source unavailable for {key}: {reason}")]
    Unavailable { key: String, reason: String },

    /// The document was fetched but could not be parsed.
    #[error("malformed document at {key}: {reason}")]
    Malformed { key: String, reason: String },
}

/// Convenience alias for source results.
pub type SourceResult<T> = Result<T, SourceError>;
