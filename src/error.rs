//! Session error taxonomy
//!
//! One error per failed operation; the session never retries on its own.
//! `Unauthorized` is the one cross-cutting case: the embedding application
//! should treat it as a signal to drop the stored credential.

use thiserror::Error;

use crate::document::VersionId;

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The service does not know the requested document.
    #[error("document not found")]
    NotFound,

    /// The credential was missing or rejected.
    #[error("credential rejected")]
    Unauthorized,

    /// The version id is not in the loaded version set.
    #[error("unknown version: {0}")]
    UnknownVersion(VersionId),

    /// The service refused or failed the version upload.
    #[error("version upload failed: {0}")]
    UploadFailed(String),

    /// The service refused the annotation operation.
    #[error("annotation rejected: {0}")]
    AnnotationRejected(String),

    /// A search-match index outside the current highlight set.
    #[error("match index {index} out of range ({len} matches)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A version upload is already in flight for this session.
    #[error("a version upload is already in progress")]
    OperationInProgress,

    /// Transport failure below the service's own error reporting.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The session has no loaded document; only `load_document` is valid.
    #[error("no document loaded")]
    NotReady,
}
