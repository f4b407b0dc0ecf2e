//! Client-side document model
//!
//! Representations of the remote service's entities as the session store
//! sees them. Identities are opaque strings assigned by the service; the
//! client never mints its own.

mod types;

pub use types::{
    Annotation, AnnotationId, AnnotationKind, Document, DocumentId, DocumentKind, SearchMatch,
    Version, VersionId,
};
