//! Gateway trait
//!
//! Abstract interface to the remote document service. The session store
//! holds this behind an `Arc<dyn DocumentGateway>` so tests can substitute
//! a programmable stub for the HTTP transport.

use async_trait::async_trait;

use super::error::GatewayResult;
use crate::credential::Credential;
use crate::document::{
    Annotation, AnnotationId, AnnotationKind, Document, DocumentId, SearchMatch, Version,
};

/// Remote document service operations.
///
/// `delete_annotation` is idempotent on the service side; deleting an id
/// that is already gone reports `NotFound`, which callers may treat as
/// success.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// List the documents visible to this credential.
    async fn list_documents(&self, credential: &Credential) -> GatewayResult<Vec<Document>>;

    /// Fetch a single document.
    async fn fetch_document(
        &self,
        credential: &Credential,
        id: &DocumentId,
    ) -> GatewayResult<Document>;

    /// Fetch the full version history of a document.
    async fn fetch_versions(
        &self,
        credential: &Credential,
        document: &DocumentId,
    ) -> GatewayResult<Vec<Version>>;

    /// Upload file content as a new version of the document.
    async fn create_version(
        &self,
        credential: &Credential,
        document: &DocumentId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> GatewayResult<Version>;

    /// Fetch all annotations on a document.
    async fn fetch_annotations(
        &self,
        credential: &Credential,
        document: &DocumentId,
    ) -> GatewayResult<Vec<Annotation>>;

    /// Create an annotation. `page` of `None` means document-wide.
    async fn create_annotation(
        &self,
        credential: &Credential,
        document: &DocumentId,
        content: &str,
        kind: AnnotationKind,
        page: Option<u32>,
    ) -> GatewayResult<Annotation>;

    /// Replace an annotation's content, kind and page anchor.
    async fn update_annotation(
        &self,
        credential: &Credential,
        document: &DocumentId,
        annotation: &AnnotationId,
        content: &str,
        kind: AnnotationKind,
        page: Option<u32>,
    ) -> GatewayResult<Annotation>;

    /// Delete an annotation.
    async fn delete_annotation(
        &self,
        credential: &Credential,
        document: &DocumentId,
        annotation: &AnnotationId,
    ) -> GatewayResult<()>;

    /// Full-text search within a document's extracted content.
    async fn search(
        &self,
        credential: &Credential,
        document: &DocumentId,
        query: &str,
    ) -> GatewayResult<Vec<SearchMatch>>;
}
