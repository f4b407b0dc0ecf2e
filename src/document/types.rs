//! Core document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque document identity assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

/// Opaque version identity assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

/// Opaque annotation identity assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_impls!(DocumentId);
id_impls!(VersionId);
id_impls!(AnnotationId);

/// File kind of a document, selecting the renderer strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Word,
    Excel,
    Image,
    Other,
}

impl DocumentKind {
    /// Parse the service's free-form file-type label. Unknown labels map
    /// to `Other` rather than failing the whole document fetch.
    pub fn parse(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" | "word" => Self::Word,
            "xls" | "xlsx" | "excel" => Self::Excel,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "image" => Self::Image,
            _ => Self::Other,
        }
    }

    /// Detect kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match DocumentKind::parse(ext) {
            Self::Other => None,
            kind => Some(kind),
        }
    }

    /// Detect kind from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Word)
            }
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Excel)
            }
            m if m.starts_with("image/") => Some(Self::Image),
            _ => None,
        }
    }
}

/// A document as fetched from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub kind: DocumentKind,
    /// URL of the file the document was originally created with.
    pub source_url: String,
    /// The version the service declares current, if any.
    pub current_version: Option<VersionId>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// An immutable snapshot of a document's content. The version set for a
/// document only grows; versions are never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: VersionId,
    pub sequence: u32,
    pub source_url: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// Stand-in version backed by the document's own uploaded file, used
    /// when the service reports no version history yet.
    pub fn baseline(document: &Document) -> Self {
        Version {
            id: VersionId::new(format!("{}-original", document.id)),
            sequence: 0,
            source_url: document.source_url.clone(),
            created_by: Some(document.owner.clone()),
            created_at: document.created_at,
        }
    }
}

/// Kinds of user-authored annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Comment,
    Highlight,
}

/// A note or highlight attached to a document. `page` is `None` for
/// document-wide annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub document: DocumentId,
    pub kind: AnnotationKind,
    pub content: String,
    pub page: Option<u32>,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// One search hit within the active version's page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub page: u32,
    pub text: String,
    pub preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_covers_service_labels() {
        assert_eq!(DocumentKind::parse("PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::parse("docx"), DocumentKind::Word);
        assert_eq!(DocumentKind::parse("xlsx"), DocumentKind::Excel);
        assert_eq!(DocumentKind::parse("jpeg"), DocumentKind::Image);
        assert_eq!(DocumentKind::parse("epub"), DocumentKind::Other);
    }

    #[test]
    fn kind_from_mime() {
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime("image/png"), Some(DocumentKind::Image));
        assert_eq!(
            DocumentKind::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(DocumentKind::Word)
        );
        assert_eq!(DocumentKind::from_mime("text/plain"), None);
    }

    #[test]
    fn baseline_version_reuses_document_source() {
        let document = Document {
            id: DocumentId::new("7"),
            name: "contract.pdf".to_string(),
            kind: DocumentKind::Pdf,
            source_url: "https://files.example/contract.pdf".to_string(),
            current_version: None,
            owner: "ana".to_string(),
            created_at: Utc::now(),
        };
        let baseline = Version::baseline(&document);
        assert_eq!(baseline.sequence, 0);
        assert_eq!(baseline.source_url, document.source_url);
        assert_eq!(baseline.created_by.as_deref(), Some("ana"));
    }
}
