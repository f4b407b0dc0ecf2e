//! HTTP gateway implementation
//!
//! Talks to the document service's REST API. Paths and payload shapes
//! follow the service's conventions: trailing slashes, token auth via
//! `Authorization: Token <t>`, multipart file upload for new versions,
//! and list endpoints that may or may not be paginated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart;
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::error::{GatewayError, GatewayResult};
use super::traits::DocumentGateway;
use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::document::{
    Annotation, AnnotationId, AnnotationKind, Document, DocumentId, DocumentKind, SearchMatch,
    Version, VersionId,
};

/// Concrete gateway over the service's REST API.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpGateway {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.header(
            header::AUTHORIZATION,
            format!("Token {}", credential.token()),
        )
    }

    async fn checked(response: Response) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, body))
    }
}

fn classify_status(status: StatusCode, body: String) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized,
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        s if s.is_client_error() => GatewayError::Rejected(body),
        s => GatewayError::Network(format!("service returned {}: {}", s, body)),
    }
}

#[async_trait]
impl DocumentGateway for HttpGateway {
    async fn list_documents(&self, credential: &Credential) -> GatewayResult<Vec<Document>> {
        let response = self
            .authorized(self.client.get(self.url("/documents/")), credential)
            .send()
            .await?;
        let payload: ListPayload<DocumentWire> = Self::checked(response).await?.json().await?;
        Ok(payload.into_vec().into_iter().map(Document::from).collect())
    }

    async fn fetch_document(
        &self,
        credential: &Credential,
        id: &DocumentId,
    ) -> GatewayResult<Document> {
        let response = self
            .authorized(
                self.client.get(self.url(&format!("/documents/{}/", id))),
                credential,
            )
            .send()
            .await?;
        let wire: DocumentWire = Self::checked(response).await?.json().await?;
        Ok(wire.into())
    }

    async fn fetch_versions(
        &self,
        credential: &Credential,
        document: &DocumentId,
    ) -> GatewayResult<Vec<Version>> {
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/documents/{}/versions/", document))),
                credential,
            )
            .send()
            .await?;
        let payload: ListPayload<VersionWire> = Self::checked(response).await?.json().await?;
        Ok(payload.into_vec().into_iter().map(Version::from).collect())
    }

    async fn create_version(
        &self,
        credential: &Credential,
        document: &DocumentId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> GatewayResult<Version> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/documents/{}/versions/", document))),
                credential,
            )
            .multipart(form)
            .send()
            .await?;
        let wire: VersionWire = Self::checked(response).await?.json().await?;
        Ok(wire.into())
    }

    async fn fetch_annotations(
        &self,
        credential: &Credential,
        document: &DocumentId,
    ) -> GatewayResult<Vec<Annotation>> {
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/documents/{}/annotations/", document))),
                credential,
            )
            .send()
            .await?;
        let payload: ListPayload<AnnotationWire> = Self::checked(response).await?.json().await?;
        Ok(payload
            .into_vec()
            .into_iter()
            .map(Annotation::from)
            .collect())
    }

    async fn create_annotation(
        &self,
        credential: &Credential,
        document: &DocumentId,
        content: &str,
        kind: AnnotationKind,
        page: Option<u32>,
    ) -> GatewayResult<Annotation> {
        let body = serde_json::json!({
            "content": content,
            "type": kind_label(kind),
            "page": page,
        });

        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/documents/{}/create-annotation/", document))),
                credential,
            )
            .json(&body)
            .send()
            .await?;
        let wire: AnnotationWire = Self::checked(response).await?.json().await?;
        Ok(wire.into())
    }

    async fn update_annotation(
        &self,
        credential: &Credential,
        document: &DocumentId,
        annotation: &AnnotationId,
        content: &str,
        kind: AnnotationKind,
        page: Option<u32>,
    ) -> GatewayResult<Annotation> {
        let body = serde_json::json!({
            "content": content,
            "type": kind_label(kind),
            "page": page,
        });

        let response = self
            .authorized(
                self.client.put(self.url(&format!(
                    "/documents/{}/annotations/{}/",
                    document, annotation
                ))),
                credential,
            )
            .json(&body)
            .send()
            .await?;
        let wire: AnnotationWire = Self::checked(response).await?.json().await?;
        Ok(wire.into())
    }

    async fn delete_annotation(
        &self,
        credential: &Credential,
        document: &DocumentId,
        annotation: &AnnotationId,
    ) -> GatewayResult<()> {
        let response = self
            .authorized(
                self.client.delete(self.url(&format!(
                    "/documents/{}/annotations/{}/",
                    document, annotation
                ))),
                credential,
            )
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn search(
        &self,
        credential: &Credential,
        document: &DocumentId,
        query: &str,
    ) -> GatewayResult<Vec<SearchMatch>> {
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/documents/{}/search/", document))),
                credential,
            )
            .query(&[("query", query)])
            .send()
            .await?;
        let wire: SearchResponseWire = Self::checked(response).await?.json().await?;
        Ok(wire.matches.into_iter().map(SearchMatch::from).collect())
    }
}

fn kind_label(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Comment => "comment",
        AnnotationKind::Highlight => "highlight",
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// List endpoints return either a bare array or a paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Paginated { results } => results,
            ListPayload::Plain(items) => items,
        }
    }
}

#[derive(Deserialize)]
struct OwnerWire {
    username: String,
}

#[derive(Deserialize)]
struct DocumentWire {
    id: i64,
    name: String,
    file_type: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    current_version_id: Option<i64>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    owner: Option<OwnerWire>,
}

impl From<DocumentWire> for Document {
    fn from(wire: DocumentWire) -> Self {
        Document {
            id: DocumentId::new(wire.id.to_string()),
            name: wire.name,
            kind: DocumentKind::parse(&wire.file_type),
            source_url: wire.url.unwrap_or_default(),
            current_version: wire.current_version_id.map(|id| VersionId::new(id.to_string())),
            owner: wire.owner.map(|o| o.username).unwrap_or_default(),
            created_at: wire.created_at,
        }
    }
}

#[derive(Deserialize)]
struct VersionWire {
    id: i64,
    version_number: u32,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<VersionWire> for Version {
    fn from(wire: VersionWire) -> Self {
        Version {
            id: VersionId::new(wire.id.to_string()),
            sequence: wire.version_number,
            source_url: wire.file_url.unwrap_or_default(),
            created_by: wire.created_by,
            created_at: wire.created_at,
        }
    }
}

#[derive(Deserialize)]
struct AnnotationWire {
    id: i64,
    document: i64,
    #[serde(rename = "type")]
    kind: String,
    content: String,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AnnotationWire> for Annotation {
    fn from(wire: AnnotationWire) -> Self {
        Annotation {
            id: AnnotationId::new(wire.id.to_string()),
            document: DocumentId::new(wire.document.to_string()),
            kind: match wire.kind.as_str() {
                "highlight" => AnnotationKind::Highlight,
                _ => AnnotationKind::Comment,
            },
            content: wire.content,
            page: wire.page,
            author: wire.created_by.unwrap_or_default(),
            created_at: wire.created_at,
        }
    }
}

#[derive(Deserialize)]
struct MatchWire {
    page: u32,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    preview: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponseWire {
    #[serde(default)]
    matches: Vec<MatchWire>,
}

impl From<MatchWire> for SearchMatch {
    fn from(wire: MatchWire) -> Self {
        SearchMatch {
            page: wire.page,
            text: wire.text.unwrap_or_default(),
            preview: wire.preview.unwrap_or_default(),
        }
    }
}
