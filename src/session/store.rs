//! Document session store
//!
//! Owns the state for one open document and keeps it consistent while the
//! UI issues overlapping asynchronous operations. A `DocumentSession` is a
//! cheap clone over shared state, so callers may dispatch concurrently;
//! all mutation funnels through this module and the state lock is never
//! held across an await.
//!
//! Every gateway call is ticketed with the document id and session epoch
//! it was issued against. The epoch bumps whenever the active version
//! changes (load, select, upload), and a response whose ticket no longer
//! matches is discarded without touching state - superseding is the only
//! cancellation mechanism. The caller of the superseded operation still
//! receives its own result.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::view::ViewState;
use crate::credential::Credential;
use crate::document::{
    Annotation, AnnotationId, AnnotationKind, Document, DocumentId, DocumentKind, SearchMatch,
    Version, VersionId,
};
use crate::error::SessionError;
use crate::gateway::{DocumentGateway, GatewayError};
use crate::render::{RenderOutcome, RenderRequest};

/// Lifecycle of a document session.
///
/// `Failed` is terminal until `load_document` is retried; in every phase
/// but `Ready`, all other operations report `NotReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

/// Read-only copy of the session for rendering and UI.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub document: Option<Document>,
    pub versions: Vec<Version>,
    pub active_version: Option<Version>,
    pub annotations: Vec<Annotation>,
    pub highlights: Vec<SearchMatch>,
    pub view: ViewState,
    pub page_count: u32,
    pub upload_in_flight: bool,
    pub last_render_error: Option<String>,
}

/// What the renderer should paint, pinned to the session state it was
/// taken from so a stale outcome can be recognized and dropped.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub request: RenderRequest,
    pub kind: DocumentKind,
    pub(crate) epoch: u64,
}

/// Identity a gateway call was issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallTicket {
    document: DocumentId,
    epoch: u64,
}

struct SessionState {
    phase: SessionPhase,
    document: Option<Document>,
    versions: Vec<Version>,
    active_version: Option<VersionId>,
    annotations: Vec<Annotation>,
    highlights: Vec<SearchMatch>,
    view: ViewState,
    /// Reported by the renderer; 1 until the first successful load.
    page_count: u32,
    epoch: u64,
    /// Issue counter for searches; a response is applied only if no newer
    /// search was issued meanwhile.
    search_generation: u64,
    upload_in_flight: bool,
    last_render_error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        SessionState {
            phase: SessionPhase::Unloaded,
            document: None,
            versions: Vec::new(),
            active_version: None,
            annotations: Vec::new(),
            highlights: Vec::new(),
            view: ViewState::default(),
            page_count: 1,
            epoch: 0,
            search_generation: 0,
            upload_in_flight: false,
            last_render_error: None,
        }
    }

    /// Version-scoped currency: same document, same epoch.
    fn is_current(&self, ticket: &CallTicket) -> bool {
        self.epoch == ticket.epoch && self.same_document(ticket)
    }

    /// Document-scoped currency: annotations survive version switches, so
    /// their responses only need the document to still be the one they
    /// were issued against.
    fn same_document(&self, ticket: &CallTicket) -> bool {
        self.document.as_ref().map(|d| &d.id) == Some(&ticket.document)
    }

    /// Make `id` the active version: viewport back to defaults, highlights
    /// discarded (they were computed against the prior version's content),
    /// epoch bumped so in-flight version-scoped responses get dropped.
    fn activate_version(&mut self, id: VersionId) {
        self.active_version = Some(id);
        self.view.reset();
        self.highlights.clear();
        self.page_count = 1;
        self.last_render_error = None;
        self.epoch += 1;
    }
}

fn ensure_ready(state: &SessionState) -> Result<(), SessionError> {
    match state.phase {
        SessionPhase::Ready => Ok(()),
        _ => Err(SessionError::NotReady),
    }
}

fn ready_ticket(state: &SessionState) -> Result<CallTicket, SessionError> {
    ensure_ready(state)?;
    match &state.document {
        Some(document) => Ok(CallTicket {
            document: document.id.clone(),
            epoch: state.epoch,
        }),
        None => Err(SessionError::NotReady),
    }
}

fn map_load_error(err: GatewayError) -> SessionError {
    match err {
        GatewayError::NotFound => SessionError::NotFound,
        GatewayError::Unauthorized => SessionError::Unauthorized,
        GatewayError::Rejected(reason) | GatewayError::Network(reason) => {
            SessionError::NetworkError(reason)
        }
    }
}

/// Pick the active version: the document's declared current version if it
/// is in the set, else the newest upload, else a synthesized baseline
/// backed by the document's own file.
fn choose_active_version(document: &Document, mut versions: Vec<Version>) -> (Vec<Version>, VersionId) {
    versions.sort_by_key(|v| v.sequence);

    if let Some(declared) = &document.current_version {
        if versions.iter().any(|v| &v.id == declared) {
            return (versions, declared.clone());
        }
    }

    if let Some(latest) = versions.last() {
        let id = latest.id.clone();
        return (versions, id);
    }

    let baseline = Version::baseline(document);
    let id = baseline.id.clone();
    versions.push(baseline);
    (versions, id)
}

struct SessionInner {
    gateway: Arc<dyn DocumentGateway>,
    credential: Credential,
    state: RwLock<SessionState>,
}

/// Handle to one open document's session state.
#[derive(Clone)]
pub struct DocumentSession {
    inner: Arc<SessionInner>,
}

impl DocumentSession {
    pub fn new(gateway: Arc<dyn DocumentGateway>, credential: Credential) -> Self {
        DocumentSession {
            inner: Arc::new(SessionInner {
                gateway,
                credential,
                state: RwLock::new(SessionState::new()),
            }),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch the document, its version history and its annotations, then
    /// move the session to `Ready` with the declared current version
    /// active and the viewport at page 1.
    ///
    /// A failure moves the session to `Failed` only if this load is still
    /// the current one; a load superseded by a newer `load_document` never
    /// touches state.
    pub async fn load_document(&self, id: DocumentId) -> Result<(), SessionError> {
        let ticket = {
            let mut state = self.inner.state.write().await;
            state.epoch += 1;
            state.phase = SessionPhase::Loading;
            state.document = None;
            state.versions.clear();
            state.active_version = None;
            state.annotations.clear();
            state.highlights.clear();
            state.view.reset();
            state.page_count = 1;
            state.upload_in_flight = false;
            state.last_render_error = None;
            CallTicket {
                document: id.clone(),
                epoch: state.epoch,
            }
        };

        tracing::info!(document_id = %id, "Loading document");

        let gateway = &self.inner.gateway;
        let credential = &self.inner.credential;
        let fetched = tokio::try_join!(
            gateway.fetch_document(credential, &id),
            gateway.fetch_versions(credential, &id),
            gateway.fetch_annotations(credential, &id),
        );

        let mut state = self.inner.state.write().await;
        if state.epoch != ticket.epoch {
            tracing::debug!(document_id = %id, "Discarding superseded load response");
            return match fetched {
                Ok(_) => Ok(()),
                Err(err) => Err(map_load_error(err)),
            };
        }

        match fetched {
            Ok((document, versions, annotations)) => {
                let (versions, active) = choose_active_version(&document, versions);
                tracing::info!(
                    document_id = %document.id,
                    versions = versions.len(),
                    annotations = annotations.len(),
                    active_version = %active,
                    "Document ready"
                );
                state.document = Some(document);
                state.versions = versions;
                state.active_version = Some(active);
                state.annotations = annotations;
                state.view.reset();
                state.phase = SessionPhase::Ready;
                Ok(())
            }
            Err(err) => {
                let err = map_load_error(err);
                tracing::warn!(document_id = %id, error = %err, "Document load failed");
                state.phase = SessionPhase::Failed;
                Err(err)
            }
        }
    }

    // ========================================================================
    // Synchronous viewport operations
    // ========================================================================

    /// Move by `delta` pages. A request that would leave `[1, page_count]`
    /// is ignored, never an error - the edges behave like the viewer's
    /// disabled prev/next buttons.
    pub async fn change_page(&self, delta: i32) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        let target = state.view.page as i64 + delta as i64;
        if target >= 1 && target <= state.page_count.max(1) as i64 {
            state.view.page = target as u32;
        }
        Ok(())
    }

    pub async fn zoom_in(&self) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        state.view.zoom_in();
        Ok(())
    }

    pub async fn zoom_out(&self) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        state.view.zoom_out();
        Ok(())
    }

    pub async fn rotate_clockwise(&self) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        state.view.rotate_clockwise();
        Ok(())
    }

    // ========================================================================
    // Versions
    // ========================================================================

    /// Switch the active version. Resets the viewport and discards search
    /// highlights; rejected while a version upload is in flight.
    pub async fn select_version(&self, id: &VersionId) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        if state.upload_in_flight {
            return Err(SessionError::OperationInProgress);
        }
        if !state.versions.iter().any(|v| &v.id == id) {
            return Err(SessionError::UnknownVersion(id.clone()));
        }
        state.activate_version(id.clone());
        tracing::info!(version_id = %id, "Active version changed");
        Ok(())
    }

    /// Upload file content as a new version and make it active. At most
    /// one upload may be in flight per session; on failure the state is
    /// left untouched.
    pub async fn upload_version(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Version, SessionError> {
        let ticket = {
            let mut state = self.inner.state.write().await;
            let ticket = ready_ticket(&state)?;
            if state.upload_in_flight {
                return Err(SessionError::OperationInProgress);
            }
            state.upload_in_flight = true;
            ticket
        };

        tracing::info!(document_id = %ticket.document, file_name, "Uploading new version");
        let result = self
            .inner
            .gateway
            .create_version(&self.inner.credential, &ticket.document, file_name, bytes)
            .await;

        let mut state = self.inner.state.write().await;
        // A reload already cleared the guard along with the rest of the
        // session; only release it if this is still the same session run.
        if state.is_current(&ticket) {
            state.upload_in_flight = false;
        }

        match result {
            Ok(version) => {
                if state.is_current(&ticket) {
                    state.versions.push(version.clone());
                    state.activate_version(version.id.clone());
                    tracing::info!(
                        document_id = %ticket.document,
                        version_id = %version.id,
                        sequence = version.sequence,
                        "Version uploaded and activated"
                    );
                } else {
                    tracing::debug!(
                        document_id = %ticket.document,
                        "Discarding superseded upload response"
                    );
                }
                Ok(version)
            }
            Err(GatewayError::Unauthorized) => Err(SessionError::Unauthorized),
            Err(err) => Err(SessionError::UploadFailed(err.to_string())),
        }
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// Create an annotation on the service, appending it locally only once
    /// confirmed. State is untouched on failure.
    pub async fn add_annotation(
        &self,
        content: &str,
        kind: AnnotationKind,
        page: Option<u32>,
    ) -> Result<Annotation, SessionError> {
        let ticket = {
            let state = self.inner.state.read().await;
            ready_ticket(&state)?
        };

        let result = self
            .inner
            .gateway
            .create_annotation(&self.inner.credential, &ticket.document, content, kind, page)
            .await;

        let mut state = self.inner.state.write().await;
        match result {
            Ok(annotation) => {
                if state.same_document(&ticket) {
                    state.annotations.push(annotation.clone());
                } else {
                    tracing::debug!(
                        document_id = %ticket.document,
                        "Discarding annotation response for a closed document"
                    );
                }
                Ok(annotation)
            }
            Err(GatewayError::Unauthorized) => Err(SessionError::Unauthorized),
            Err(err) => Err(SessionError::AnnotationRejected(err.to_string())),
        }
    }

    /// Edit an annotation on the service, replacing the local entry only
    /// once confirmed. State is untouched on failure.
    pub async fn update_annotation(
        &self,
        id: &AnnotationId,
        content: &str,
        kind: AnnotationKind,
        page: Option<u32>,
    ) -> Result<Annotation, SessionError> {
        let ticket = {
            let state = self.inner.state.read().await;
            ready_ticket(&state)?
        };

        let result = self
            .inner
            .gateway
            .update_annotation(&self.inner.credential, &ticket.document, id, content, kind, page)
            .await;

        let mut state = self.inner.state.write().await;
        match result {
            Ok(annotation) => {
                if state.same_document(&ticket) {
                    if let Some(slot) = state.annotations.iter_mut().find(|a| &a.id == id) {
                        *slot = annotation.clone();
                    }
                } else {
                    tracing::debug!(
                        document_id = %ticket.document,
                        "Discarding annotation response for a closed document"
                    );
                }
                Ok(annotation)
            }
            Err(GatewayError::Unauthorized) => Err(SessionError::Unauthorized),
            Err(err) => Err(SessionError::AnnotationRejected(err.to_string())),
        }
    }

    /// Delete an annotation on the service, removing it locally once
    /// confirmed. The service reporting the id already gone counts as
    /// success, so deleting twice is not an error.
    pub async fn delete_annotation(&self, id: &AnnotationId) -> Result<(), SessionError> {
        let ticket = {
            let state = self.inner.state.read().await;
            ready_ticket(&state)?
        };

        let result = self
            .inner
            .gateway
            .delete_annotation(&self.inner.credential, &ticket.document, id)
            .await;

        let mut state = self.inner.state.write().await;
        match result {
            Ok(()) | Err(GatewayError::NotFound) => {
                if state.same_document(&ticket) {
                    state.annotations.retain(|a| &a.id != id);
                }
                Ok(())
            }
            Err(GatewayError::Unauthorized) => Err(SessionError::Unauthorized),
            Err(GatewayError::Rejected(reason)) => Err(SessionError::AnnotationRejected(reason)),
            Err(GatewayError::Network(reason)) => Err(SessionError::NetworkError(reason)),
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Run a search against the active version's content and replace the
    /// highlight set wholesale with the response. No matches is success
    /// with an empty set, not an error. Returns the number of matches the
    /// service reported.
    ///
    /// Issuing a new search supersedes any search still in flight: the
    /// latest-issued search owns the highlight set, regardless of the
    /// order in which responses arrive.
    pub async fn search(&self, query: &str) -> Result<usize, SessionError> {
        let (ticket, generation) = {
            let mut state = self.inner.state.write().await;
            let ticket = ready_ticket(&state)?;
            state.search_generation += 1;
            (ticket, state.search_generation)
        };

        tracing::debug!(document_id = %ticket.document, query, "Searching document");
        let result = self
            .inner
            .gateway
            .search(&self.inner.credential, &ticket.document, query)
            .await;

        let mut state = self.inner.state.write().await;
        match result {
            Ok(matches) => {
                let found = matches.len();
                if state.is_current(&ticket) && generation == state.search_generation {
                    state.highlights = matches;
                } else {
                    tracing::debug!(
                        document_id = %ticket.document,
                        "Discarding superseded search response"
                    );
                }
                Ok(found)
            }
            Err(GatewayError::Unauthorized) => Err(SessionError::Unauthorized),
            Err(GatewayError::NotFound) => Err(SessionError::NotFound),
            Err(err) => Err(SessionError::NetworkError(err.to_string())),
        }
    }

    /// Jump to the page of the `index`-th search match.
    pub async fn navigate_to_match(&self, index: usize) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        let len = state.highlights.len();
        let page = match state.highlights.get(index) {
            Some(m) => m.page,
            None => return Err(SessionError::IndexOutOfRange { index, len }),
        };
        // Same page rule as change_page: a match outside the known page
        // range is ignored rather than clamped.
        if page >= 1 && page <= state.page_count.max(1) {
            state.view.page = page;
        }
        Ok(())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Describe what the renderer should paint right now.
    pub async fn render_plan(&self) -> Result<RenderPlan, SessionError> {
        let state = self.inner.state.read().await;
        ensure_ready(&state)?;
        let document = state.document.as_ref().ok_or(SessionError::NotReady)?;
        let active = state
            .active_version
            .as_ref()
            .and_then(|id| state.versions.iter().find(|v| &v.id == id))
            .ok_or(SessionError::NotReady)?;

        Ok(RenderPlan {
            request: RenderRequest {
                source: active.source_url.clone(),
                page: state.view.page,
                scale: state.view.scale,
                rotation: state.view.rotation,
            },
            kind: document.kind,
            epoch: state.epoch,
        })
    }

    /// Consume the renderer's load callback. A successful load records the
    /// page count (pulling the current page back in range if it shrank); a
    /// failed load is recorded but never fatal. Outcomes for a superseded
    /// plan are dropped.
    pub async fn apply_render_outcome(
        &self,
        plan: &RenderPlan,
        outcome: &RenderOutcome,
    ) -> Result<(), SessionError> {
        let mut state = self.inner.state.write().await;
        ensure_ready(&state)?;
        if state.epoch != plan.epoch {
            tracing::debug!("Discarding render outcome for a superseded plan");
            return Ok(());
        }

        match outcome {
            RenderOutcome::Loaded { page_count } => {
                state.page_count = (*page_count).max(1);
                let count = state.page_count;
                state.view.clamp_page(count);
                state.last_render_error = None;
            }
            RenderOutcome::Failed { reason } => {
                tracing::warn!(reason = %reason, "Renderer failed to load page source");
                state.last_render_error = Some(reason.clone());
            }
        }
        Ok(())
    }

    // ========================================================================
    // Read views
    // ========================================================================

    pub async fn phase(&self) -> SessionPhase {
        self.inner.state.read().await.phase
    }

    pub async fn view(&self) -> ViewState {
        self.inner.state.read().await.view
    }

    pub async fn highlights(&self) -> Vec<SearchMatch> {
        self.inner.state.read().await.highlights.clone()
    }

    pub async fn active_version(&self) -> Option<Version> {
        let state = self.inner.state.read().await;
        state
            .active_version
            .as_ref()
            .and_then(|id| state.versions.iter().find(|v| &v.id == id))
            .cloned()
    }

    /// Annotations visible on the current page: page-bound ones for the
    /// page in view plus document-wide ones. Derived on demand, never
    /// stored separately.
    pub async fn annotations_in_view(&self) -> Vec<Annotation> {
        let state = self.inner.state.read().await;
        let page = state.view.page;
        state
            .annotations
            .iter()
            .filter(|a| a.page.is_none() || a.page == Some(page))
            .cloned()
            .collect()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.read().await;
        SessionSnapshot {
            phase: state.phase,
            document: state.document.clone(),
            versions: state.versions.clone(),
            active_version: state
                .active_version
                .as_ref()
                .and_then(|id| state.versions.iter().find(|v| &v.id == id))
                .cloned(),
            annotations: state.annotations.clone(),
            highlights: state.highlights.clone(),
            view: state.view,
            page_count: state.page_count,
            upload_in_flight: state.upload_in_flight,
            last_render_error: state.last_render_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    fn sample_document(id: &str, current_version: Option<&str>) -> Document {
        Document {
            id: DocumentId::new(id),
            name: "contract.pdf".to_string(),
            kind: DocumentKind::Pdf,
            source_url: format!("https://files.example/{id}.pdf"),
            current_version: current_version.map(VersionId::new),
            owner: "ana".to_string(),
            created_at: Utc::now(),
        }
    }

    fn sample_version(id: &str, sequence: u32) -> Version {
        Version {
            id: VersionId::new(id),
            sequence,
            source_url: format!("https://files.example/versions/{id}.pdf"),
            created_by: Some("ana".to_string()),
            created_at: Utc::now(),
        }
    }

    fn sample_annotation(id: &str, document: &str, page: Option<u32>) -> Annotation {
        Annotation {
            id: AnnotationId::new(id),
            document: DocumentId::new(document),
            kind: AnnotationKind::Comment,
            content: "check this".to_string(),
            page,
            author: "ana".to_string(),
            created_at: Utc::now(),
        }
    }

    /// Canned-response gateway for the non-overlapping paths. The
    /// timing-sensitive cases live in the integration suite.
    struct CannedGateway {
        document: Mutex<Result<Document, GatewayError>>,
        versions: Mutex<Result<Vec<Version>, GatewayError>>,
        annotations: Mutex<Result<Vec<Annotation>, GatewayError>>,
        annotation_result: Mutex<Result<Annotation, GatewayError>>,
        update_result: Mutex<Result<Annotation, GatewayError>>,
        delete_result: Mutex<Result<(), GatewayError>>,
        search_result: Mutex<Result<Vec<SearchMatch>, GatewayError>>,
        upload_result: Mutex<Result<Version, GatewayError>>,
    }

    impl CannedGateway {
        fn ready_doc1() -> Self {
            CannedGateway {
                document: Mutex::new(Ok(sample_document("doc1", Some("v1")))),
                versions: Mutex::new(Ok(vec![sample_version("v1", 1)])),
                annotations: Mutex::new(Ok(vec![])),
                annotation_result: Mutex::new(Ok(sample_annotation("a1", "doc1", Some(1)))),
                update_result: Mutex::new(Ok(sample_annotation("a1", "doc1", Some(1)))),
                delete_result: Mutex::new(Ok(())),
                search_result: Mutex::new(Ok(vec![])),
                upload_result: Mutex::new(Ok(sample_version("v2", 2))),
            }
        }
    }

    #[async_trait]
    impl DocumentGateway for CannedGateway {
        async fn list_documents(&self, _: &Credential) -> Result<Vec<Document>, GatewayError> {
            Ok(vec![])
        }

        async fn fetch_document(
            &self,
            _: &Credential,
            _: &DocumentId,
        ) -> Result<Document, GatewayError> {
            self.document.lock().unwrap().clone()
        }

        async fn fetch_versions(
            &self,
            _: &Credential,
            _: &DocumentId,
        ) -> Result<Vec<Version>, GatewayError> {
            self.versions.lock().unwrap().clone()
        }

        async fn create_version(
            &self,
            _: &Credential,
            _: &DocumentId,
            _: &str,
            _: Vec<u8>,
        ) -> Result<Version, GatewayError> {
            self.upload_result.lock().unwrap().clone()
        }

        async fn fetch_annotations(
            &self,
            _: &Credential,
            _: &DocumentId,
        ) -> Result<Vec<Annotation>, GatewayError> {
            self.annotations.lock().unwrap().clone()
        }

        async fn create_annotation(
            &self,
            _: &Credential,
            _: &DocumentId,
            _: &str,
            _: AnnotationKind,
            _: Option<u32>,
        ) -> Result<Annotation, GatewayError> {
            self.annotation_result.lock().unwrap().clone()
        }

        async fn update_annotation(
            &self,
            _: &Credential,
            _: &DocumentId,
            _: &AnnotationId,
            _: &str,
            _: AnnotationKind,
            _: Option<u32>,
        ) -> Result<Annotation, GatewayError> {
            self.update_result.lock().unwrap().clone()
        }

        async fn delete_annotation(
            &self,
            _: &Credential,
            _: &DocumentId,
            _: &AnnotationId,
        ) -> Result<(), GatewayError> {
            self.delete_result.lock().unwrap().clone()
        }

        async fn search(
            &self,
            _: &Credential,
            _: &DocumentId,
            _: &str,
        ) -> Result<Vec<SearchMatch>, GatewayError> {
            self.search_result.lock().unwrap().clone()
        }
    }

    fn session_with(gateway: &Arc<CannedGateway>) -> DocumentSession {
        DocumentSession::new(gateway.clone(), Credential::new("token"))
    }

    #[tokio::test]
    async fn load_reaches_ready_with_default_viewport() {
        let session = session_with(&Arc::new(CannedGateway::ready_doc1()));
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Ready);
        assert_eq!(snapshot.view, ViewState { page: 1, scale: 1.0, rotation: 0 });
        assert_eq!(snapshot.active_version.unwrap().id, VersionId::new("v1"));
        assert!(snapshot.annotations.is_empty());
    }

    #[tokio::test]
    async fn load_failure_is_terminal_until_retried() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.document.lock().unwrap() = Err(GatewayError::NotFound);
        let session = session_with(&gateway);

        let err = session.load_document(DocumentId::new("doc1")).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound));
        assert_eq!(session.phase().await, SessionPhase::Failed);

        assert!(matches!(
            session.change_page(1).await,
            Err(SessionError::NotReady)
        ));
        assert!(matches!(
            session.search("foo").await,
            Err(SessionError::NotReady)
        ));
    }

    #[tokio::test]
    async fn load_with_no_versions_synthesizes_baseline() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.document.lock().unwrap() = Ok(sample_document("doc1", None));
        *gateway.versions.lock().unwrap() = Ok(vec![]);
        let session = session_with(&gateway);

        session.load_document(DocumentId::new("doc1")).await.unwrap();
        let active = session.active_version().await.unwrap();
        assert_eq!(active.sequence, 0);
        assert_eq!(active.source_url, "https://files.example/doc1.pdf");
    }

    #[tokio::test]
    async fn change_page_stays_in_range_and_never_errors() {
        let session = session_with(&Arc::new(CannedGateway::ready_doc1()));
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let plan = session.render_plan().await.unwrap();
        session
            .apply_render_outcome(&plan, &RenderOutcome::Loaded { page_count: 5 })
            .await
            .unwrap();

        for delta in [-10, -1, 0, 1, 3, 100, i32::MAX, i32::MIN] {
            session.change_page(delta).await.unwrap();
            let page = session.view().await.page;
            assert!((1..=5).contains(&page), "page {page} escaped [1, 5]");
        }
    }

    #[tokio::test]
    async fn select_version_clears_highlights_and_resets_view() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.versions.lock().unwrap() =
            Ok(vec![sample_version("v1", 1), sample_version("v2", 2)]);
        *gateway.search_result.lock().unwrap() = Ok(vec![SearchMatch {
            page: 2,
            text: "foo".to_string(),
            preview: "...foo...".to_string(),
        }]);
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        assert_eq!(session.search("foo").await.unwrap(), 1);
        assert_eq!(session.highlights().await.len(), 1);

        session.select_version(&VersionId::new("v2")).await.unwrap();
        assert!(session.highlights().await.is_empty());
        assert_eq!(session.view().await, ViewState::default());
        assert_eq!(session.active_version().await.unwrap().id, VersionId::new("v2"));
    }

    #[tokio::test]
    async fn select_unknown_version_is_rejected() {
        let session = session_with(&Arc::new(CannedGateway::ready_doc1()));
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let err = session
            .select_version(&VersionId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownVersion(_)));
    }

    #[tokio::test]
    async fn failed_upload_leaves_state_untouched() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.upload_result.lock().unwrap() =
            Err(GatewayError::Network("connection reset".to_string()));
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let before = session.snapshot().await;
        let err = session
            .upload_version("v2.pdf", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UploadFailed(_)));

        let after = session.snapshot().await;
        assert_eq!(after.versions, before.versions);
        assert_eq!(after.active_version, before.active_version);
        assert!(!after.upload_in_flight);
    }

    #[tokio::test]
    async fn rejected_annotation_leaves_state_untouched() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.annotation_result.lock().unwrap() =
            Err(GatewayError::Rejected("content required".to_string()));
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let err = session
            .add_annotation("", AnnotationKind::Comment, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AnnotationRejected(_)));
        assert!(session.snapshot().await.annotations.is_empty());
    }

    #[tokio::test]
    async fn update_annotation_replaces_local_entry_once_confirmed() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.annotations.lock().unwrap() =
            Ok(vec![sample_annotation("a1", "doc1", Some(1))]);
        *gateway.update_result.lock().unwrap() = Ok(Annotation {
            content: "actually fine".to_string(),
            page: Some(3),
            ..sample_annotation("a1", "doc1", Some(1))
        });
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let updated = session
            .update_annotation(
                &AnnotationId::new("a1"),
                "actually fine",
                AnnotationKind::Comment,
                Some(3),
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "actually fine");

        let annotations = session.snapshot().await.annotations;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].content, "actually fine");
        assert_eq!(annotations[0].page, Some(3));
    }

    #[tokio::test]
    async fn rejected_annotation_update_leaves_local_entry_untouched() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.annotations.lock().unwrap() =
            Ok(vec![sample_annotation("a1", "doc1", Some(1))]);
        *gateway.update_result.lock().unwrap() =
            Err(GatewayError::Rejected("content required".to_string()));
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let err = session
            .update_annotation(&AnnotationId::new("a1"), "", AnnotationKind::Comment, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AnnotationRejected(_)));
        assert_eq!(session.snapshot().await.annotations[0].content, "check this");
    }

    #[tokio::test]
    async fn delete_annotation_is_idempotent() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.annotations.lock().unwrap() =
            Ok(vec![sample_annotation("a1", "doc1", Some(1))]);
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let id = AnnotationId::new("a1");
        session.delete_annotation(&id).await.unwrap();
        assert!(session.snapshot().await.annotations.is_empty());

        // The service now reports the id gone; still a success.
        *gateway.delete_result.lock().unwrap() = Err(GatewayError::NotFound);
        session.delete_annotation(&id).await.unwrap();
    }

    #[tokio::test]
    async fn second_delete_after_service_reports_gone_succeeds() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.delete_result.lock().unwrap() = Err(GatewayError::NotFound);
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        session
            .delete_annotation(&AnnotationId::new("gone"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn navigate_to_match_rejects_out_of_range_index() {
        let session = session_with(&Arc::new(CannedGateway::ready_doc1()));
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let err = session.navigate_to_match(0).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::IndexOutOfRange { index: 0, len: 0 }
        ));
    }

    #[tokio::test]
    async fn empty_search_is_success_with_empty_highlights() {
        let session = session_with(&Arc::new(CannedGateway::ready_doc1()));
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        assert_eq!(session.search("nothing").await.unwrap(), 0);
        assert!(session.highlights().await.is_empty());
    }

    #[tokio::test]
    async fn annotations_in_view_filters_by_page() {
        let gateway = Arc::new(CannedGateway::ready_doc1());
        *gateway.annotations.lock().unwrap() = Ok(vec![
            sample_annotation("a1", "doc1", Some(1)),
            sample_annotation("a2", "doc1", Some(2)),
            sample_annotation("a3", "doc1", None),
        ]);
        let session = session_with(&gateway);
        session.load_document(DocumentId::new("doc1")).await.unwrap();

        let visible = session.annotations_in_view().await;
        let ids: Vec<&str> = visible.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }
}
