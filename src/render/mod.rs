//! Renderer seam
//!
//! Rendering itself is a black box (a PDF engine, an `<img>` element, an
//! office preview). The session store only depends on the two outcomes a
//! renderer can report: loaded with a page count, or failed with a reason.
//! Which renderer runs is a tagged dispatch on `DocumentKind`, not type
//! probing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::document::DocumentKind;
use crate::error::SessionError;
use crate::session::DocumentSession;

/// What to paint: the active version's byte source plus the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub source: String,
    pub page: u32,
    pub scale: f32,
    pub rotation: u16,
}

/// The renderer's load callback, collapsed into a value.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Loaded { page_count: u32 },
    Failed { reason: String },
}

/// A black-box page renderer for one family of document kinds.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn load(&self, request: &RenderRequest) -> RenderOutcome;
}

/// Maps each document kind to its renderer strategy.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<DocumentKind, Arc<dyn Renderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: DocumentKind, renderer: Arc<dyn Renderer>) {
        self.renderers.insert(kind, renderer);
    }

    pub fn renderer_for(&self, kind: DocumentKind) -> Option<Arc<dyn Renderer>> {
        self.renderers.get(&kind).cloned()
    }
}

/// Render the session's current page and feed the outcome back into the
/// store. A kind with no registered renderer reports a failed load, the
/// same way an unsupported preview does in the UI.
pub async fn render_current(
    session: &DocumentSession,
    registry: &RendererRegistry,
) -> Result<RenderOutcome, SessionError> {
    let plan = session.render_plan().await?;

    let outcome = match registry.renderer_for(plan.kind) {
        Some(renderer) => renderer.load(&plan.request).await,
        None => RenderOutcome::Failed {
            reason: format!("no renderer registered for {:?} documents", plan.kind),
        },
    };

    session.apply_render_outcome(&plan, &outcome).await?;
    Ok(outcome)
}
