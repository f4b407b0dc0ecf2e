//! Gesture navigation
//!
//! Translates discrete UI gestures onto session store operations. The
//! controller holds a session handle and nothing else; it never touches
//! viewport or highlight state directly, so the store's invariants cannot
//! be bypassed from here.

use super::store::DocumentSession;
use crate::document::VersionId;
use crate::error::SessionError;

/// A discrete user gesture in the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    NextPage,
    PreviousPage,
    /// Click on a row in the version history panel.
    SelectVersion(VersionId),
    /// Click on the `index`-th row of the search results panel.
    OpenMatch(usize),
    ZoomIn,
    ZoomOut,
    Rotate,
}

/// Stateless translation layer from gestures to store operations.
pub struct NavigationController {
    session: DocumentSession,
}

impl NavigationController {
    pub fn new(session: DocumentSession) -> Self {
        NavigationController { session }
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub async fn dispatch(&self, gesture: Gesture) -> Result<(), SessionError> {
        match gesture {
            Gesture::NextPage => self.session.change_page(1).await,
            Gesture::PreviousPage => self.session.change_page(-1).await,
            Gesture::SelectVersion(id) => self.session.select_version(&id).await,
            Gesture::OpenMatch(index) => self.session.navigate_to_match(index).await,
            Gesture::ZoomIn => self.session.zoom_in().await,
            Gesture::ZoomOut => self.session.zoom_out().await,
            Gesture::Rotate => self.session.rotate_clockwise().await,
        }
    }
}
