//! Document session
//!
//! One session per open document. `DocumentSession` owns the state tuple
//! {document, versions, active version, annotations, viewport, search
//! highlights} and is the single place allowed to mutate it;
//! `NavigationController` translates UI gestures onto its operations.

mod navigation;
mod store;
mod view;

pub use navigation::{Gesture, NavigationController};
pub use store::{DocumentSession, RenderPlan, SessionPhase, SessionSnapshot};
pub use view::{ViewState, MAX_SCALE, MIN_SCALE, SCALE_STEP};
