//! Legajo - client-side session engine for a remote document management
//! service.
//!
//! The crate keeps one open document, its versions, annotations, viewport
//! and search highlights mutually consistent while the UI issues
//! overlapping asynchronous operations against the remote API.
//!
//! # Modules
//!
//! - `session`: the document session store and gesture navigation
//! - `gateway`: the remote REST API seam and its HTTP implementation
//! - `document`: the client-side data model
//! - `render`: the black-box renderer seam, dispatched by document kind
//! - `credential`: the opaque API token threaded through every call
//!
//! # Usage
//!
//! ```rust,ignore
//! use legajo::{Credential, DocumentSession};
//! use legajo::config::ClientConfig;
//! use legajo::document::DocumentId;
//! use legajo::gateway::HttpGateway;
//! use std::sync::Arc;
//!
//! let gateway = Arc::new(HttpGateway::new(&ClientConfig::from_env())?);
//! let session = DocumentSession::new(gateway, Credential::new(token));
//! session.load_document(DocumentId::new("42")).await?;
//! session.search("invoice").await?;
//! session.navigate_to_match(0).await?;
//! ```

pub mod config;
pub mod credential;
pub mod document;
pub mod error;
pub mod gateway;
pub mod render;
pub mod session;

pub use credential::Credential;
pub use error::SessionError;
pub use session::{DocumentSession, Gesture, NavigationController, SessionPhase, ViewState};
