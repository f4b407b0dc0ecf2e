//! Remote document gateway
//!
//! The seam between the session store and the remote REST service. The
//! store only depends on the `DocumentGateway` trait; `HttpGateway` is the
//! concrete transport. Every call takes the explicit `Credential` - there
//! is no ambient token state anywhere in the crate.

mod error;
mod http;
mod traits;

pub use error::{GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use traits::DocumentGateway;
