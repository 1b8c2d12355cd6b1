//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
