//! Observability for the ontology browser.
//!
//! - Tracing subscriber setup (pretty or JSON)
//! - Trace id propagation from incoming headers
//! - Request/response logging middleware with slow request detection

pub mod init;
pub mod middleware;
pub mod trace_context;

pub use init::*;
pub use middleware::*;
pub use trace_context::*;
