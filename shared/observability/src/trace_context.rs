//! Trace context carried through a request.
//!
//! Accepts a W3C `traceparent` header or the custom `x-trace-id`/`x-request-id`
//! headers, and generates fresh ids otherwise.

use actix_web::{HttpMessage, HttpRequest};
use std::fmt;
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const W3C_TRACEPARENT_HEADER: &str = "traceparent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// Shared by every span of the trace
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub request_id: String,
}

impl TraceContext {
    pub fn new() -> Self {
        let trace_id = Uuid::new_v4().to_string();
        Self {
            request_id: trace_id.clone(),
            trace_id,
            span_id: generate_span_id(),
            parent_span_id: None,
        }
    }

    pub fn from_request(req: &HttpRequest) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        if let Some(ctx) = header(W3C_TRACEPARENT_HEADER).and_then(|tp| Self::parse_traceparent(&tp)) {
            return ctx;
        }

        let trace_id = header(TRACE_ID_HEADER).unwrap_or_else(|| Uuid::new_v4().to_string());
        let request_id = header(REQUEST_ID_HEADER).unwrap_or_else(|| trace_id.clone());

        Self {
            trace_id,
            span_id: generate_span_id(),
            parent_span_id: None,
            request_id,
        }
    }

    /// Format: version-trace_id-parent_id-flags (e.g. "00-abc-def-01")
    fn parse_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.split('-');
        let _version = parts.next()?;
        let trace_id = parts.next().filter(|p| !p.is_empty())?.to_string();
        let parent_span_id = parts.next().filter(|p| !p.is_empty())?.to_string();

        Some(Self {
            request_id: trace_id.clone(),
            trace_id,
            span_id: generate_span_id(),
            parent_span_id: Some(parent_span_id),
        })
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trace_id={} span_id={}", self.trace_id, self.span_id)
    }
}

fn generate_span_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

/// Extract the trace context stored by the middleware, or derive one from headers.
pub trait TraceContextExt {
    fn trace_context(&self) -> TraceContext;
}

impl TraceContextExt for HttpRequest {
    fn trace_context(&self) -> TraceContext {
        if let Some(ctx) = self.extensions().get::<TraceContext>() {
            return ctx.clone();
        }
        TraceContext::from_request(self)
    }
}
