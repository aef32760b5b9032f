//! Origin allow-list.
//!
//! A request passes when the allow-list is empty, when it carries no `Origin`
//! header (same-origin navigation, curl, server-to-server), or when its
//! origin is listed verbatim. Everything else gets `403` before routing.
//! Only `POST` and `GET` are advertised to cross-origin callers.

use http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS, HeaderValue, VARY,
};
use serde_json::json;
use tracing::warn;

use crate::middleware::Middleware;
use crate::request::RequestHead;
use crate::response::Response;
use crate::status::Status;

const ALLOWED_METHODS: &str = "POST,GET";

pub struct Cors {
    allowed: Vec<String>,
}

impl Cors {
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { allowed: allowed.into_iter().map(Into::into).collect() }
    }

    /// Whether a request with this `Origin` (or none) may proceed.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.allowed.is_empty() => true,
            Some(origin) => self.allowed.iter().any(|o| o == origin),
        }
    }
}

impl Middleware for Cors {
    fn on_request(&self, head: &RequestHead) -> Option<Response> {
        let origin = head.header("origin");
        if !self.allows(origin) {
            warn!(origin = origin.unwrap_or_default(), path = head.path(), "origin rejected");
            return Some(
                Response::builder()
                    .status(Status::Forbidden)
                    .json_value(&json!({ "success": false, "message": "origin not allowed" })),
            );
        }

        if *head.method() == http::Method::OPTIONS {
            let mut preflight = Response::builder()
                .status(Status::NoContent)
                .header("access-control-allow-methods", ALLOWED_METHODS);
            if let Some(requested) = head.header(ACCESS_CONTROL_REQUEST_HEADERS.as_str()) {
                preflight = preflight.header("access-control-allow-headers", requested);
                preflight = preflight.header("vary", "access-control-request-headers");
            }
            return Some(preflight.no_body());
        }

        None
    }

    fn on_response(&self, head: &RequestHead, res: &mut Response) {
        let Some(origin) = head.headers().get("origin") else {
            return;
        };
        if !self.allows(head.header("origin")) {
            return;
        }
        let headers = res.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.append(VARY, HeaderValue::from_static("origin"));
    }
}
