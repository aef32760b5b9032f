//! Middleware layer.
//!
//! A [`Middleware`] sees every request before routing and every response
//! before it is written. Layers run in registration order on the way in and
//! in reverse order on the way out:
//!
//! ```text
//! request  → security_headers → cors → rate_limit(global) → rate_limit(/send-email) → handler
//! response ← security_headers ← cors ← rate_limit(global) ← rate_limit(/send-email) ←
//! ```
//!
//! A layer that answers from `on_request` short-circuits the chain: the
//! handler and every later layer are skipped, but the `on_response` hooks of
//! the layers that already ran still decorate the early response.

pub mod cors;
pub mod rate_limit;
pub mod security_headers;

use crate::request::RequestHead;
use crate::response::Response;

pub use cors::Cors;
pub use rate_limit::{Quota, RateLimit};
pub use security_headers::SecurityHeaders;

/// Request/response interception hook.
pub trait Middleware: Send + Sync + 'static {
    /// Inspect an incoming request. Returning `Some` answers the request
    /// without invoking the handler.
    fn on_request(&self, _head: &RequestHead) -> Option<Response> {
        None
    }

    /// Decorate the outgoing response.
    fn on_response(&self, _head: &RequestHead, _res: &mut Response) {}
}
