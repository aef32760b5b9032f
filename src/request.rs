//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::method::Method;

/// Everything about a request except its body and route parameters.
///
/// Middleware layers only ever see the head: it is cloned once per request so
/// the `on_response` hooks can still inspect it after the handler consumed the
/// [`Request`]. The method is kept as received, so layers also see requests
/// whose method the router does not know.
#[derive(Clone, Debug)]
pub struct RequestHead {
    pub(crate) method: http::Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) remote_addr: SocketAddr,
}

impl RequestHead {
    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An incoming HTTP request with its body fully collected.
pub struct Request {
    pub(crate) head: RequestHead,
    pub(crate) method: Method,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        head: RequestHead,
        method: Method,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self { head, method, body, params }
    }

    pub fn head(&self) -> &RequestHead { &self.head }
    /// The method the request was routed under.
    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.head.path }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> SocketAddr { self.head.remote_addr }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/files/{name}`, `req.param("name")` on `/files/logo.png`
    /// returns `Some("logo.png")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// True when the `content-type` header names a JSON media type
    /// (`application/json` or any `+json` suffix), ignoring parameters.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .and_then(|ct| ct.split(';').next())
            .map(|mime| {
                let mime = mime.trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
