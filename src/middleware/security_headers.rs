//! Conservative browser security headers on every response.
//!
//! A header the handler already set is left alone.

use http::header::{HeaderName, HeaderValue};

use crate::middleware::Middleware;
use crate::request::RequestHead;
use crate::response::Response;

const DEFAULTS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

#[derive(Default)]
pub struct SecurityHeaders;

impl Middleware for SecurityHeaders {
    fn on_response(&self, _head: &RequestHead, res: &mut Response) {
        let headers = res.headers_mut();
        for &(name, value) in DEFAULTS {
            let name = HeaderName::from_static(name);
            if !headers.contains_key(&name) {
                headers.insert(name, HeaderValue::from_static(value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderMap;

    use super::*;

    fn head() -> RequestHead {
        RequestHead {
            method: http::Method::GET,
            path: "/".to_owned(),
            headers: HeaderMap::new(),
            remote_addr: "127.0.0.1:1".parse().unwrap(),
        }
    }

    #[test]
    fn adds_every_default() {
        let mut res = Response::text("ok");
        SecurityHeaders.on_response(&head(), &mut res);
        for &(name, value) in DEFAULTS {
            assert_eq!(res.header(name), Some(value), "{name}");
        }
    }

    #[test]
    fn keeps_handler_values() {
        let mut res = Response::builder().header("x-frame-options", "DENY").text("ok");
        SecurityHeaders.on_response(&head(), &mut res);
        assert_eq!(res.header("x-frame-options"), Some("DENY"));
    }
}
