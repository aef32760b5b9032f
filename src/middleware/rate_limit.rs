//! Fixed-window request limits keyed by client IP.
//!
//! Each client gets a counter that resets `window` after its first hit.
//! Hits beyond `max` inside the window are answered with `429` and never
//! reach the handler. Counters live in memory; a restart forgets them.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use http::header::HeaderValue;
use tokio::time::Instant;
use tracing::warn;

use crate::middleware::Middleware;
use crate::request::RequestHead;
use crate::response::Response;
use crate::status::Status;

/// `max` requests per `window`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quota {
    pub max: u32,
    pub window: Duration,
}

impl Quota {
    pub const fn new(max: u32, window: Duration) -> Self {
        Self { max, window }
    }
}

#[derive(Clone, Copy, Debug)]
struct Window {
    hits: u32,
    resets_at: Instant,
}

struct Table {
    clients: HashMap<IpAddr, Window>,
    next_sweep: Instant,
}

pub struct RateLimit {
    quota: Quota,
    path: Option<String>,
    trust_proxy: bool,
    table: Mutex<Table>,
}

impl RateLimit {
    /// A limit applied to every route.
    pub fn new(quota: Quota) -> Self {
        Self {
            quota,
            path: None,
            trust_proxy: false,
            table: Mutex::new(Table {
                clients: HashMap::new(),
                next_sweep: Instant::now() + quota.window,
            }),
        }
    }

    /// Restrict the limit to a single path.
    pub fn only(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Key clients by the first `X-Forwarded-For` entry instead of the socket
    /// peer. Only enable behind a proxy that overwrites that header.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    fn applies(&self, head: &RequestHead) -> bool {
        self.path.as_deref().is_none_or(|p| p == head.path())
    }

    fn client(&self, head: &RequestHead) -> IpAddr {
        if self.trust_proxy {
            let forwarded = head
                .header("x-forwarded-for")
                .and_then(|list| list.split(',').next())
                .and_then(|ip| ip.trim().parse().ok());
            if let Some(ip) = forwarded {
                return ip;
            }
        }
        head.remote_addr().ip()
    }

    /// Counts one hit for `client`; returns its window after counting.
    fn hit(&self, client: IpAddr) -> Window {
        let now = Instant::now();
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        if now >= table.next_sweep {
            table.clients.retain(|_, w| w.resets_at > now);
            table.next_sweep = now + self.quota.window;
        }

        let window = table.clients.entry(client).or_insert(Window {
            hits: 0,
            resets_at: now + self.quota.window,
        });
        if now >= window.resets_at {
            *window = Window { hits: 0, resets_at: now + self.quota.window };
        }
        window.hits = window.hits.saturating_add(1);
        *window
    }

    fn peek(&self, client: IpAddr) -> Option<Window> {
        let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.clients.get(&client).copied()
    }

    fn seconds_until_reset(window: &Window) -> u64 {
        let left = window.resets_at.saturating_duration_since(Instant::now());
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }
}

impl Middleware for RateLimit {
    fn on_request(&self, head: &RequestHead) -> Option<Response> {
        if !self.applies(head) {
            return None;
        }
        let client = self.client(head);
        let window = self.hit(client);
        if window.hits <= self.quota.max {
            return None;
        }

        warn!(%client, path = head.path(), limit = self.quota.max, "rate limit exceeded");
        let retry_after = Self::seconds_until_reset(&window).to_string();
        Some(
            Response::builder()
                .status(Status::TooManyRequests)
                .header("retry-after", &retry_after)
                .text("Too many requests, please try again later."),
        )
    }

    fn on_response(&self, head: &RequestHead, res: &mut Response) {
        if !self.applies(head) {
            return;
        }
        let Some(window) = self.peek(self.client(head)) else {
            return;
        };
        let remaining = self.quota.max.saturating_sub(window.hits);
        let headers = res.headers_mut();
        headers.insert("ratelimit-limit", HeaderValue::from(self.quota.max));
        headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(Self::seconds_until_reset(&window)));
    }
}
