//! Radix-tree request router with a middleware chain.
//!
//! One tree per HTTP method. O(path-length) lookup. Layers wrap every route;
//! an optional fallback catches unmatched `GET`s (static files). `HEAD` is
//! served by the `GET` route when it has none of its own.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::request::{Request, RequestHead};
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new(), fallback: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax and are read with `req.param("name")`.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid route or conflicts with one already
    /// registered for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    /// Append a middleware layer. Layers run in the order they are added.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Handler for `GET` (and `HEAD`) requests that match no route.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Runs one fully-buffered request through the middleware chain and the
    /// matching handler.
    ///
    /// The server calls this for every request; tests call it directly to
    /// exercise the whole application without a socket.
    pub async fn oneshot(&self, req: http::Request<Bytes>, remote_addr: SocketAddr) -> Response {
        let (parts, body) = req.into_parts();
        let head = head_from(parts, remote_addr);

        let mut ran = 0;
        let mut early = None;
        for layer in &self.layers {
            ran += 1;
            if let Some(res) = layer.on_request(&head) {
                early = Some(res);
                break;
            }
        }

        let mut response = match early {
            Some(res) => res,
            None => self.route(head.clone(), body).await,
        };

        for layer in self.layers[..ran].iter().rev() {
            layer.on_response(&head, &mut response);
        }

        response
    }

    /// Runs every layer's `on_response` over a response produced before the
    /// request could be routed (unreadable or oversized body).
    pub(crate) fn decorate(
        &self,
        parts: http::request::Parts,
        remote_addr: SocketAddr,
        mut response: Response,
    ) -> Response {
        let head = head_from(parts, remote_addr);
        for layer in self.layers.iter().rev() {
            layer.on_response(&head, &mut response);
        }
        response
    }

    async fn route(&self, head: RequestHead, body: Bytes) -> Response {
        let Ok(method) = Method::try_from(head.method()) else {
            return Response::status(Status::MethodNotAllowed);
        };

        if let Some((handler, params)) = self.lookup(method, &head.path) {
            return handler.call(Request::new(head, method, body, params)).await;
        }

        // HEAD is answered like GET, without the body.
        if method == Method::Head {
            let mut response = match self.lookup(Method::Get, &head.path) {
                Some((handler, params)) => {
                    handler.call(Request::new(head, Method::Get, body, params)).await
                }
                None => self.fall_back(head, Method::Get, body).await,
            };
            response.body = Bytes::new();
            return response;
        }

        self.fall_back(head, method, body).await
    }

    async fn fall_back(&self, head: RequestHead, method: Method, body: Bytes) -> Response {
        match (&self.fallback, method) {
            (Some(fallback), Method::Get) => {
                fallback.call(Request::new(head, method, body, HashMap::new())).await
            }
            _ => Response::status(Status::NotFound),
        }
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

fn head_from(parts: http::request::Parts, remote_addr: SocketAddr) -> RequestHead {
    RequestHead {
        method: parts.method,
        path: parts.uri.path().to_owned(),
        headers: parts.headers,
        remote_addr,
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
