//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, then returns from [`Server::serve`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Default cap on a collected request body: 100 KiB.
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    body_limit: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: impl Into<SocketAddr>) -> Self {
        Self { addr: addr.into(), body_limit: DEFAULT_BODY_LIMIT }
    }

    /// Maximum request body size in bytes. Larger bodies get `413`.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);
        let body_limit = self.body_limit;

        info!(addr = %self.addr, "contact-relay listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting immediately.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, remote_addr, body_limit).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("contact-relay stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Collects the body, routes one request and produces one response. All
/// failures become HTTP responses, so hyper never sees an error.
async fn dispatch<B>(
    router: Arc<Router>,
    req: http::Request<B>,
    remote_addr: SocketAddr,
    body_limit: usize,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let (parts, body) = req.into_parts();
    let response = match Limited::new(body, body_limit).collect().await {
        Ok(collected) => {
            let req = http::Request::from_parts(parts, collected.to_bytes());
            router.oneshot(req, remote_addr).await
        }
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(peer = %remote_addr, %path, limit = body_limit, "request body too large");
            router.decorate(parts, remote_addr, Response::status(Status::ContentTooLarge))
        }
        Err(e) => {
            warn!(peer = %remote_addr, %path, "failed to read request body: {e}");
            router.decorate(parts, remote_addr, Response::status(Status::BadRequest))
        }
    };

    info!(
        %method,
        %path,
        status = response.status_code().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only on Windows).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::middleware::SecurityHeaders;
    use crate::request::Request;

    fn router() -> Arc<Router> {
        Arc::new(
            Router::new()
                .post("/send-email", |req: Request| async move { req.body().len().to_string() })
                .layer(SecurityHeaders),
        )
    }

    fn post(len: usize) -> http::Request<Full<Bytes>> {
        http::Request::post("/send-email")
            .body(Full::new(Bytes::from(vec![b'x'; len])))
            .unwrap()
    }

    #[tokio::test]
    async fn oversized_body_is_413_with_security_headers() {
        let peer = "127.0.0.1:7000".parse().unwrap();
        let res = dispatch(router(), post(DEFAULT_BODY_LIMIT + 1), peer, DEFAULT_BODY_LIMIT)
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn body_at_the_limit_is_routed() {
        let peer = "127.0.0.1:7000".parse().unwrap();
        let res = dispatch(router(), post(DEFAULT_BODY_LIMIT), peer, DEFAULT_BODY_LIMIT)
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, DEFAULT_BODY_LIMIT.to_string());
    }
}
