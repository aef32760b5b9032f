//! Public asset directory (`logo.png` referenced by the email, favicon, …).
//!
//! Requests are mapped below the root directory component by component;
//! anything that is not a plain name (`..`, absolute paths, hidden files)
//! is a 404, as is anything that resolves outside the root.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::{Request, Response, Status};

/// Serves files under `root` for `GET` requests that match no route.
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a URL path to a file inside the root, refusing traversal.
    ///
    /// Segments are percent-decoded before the checks, so `%2e%2e` is as
    /// unwelcome as `..`.
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(url_path).decode_utf8().ok()?;
        let relative = decoded.trim_start_matches('/');
        if relative.contains(['\\', '\0']) {
            return None;
        }
        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) if !part.to_string_lossy().starts_with('.') => {
                    path.push(part);
                }
                _ => return None,
            }
        }
        if path == self.root {
            path.push("index.html");
        }
        Some(path)
    }

    pub async fn serve(&self, req: &Request) -> Response {
        let Some(path) = self.resolve(req.path()) else {
            return Response::status(Status::NotFound);
        };

        // Symlinks may still point outside the root.
        let (Ok(root), Ok(file)) = (
            tokio::fs::canonicalize(&self.root).await,
            tokio::fs::canonicalize(&path).await,
        ) else {
            return Response::status(Status::NotFound);
        };
        if !file.starts_with(&root) {
            debug!(path = req.path(), "static path escapes root");
            return Response::status(Status::NotFound);
        }

        match tokio::fs::read(&file).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(&file).first_or_octet_stream();
                Response::builder().typed(mime.as_ref(), bytes)
            }
            Err(e) => {
                debug!(path = req.path(), "static file unreadable: {e}");
                Response::status(Status::NotFound)
            }
        }
    }

    /// Router fallback handler backed by this directory.
    pub fn handler(self) -> impl crate::Handler {
        let files = Arc::new(self);
        move |req: Request| {
            let files = Arc::clone(&files);
            async move { files.serve(&req).await }
        }
    }
}
