//! Liveness probe and root banner.
//!
//! | Path | Answer |
//! |---|---|
//! | `/health` | `200 {"status":"ok","service":"email-backend"}` |
//! | `/` | `200` plain-text banner |
//!
//! Neither touches the mailer: if the process can answer HTTP at all, it is
//! alive.

use serde::Serialize;

use crate::{Json, Request, Response};

pub const SERVICE_NAME: &str = "email-backend";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
}

/// `GET /health`.
pub async fn health(_req: Request) -> Json<Health> {
    Json(Health { status: "ok", service: SERVICE_NAME })
}

/// `GET /` handler for a given site name.
pub fn banner(
    site_name: &str,
) -> impl Fn(Request) -> std::future::Ready<Response> + Send + Sync + 'static {
    let text = format!("{site_name} contact form API is up!");
    move |_req: Request| std::future::ready(Response::text(text.clone()))
}
