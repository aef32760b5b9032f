//! Route table and middleware stack of the service.

use std::sync::Arc;

use crate::config::Config;
use crate::contact::{self, ContactService};
use crate::health;
use crate::mailer::Mailer;
use crate::middleware::{Cors, RateLimit, SecurityHeaders};
use crate::request::Request;
use crate::router::Router;
use crate::static_files::StaticFiles;

pub const SEND_EMAIL_PATH: &str = "/send-email";

/// Assembles the application around a mail collaborator.
pub fn app(config: &Config, mailer: Arc<dyn Mailer>) -> Router {
    let service = Arc::new(ContactService::new(config, mailer));

    let mut router = Router::new()
        .get("/health", health::health)
        .get("/", health::banner(&config.branding.site_name))
        .post(SEND_EMAIL_PATH, move |req: Request| contact::send_email(Arc::clone(&service), req))
        .fallback(StaticFiles::new(config.public_dir.clone()).handler())
        .layer(SecurityHeaders)
        .layer(Cors::new(config.allowed_origins.iter().cloned()));

    let limits = &config.rate_limits;
    if limits.enabled {
        router = router
            .layer(RateLimit::new(limits.global).trust_proxy(limits.trust_proxy))
            .layer(
                RateLimit::new(limits.send_email)
                    .only(SEND_EMAIL_PATH)
                    .trust_proxy(limits.trust_proxy),
            );
    }

    router
}
