//! # contact-relay
//!
//! A small HTTP service that turns contact-form submissions into an email to
//! the site owner, relayed through an authenticated SMTP account.
//!
//! ## What it does
//!
//! - `POST /send-email` validates four fields, strips markup from them,
//!   renders an HTML notification and hands it to the SMTP relay.
//! - `GET /health` and `GET /` answer probes.
//! - Everything else under `GET` is served from the public asset directory.
//!
//! ## What it does not do
//!
//! No queue, no retries, no storage. A failed send is reported to the caller
//! as `500` and logged; the caller resubmits.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//!
//! use contact_relay::{Config, Server, SmtpMailer, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), contact_relay::Error> {
//!     let config = Config::from_env()?;
//!     let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
//!     let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
//!     Server::bind(addr).serve(app(&config, mailer)).await
//! }
//! ```

mod app;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod contact;
pub mod health;
pub mod mailer;
pub mod middleware;
pub mod static_files;

pub use app::{SEND_EMAIL_PATH, app};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use handler::Handler;
pub use mailer::{DispatchError, MailFuture, Mailer, OutgoingMail, SmtpMailer};
pub use method::Method;
pub use request::{Request, RequestHead};
pub use response::{IntoResponse, Json, Response};
pub use router::Router;
pub use server::{DEFAULT_BODY_LIMIT, Server};
pub use status::Status;
