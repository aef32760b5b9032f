//! Shared fixtures: a recording mailer and request helpers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use contact_relay::{Config, DispatchError, MailFuture, Mailer, OutgoingMail, Response, Router, app};

/// Records every mail it is asked to send; optionally fails each send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: OutgoingMail) -> MailFuture<'_> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(mail);
            if self.fail {
                // Any lettre error will do; the handler must not leak it.
                return Err(DispatchError::Build(lettre::error::Error::MissingTo));
            }
            Ok("<test-id@relay.local>".to_owned())
        })
    }
}

pub fn config() -> Config {
    let mut config = Config::new("owner@example.com".parse().unwrap(), "secret");
    config.public_dir = "does-not-exist".into();
    config
}

pub fn build(config: &Config, mailer: &Arc<RecordingMailer>) -> Router {
    let mailer: Arc<dyn Mailer> = mailer.clone();
    app(config, mailer)
}

pub fn peer() -> SocketAddr {
    "198.51.100.10:51000".parse().unwrap()
}

pub fn post_json(path: &str, body: &str) -> http::Request<Bytes> {
    http::Request::post(path)
        .header("content-type", "application/json")
        .body(Bytes::from(body.to_owned()))
        .unwrap()
}

pub fn get(path: &str) -> http::Request<Bytes> {
    http::Request::get(path).body(Bytes::new()).unwrap()
}

pub fn json(res: &Response) -> serde_json::Value {
    serde_json::from_slice(res.body()).expect("response body is JSON")
}

pub const VALID: &str =
    r#"{"from_name":"Ana","from_email":"ana@example.com","subject":"Hi","message":"Hello"}"#;
