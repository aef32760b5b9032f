//! Contact intake: validate, sanitize, render and dispatch one submission.
//!
//! ```text
//! POST /send-email
//!   → presence check        400 "all fields are required"
//!   → email format check    400 "invalid email"
//!   → sanitize all fields
//!   → render HTML body
//!   → Mailer::send          500 "failed to send message"
//!   → 200 "message sent"
//! ```
//!
//! A rejected submission never reaches the mailer. A valid one produces
//! exactly one `Mailer::send` call and is never retried.

pub mod sanitize;
pub mod template;

use std::sync::{Arc, LazyLock};

use chrono::Datelike;
use lettre::Address;
use lettre::message::Mailbox;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Branding, Config};
use crate::mailer::{DispatchError, Mailer, OutgoingMail};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

pub const SUBJECT_PREFIX: &str = "New website contact: ";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

// ── Submission ────────────────────────────────────────────────────────────────

/// The raw form body. Absent fields deserialize to `None`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Submission {
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A submission whose four fields are present and whose email is well formed.
#[derive(Clone, Debug)]
pub struct Validated {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Validated fields after markup neutralisation, plus the parsed reply address.
#[derive(Clone, Debug)]
pub struct Sanitized {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub address: Address,
}

impl Submission {
    pub fn validate(self) -> Result<Validated, ContactError> {
        let name = required(self.from_name, "from_name")?;
        let email = required(self.from_email, "from_email")?;
        let subject = required(self.subject, "subject")?;
        let message = required(self.message, "message")?;

        if !is_valid_email(&email) {
            return Err(ContactError::InvalidEmailFormat);
        }

        Ok(Validated { name, email, subject, message })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ContactError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ContactError::MissingField(field))
}

impl Validated {
    /// The reply address is parsed from the email as submitted; only the copy
    /// shown in the HTML body is sanitized.
    pub fn sanitize(self) -> Result<Sanitized, ContactError> {
        let address = self.email.parse().map_err(|_| ContactError::InvalidEmailFormat)?;
        Ok(Sanitized {
            name: sanitize::sanitize(&self.name),
            email: sanitize::sanitize(&self.email),
            subject: sanitize::sanitize(&self.subject),
            message: sanitize::sanitize(&self.message),
            address,
        })
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("request body is not a valid submission: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("malformed sender email")]
    InvalidEmailFormat,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ContactError {
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidBody(_) | Self::MissingField(_) | Self::InvalidEmailFormat => {
                Status::BadRequest
            }
            Self::Dispatch(_) => Status::InternalServerError,
        }
    }

    /// The caller-facing message. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "invalid request body",
            Self::MissingField(_) => "all fields are required",
            Self::InvalidEmailFormat => "invalid email",
            Self::Dispatch(_) => "failed to send message",
        }
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// Shared state of the `/send-email` handler.
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    owner: Address,
    branding: Branding,
}

impl ContactService {
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            mailer,
            owner: config.smtp.user.clone(),
            branding: config.branding.clone(),
        }
    }

    /// Runs the whole intake pipeline. Returns the relay's message id.
    pub async fn submit(&self, submission: Submission) -> Result<String, ContactError> {
        let fields = submission.validate()?.sanitize()?;
        let mail = self.compose(&fields, chrono::Local::now().year());
        Ok(self.mailer.send(mail).await?)
    }

    /// Builds the notification: from the owner's mailbox under the sender's
    /// name, to the owner, replying to the sender.
    pub fn compose(&self, fields: &Sanitized, year: i32) -> OutgoingMail {
        let display_name = Some(fields.name.clone()).filter(|n| !n.trim().is_empty());
        OutgoingMail {
            from: Mailbox::new(display_name, self.owner.clone()),
            to: Mailbox::new(None, self.owner.clone()),
            reply_to: Mailbox::new(None, fields.address.clone()),
            subject: format!("{SUBJECT_PREFIX}{}", fields.subject),
            html: template::render(fields, &self.branding, year),
        }
    }
}

#[derive(Serialize)]
struct Reply {
    success: bool,
    message: &'static str,
}

/// `POST /send-email`.
pub async fn send_email(service: Arc<ContactService>, req: Request) -> Response {
    let submission = match parse_body(&req) {
        Ok(submission) => submission,
        Err(e) => return reject(e),
    };

    match service.submit(submission).await {
        Ok(id) => {
            info!(message_id = %id, "contact message sent");
            Response::builder().json_value(&Reply { success: true, message: "message sent" })
        }
        Err(e) => reject(e),
    }
}

/// Non-JSON bodies are read as an empty form, like an unparsed body would be.
fn parse_body(req: &Request) -> Result<Submission, ContactError> {
    if !req.is_json() || req.body().trim_ascii().is_empty() {
        return Ok(Submission::default());
    }
    req.json().map_err(ContactError::InvalidBody)
}

fn reject(e: ContactError) -> Response {
    match &e {
        ContactError::Dispatch(inner) => error!("failed to send contact message: {inner}"),
        other => debug!("submission rejected: {other}"),
    }
    Response::builder()
        .status(e.status())
        .json_value(&Reply { success: false, message: e.public_message() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, email: &str, subject: &str, message: &str) -> Submission {
        Submission {
            from_name: Some(name.to_owned()),
            from_email: Some(email.to_owned()),
            subject: Some(subject.to_owned()),
            message: Some(message.to_owned()),
        }
    }

    #[test]
    fn email_pattern() {
        for ok in ["ana@example.com", "a.b+c@sub.example.co", "x@y.z"] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in [
            "not-an-email",
            "ana@example",
            "@example.com",
            "ana@.com",
            "ana@example.",
            "ana @example.com",
            "ana@exa mple.com",
            "ana@@example.com",
            "",
        ] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn every_field_is_required() {
        let full = submission("Ana", "ana@example.com", "Hi", "Hello");
        let cases = [
            Submission { from_name: None, ..full.clone() },
            Submission { from_email: Some(String::new()), ..full.clone() },
            Submission { subject: Some("   ".to_owned()), ..full.clone() },
            Submission { message: None, ..full.clone() },
            Submission::default(),
        ];
        for case in cases {
            let err = case.validate().unwrap_err();
            assert!(matches!(err, ContactError::MissingField(_)), "{err:?}");
            assert_eq!(err.public_message(), "all fields are required");
            assert_eq!(err.status(), Status::BadRequest);
        }
    }

    #[test]
    fn presence_is_checked_before_format() {
        let err = Submission { message: None, ..submission("Ana", "nope", "Hi", "x") }
            .validate()
            .unwrap_err();
        assert!(matches!(err, ContactError::MissingField("message")));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let err = submission("Ana", "not-an-email", "Hi", "Hello").validate().unwrap_err();
        assert!(matches!(err, ContactError::InvalidEmailFormat));
        assert_eq!(err.public_message(), "invalid email");
    }

    #[test]
    fn reply_address_keeps_characters_the_html_escapes() {
        let fields = submission("Ana", "a&b@example.com", "Hi", "Hello")
            .validate()
            .unwrap()
            .sanitize()
            .unwrap();
        assert_eq!(fields.address.to_string(), "a&b@example.com");
        assert_eq!(fields.email, "a&amp;b@example.com");
    }

    #[test]
    fn email_that_is_not_a_mailbox_is_rejected() {
        let validated = submission("Ana", "a<b>@example.com", "Hi", "Hello").validate().unwrap();
        let err = validated.sanitize().unwrap_err();
        assert!(matches!(err, ContactError::InvalidEmailFormat));
    }

    #[test]
    fn sanitizes_every_field() {
        let raw = submission("<b>Ana</b>", "ana@example.com", "<i>Hi</i>", "<script>x</script>Hello");
        let fields = raw
            .validate()
            .unwrap()
            .sanitize()
            .unwrap();
        assert_eq!(fields.name, "Ana");
        assert_eq!(fields.subject, "Hi");
        assert_eq!(fields.message, "Hello");
        assert_eq!(fields.address.to_string(), "ana@example.com");
    }

    #[test]
    fn dispatch_errors_hide_details() {
        let err = ContactError::Dispatch(DispatchError::Build(lettre::error::Error::MissingFrom));
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.public_message(), "failed to send message");
    }
}
