//! Outbound mail collaborator.
//!
//! [`Mailer`] is the seam between the contact handler and the SMTP relay:
//! production uses [`SmtpMailer`] (lettre over STARTTLS), tests plug in a
//! recording double.

use std::future::Future;
use std::pin::Pin;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

use crate::config::SmtpConfig;

/// A composed notification ready for submission.
#[derive(Clone, Debug)]
pub struct OutgoingMail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Mailbox,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Future returned by [`Mailer::send`]: resolves to the message identifier.
pub type MailFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, DispatchError>> + Send + 'a>>;

/// Something that can submit an [`OutgoingMail`].
///
/// Object safe, so the application holds it as `Arc<dyn Mailer>`.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail) -> MailFuture<'_>;
}

/// Submits mail through an authenticated SMTP relay.
///
/// The transport is built once; lettre opens connections per send.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Plain connection upgraded with STARTTLS when the server offers it.
    pub fn new(config: &SmtpConfig) -> Result<Self, lettre::transport::smtp::Error> {
        let tls = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Opportunistic(tls))
            .credentials(Credentials::new(config.user.to_string(), config.password.clone()))
            .build();

        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: OutgoingMail) -> MailFuture<'_> {
        Box::pin(async move {
            let message = build_message(mail)?;
            let id = message
                .headers()
                .get_raw("Message-ID")
                .unwrap_or_default()
                .to_owned();
            let response = self.transport.send(message).await?;
            debug!(code = %response.code(), "relay accepted message");
            Ok(id)
        })
    }
}

fn build_message(mail: OutgoingMail) -> Result<Message, lettre::error::Error> {
    Message::builder()
        .from(mail.from)
        .to(mail.to)
        .reply_to(mail.reply_to)
        .subject(mail.subject)
        .message_id(None)
        .header(ContentType::TEXT_HTML)
        .body(mail.html)
}
