//! Mail-sending collaborators.
//!
//! The notifier only ever calls [`MailSender::send`]; everything about how
//! mail actually leaves the process lives behind that trait. The default
//! implementation speaks SMTP through `lettre`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::message::Email;

/// Errors surfaced by a mail-sending collaborator.
///
/// These never reach the logging framework: the notifier logs them to its
/// diagnostics channel and drops the batch.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// A sender or recipient address failed to parse.
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The outbound message could not be built.
    #[error("failed to build mail message: {0}")]
    Message(String),

    /// The SMTP conversation failed.
    #[error("smtp delivery failed: {0}")]
    Smtp(String),
}

/// Capability to deliver one composed notification.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Delivers `email`. One attempt, no retries.
    async fn send(&self, email: &Email) -> Result<(), DeliveryError>;
}

/// SMTP-backed [`MailSender`].
///
/// Connects relay-style, without TLS or authentication; point it at a local
/// MTA or a test catcher such as Mailpit.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Creates a mailer for the relay described by `config`.
    #[must_use]
    pub fn new(config: &SmtpConfig) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .build();

        SmtpMailer { transport }
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), DeliveryError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&email.from)?)
            .subject(email.subject.clone());
        for recipient in recipients(&email.to) {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let message = builder
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(email.html.clone()),
            )
            .map_err(|e| DeliveryError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse()
        .map_err(|e| DeliveryError::Address(format!("{}: {e}", address.trim())))
}

/// Splits a comma-separated recipient list into individual addresses.
fn recipients(to: &str) -> impl Iterator<Item = &str> {
    to.split(',').map(str::trim).filter(|r| !r.is_empty())
}
