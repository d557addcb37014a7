//! Sink-facing transport surface.
//!
//! A logging framework registers a [`Transport`] under its name and forwards
//! each record it accepts to [`Transport::record`]. The acknowledgment only
//! confirms admission into the notifier's pipeline — delivery is asynchronous
//! and entirely decoupled from it.

use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::config::{Config, ConfigError};
use crate::entry::LogEntry;
use crate::event_bus::EventBus;
use crate::level::Level;
use crate::mailer::{MailSender, SmtpMailer};
use crate::service::{NotifierHandle, NotifierService};
use crate::TRANSPORT_NAME;

/// Admission acknowledgment: whether the record entered the pipeline.
pub type Ack = bool;

/// Errors a sink may raise while admitting a record.
///
/// The mail transport itself never raises one — a record that cannot be
/// admitted is acknowledged with `Ack = false` instead, so this transport can
/// never be the reason the host application crashes. The type exists for
/// sinks with stricter admission rules.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransportError {
    /// The sink rejected the record outright.
    #[error("record rejected: {0}")]
    Rejected(String),
}

/// Capability contract a logging framework expects from a named sink.
pub trait Transport {
    /// Identifier under which the sink is registered.
    fn name(&self) -> &'static str;

    /// Minimum severity the framework should forward to this sink.
    ///
    /// Filtering is the framework's job; [`Transport::record`] accepts
    /// whatever it is handed.
    fn min_level(&self) -> Level;

    /// Whether the sink is currently muted.
    fn silent(&self) -> bool;

    /// Admits one record and acknowledges whether it was accepted.
    fn record(
        &self,
        level: Level,
        message: &str,
        metadata: Option<&Value>,
    ) -> Result<Ack, TransportError>;
}

/// Buffering email transport.
///
/// Records are composed at admission time and buffered by the notifier
/// service; the service flushes them into aggregate emails on a timer or on
/// buffer overflow.
pub struct MailTransport {
    config: Arc<Config>,
    handle: NotifierHandle,
}

impl MailTransport {
    /// Builds the transport with an SMTP mailer taken from `config.smtp`.
    ///
    /// Returns the transport, its (not yet running) service, and the event
    /// bus. Spawn [`NotifierService::run`] to start buffering — or use
    /// [`MailTransport::spawn`] to do both in one step.
    pub fn new(config: Config) -> Result<(Self, NotifierService, EventBus), ConfigError> {
        let mailer = Arc::new(SmtpMailer::new(&config.smtp));
        Self::with_mailer(config, mailer)
    }

    /// Builds the transport around an injected mail-sending collaborator.
    pub fn with_mailer(
        config: Config,
        mailer: Arc<dyn MailSender>,
    ) -> Result<(Self, NotifierService, EventBus), ConfigError> {
        config.validate()?;

        let config = Arc::new(config);
        let (event_bus, events) = EventBus::run();
        let (service, handle) = NotifierService::new(Arc::clone(&config), mailer, events);

        Ok((Self { config, handle }, service, event_bus))
    }

    /// Builds the transport and spawns its service on the current runtime,
    /// leaving the first flush timer armed.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(config: Config) -> Result<(Self, EventBus), ConfigError> {
        let (transport, service, event_bus) = Self::new(config)?;
        tokio::spawn(service.run());
        Ok((transport, event_bus))
    }

    /// Flushes the buffer now instead of waiting for the timer.
    ///
    /// Resolves once the snapshot is handed off for delivery; the delivery
    /// itself remains fire-and-forget.
    pub async fn flush(&self) -> Result<(), String> {
        self.handle.flush().await
    }
}

impl Transport for MailTransport {
    fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    fn min_level(&self) -> Level {
        self.config.level
    }

    fn silent(&self) -> bool {
        self.config.silent
    }

    fn record(
        &self,
        level: Level,
        message: &str,
        metadata: Option<&Value>,
    ) -> Result<Ack, TransportError> {
        // Deliberate bypass: no buffering, no events, immediate success.
        if self.config.silent {
            return Ok(true);
        }

        let entry = LogEntry::compose(level, message, metadata);
        if self.handle.record(entry).is_err() {
            error!("MAIL | notifier service is gone, dropping log record");
            return Ok(false);
        }

        Ok(true)
    }
}
