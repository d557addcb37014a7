//! Construction-time configuration for the mail transport.
//!
//! Only the recipient is required; everything else has a default. There is no
//! runtime reconfiguration: the notifier service reads a shared snapshot of
//! [`Config`] for its whole lifetime.

use std::time::Duration;

use crate::hostname;
use crate::level::Level;
use crate::{DEFAULT_MAX_BUFFER_ITEMS, DEFAULT_MAX_BUFFER_TIME_SPAN};

/// Errors raised while validating transport configuration.
///
/// Configuration problems are the only failure the transport ever surfaces
/// to its caller; they prevent construction entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The required recipient address is missing or blank.
    #[error("mail transport requires a non-empty 'to' recipient")]
    MissingRecipient,
}

/// SMTP relay settings, passed through opaquely to the mailer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpConfig {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 25,
        }
    }
}

/// Transport options, immutable after construction.
#[derive(Clone, Debug)]
pub struct Config {
    /// Recipient address(es). Comma-separated lists are accepted. Required.
    pub to: String,

    /// Sender address. Derived from the local hostname when unset.
    pub from: Option<String>,

    /// Minimum severity exposed to the logging framework.
    pub level: Level,

    /// Suppresses all buffering and sending when set.
    pub silent: bool,

    /// Size-based flush threshold: reaching this many buffered entries
    /// triggers an immediate flush, pre-empting the timer.
    pub max_buffer_items: usize,

    /// Time-based flush interval.
    pub max_buffer_time_span: Duration,

    /// Mail relay settings, handed to the SMTP mailer unchanged.
    pub smtp: SmtpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            to: String::new(),
            from: None,
            level: Level::default(),
            silent: false,
            max_buffer_items: DEFAULT_MAX_BUFFER_ITEMS,
            max_buffer_time_span: DEFAULT_MAX_BUFFER_TIME_SPAN,
            smtp: SmtpConfig::default(),
        }
    }
}

impl Config {
    /// Validates the options a constructor received.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.to.trim().is_empty() {
            return Err(ConfigError::MissingRecipient);
        }
        Ok(())
    }

    /// Resolved sender address: the configured `from`, or
    /// `"mail-notifier@<local-hostname>"`.
    #[must_use]
    pub fn sender(&self) -> String {
        self.from.clone().unwrap_or_else(|| {
            format!("{}@{}", env!("CARGO_PKG_NAME"), hostname::get_hostname())
        })
    }
}
