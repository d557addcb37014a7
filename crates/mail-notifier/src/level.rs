//! Severity labels accepted by the transport.
//!
//! Five levels ordered by severity. Parsing is case-insensitive; labels
//! render lowercase, which is the form used in notification subjects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log severity, ordered from least to most severe.
///
/// The ordering supports minimum-level filtering by the consuming logging
/// framework: a record passes a sink's threshold when
/// `record_level >= sink.min_level()`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Very low priority, extremely verbose information.
    Trace,
    /// Lower priority information useful for debugging.
    Debug,
    /// Useful information about normal operations. This is the default
    /// minimum level.
    #[default]
    Info,
    /// Hazardous situations that may lead to errors.
    Warn,
    /// Serious errors that require attention.
    Error,
}

impl Level {
    /// Lowercase label, as rendered into notification subjects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown severity label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level")]
pub struct ParseLevelError;

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError),
        }
    }
}
