//! # mail-notifier
//!
//! Batches application log records and periodically delivers them as a single
//! aggregated email, so a noisy logger cannot flood an inbox with one message
//! per event.
//!
//! The crate plugs into a structured-logging framework as a named sink (see
//! [`transport::Transport`]) and hands composed notifications to a
//! mail-sending collaborator (see [`mailer::MailSender`]).
//!
//! ## Batching strategy
//!
//! Records accumulate in an in-memory buffer owned by a single service task.
//! The buffer is flushed into one outbound email when either:
//! 1. **Count limit**: the buffer reaches `max_buffer_items`, or
//! 2. **Timer**: the recurring flush interval elapses.
//!
//! A flush with exactly one buffered entry keeps that entry's own subject and
//! body; a flush with more entries aggregates them under a
//! `messages: {count}` subject with one HTML section per entry, in call
//! order.
//!
//! ## Delivery policy
//!
//! Delivery is fire-and-forget: one attempt per batch. Failures are logged to
//! the operational diagnostics channel and the batch is dropped; nothing is
//! ever propagated back to the application emitting log records. The only
//! caller-visible failure mode is a construction-time configuration error.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_copy_implementations)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

use std::time::Duration;

/// Construction-time configuration and validation
pub mod config;

/// Admission-time composition of buffered entries
pub mod entry;

/// Event channel for observers and tests
pub mod event_bus;

/// Hostname detection for the default sender address
pub mod hostname;

/// Severity labels and ordering
pub mod level;

/// Mail-sending collaborators (trait + SMTP implementation)
pub mod mailer;

/// Outbound notification composition
pub mod message;

/// Bounded-depth rendering of structured metadata
pub mod render;

/// Notifier service: buffer ownership and flush scheduling
pub mod service;

/// Sink-facing transport surface
pub mod transport;

/// Name under which this sink registers with a logging framework.
pub const TRANSPORT_NAME: &str = "mail";

/// Default size-based flush threshold.
pub const DEFAULT_MAX_BUFFER_ITEMS: usize = 100;

/// Default time-based flush interval.
pub const DEFAULT_MAX_BUFFER_TIME_SPAN: Duration = Duration::from_millis(60_000);

/// Maximum subject length in characters before truncation.
///
/// Subjects longer than this keep their first `MAX_SUBJECT_LENGTH - 1`
/// characters and gain a trailing ellipsis marker.
pub const MAX_SUBJECT_LENGTH: usize = 120;

/// Maximum traversal depth when rendering metadata into a notification body.
///
/// Deeply nested structures collapse beyond this depth rather than producing
/// unbounded output.
pub const METADATA_RENDER_DEPTH: usize = 5;
