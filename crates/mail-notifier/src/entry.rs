//! Admission-time composition of buffered log entries.
//!
//! Subjects and bodies are computed once, when a record is accepted, so a
//! flush only concatenates already-prepared strings and never re-inspects
//! metadata.

use serde_json::Value;

use crate::level::Level;
use crate::render;
use crate::{MAX_SUBJECT_LENGTH, METADATA_RENDER_DEPTH};

/// Marker appended to truncated subjects.
const ELLIPSIS: char = '…';

/// Separator between the raw message and its rendered metadata.
///
/// Kept byte-compatible with existing consumers of these notifications.
const BODY_SEPARATOR: &str = "\n\r\n\r";

/// One buffered record, fully composed at enqueue time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// `"{level}: {message}"`, capped at [`MAX_SUBJECT_LENGTH`] characters.
    pub subject: String,
    /// Raw message plus rendered metadata.
    pub body: String,
}

impl LogEntry {
    /// Composes an entry from one log call.
    ///
    /// When the message happens to be a JSON document carrying a non-empty
    /// string `message` field, that field becomes the subject source;
    /// otherwise the raw message is used. The probe is best-effort and never
    /// fails — unparsable messages are simply used verbatim.
    #[must_use]
    pub fn compose(level: Level, message: &str, metadata: Option<&Value>) -> Self {
        let rendered = metadata
            .map(|m| render::render(m, METADATA_RENDER_DEPTH))
            .unwrap_or_default();
        let source = extract_message(message).unwrap_or_else(|| message.to_string());

        LogEntry {
            subject: format!("{}: {}", level, truncate(&source, MAX_SUBJECT_LENGTH)),
            body: format!("{message}{BODY_SEPARATOR}{rendered}"),
        }
    }
}

/// Best-effort extraction of a `message` field from a JSON-encoded message.
fn extract_message(message: &str) -> Option<String> {
    let value: Value = serde_json::from_str(message).ok()?;
    match value.get("message") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Caps `text` at `max_length` characters.
///
/// `max_length` is floored at 2. Inputs of at most `max_length` characters
/// pass through unchanged; longer inputs keep their first `max_length - 1`
/// characters and gain a trailing `…`. The kept prefix is one character
/// shorter than the cap would allow — existing consumers rely on this exact
/// behavior.
#[must_use]
pub fn truncate(text: &str, max_length: usize) -> String {
    let max_length = max_length.max(2);
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_length - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}
