//! Outbound notification composition.
//!
//! A snapshot with a single entry is delivered as-is, keeping single-error
//! emails maximally readable; larger snapshots are aggregated into one
//! HTML-sectioned digest under a `messages: {count}` subject.

use crate::entry::LogEntry;

/// Envelope handed to the mail-sending collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email {
    /// Sender address.
    pub from: String,
    /// Recipient address(es), comma-separated lists allowed.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Composes one outbound email from a buffer snapshot.
///
/// Entries appear in call order. Returns `None` for an empty snapshot:
/// nothing is delivered for an idle interval.
#[must_use]
pub fn compose(from: &str, to: &str, entries: &[LogEntry]) -> Option<Email> {
    match entries {
        [] => None,
        [only] => Some(Email {
            from: from.to_string(),
            to: to.to_string(),
            subject: only.subject.clone(),
            html: only.body.clone(),
        }),
        _ => {
            let mut html = String::new();
            for entry in entries {
                html.push_str("<br>");
                html.push_str("<h2>");
                html.push_str(&entry.subject);
                html.push_str("</h2><br>");
                html.push_str("<pre>");
                html.push_str(&entry.body);
                html.push_str("</pre><br><hr>");
            }
            Some(Email {
                from: from.to_string(),
                to: to.to_string(),
                subject: format!("messages: {}", entries.len()),
                html,
            })
        }
    }
}
