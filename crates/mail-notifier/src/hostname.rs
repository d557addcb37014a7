//! Hostname detection for the default sender address.

use std::env;

use tracing::warn;

/// Get the local hostname, best effort.
///
/// Tries the `HOSTNAME` environment variable first (commonly set in
/// containers), then the system hostname, and falls back to `"localhost"` so
/// a sender address can always be derived.
#[must_use]
pub fn get_hostname() -> String {
    if let Ok(hostname) = env::var("HOSTNAME") {
        if !hostname.is_empty() {
            return hostname;
        }
    }

    match nix::unistd::gethostname() {
        Ok(hostname_osstr) => {
            if let Some(hostname_str) = hostname_osstr.to_str() {
                if !hostname_str.is_empty() {
                    return hostname_str.to_string();
                }
            }
        }
        Err(e) => {
            warn!("MAIL | Failed to get system hostname: {}", e);
        }
    }

    "localhost".to_string()
}
