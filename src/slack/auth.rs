//! Helpers around Slack's use of OAuth Bearer Authentication.

use std::fmt;

/// A newtype wrapper around a Slack bot token (`xoxb-…`).
#[derive(Clone, PartialEq, Eq)]
pub struct SlackAccessToken(pub String);

/// Redacted, so a `Debug` of [crate::config::Config] never contains the token.
impl fmt::Debug for SlackAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlackAccessToken(<redacted>)")
    }
}

/// Convert a Slack access token to a `Bearer` `Authorization` header value.
pub fn to_auth_header_val(t: &SlackAccessToken) -> String {
    format!("Bearer {}", t.0)
}
