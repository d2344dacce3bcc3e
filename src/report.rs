//! Receive error report webhooks and forward them to Slack.
//!
//! The reporting service must be configured with Iris's `/webhook` endpoint
//! as the target URL and the Basic auth credentials from the environment. The
//! Slack channel is chosen per project; see [crate::slack::channel].

pub mod auth;
pub mod notify;
pub mod payload;
pub mod router;
