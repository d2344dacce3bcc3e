//! Supports posting a structured message to any Slack channel.
//!
//! Whilst Iris only supports this communication mechanism, the message
//! structure is intentionally a little generalised.
//!
//! See [message::Notification].

pub mod api;
mod attachment;
pub mod auth;
mod block;
pub mod channel;
pub mod error;
pub mod message;

pub use self::error::SlackError;
