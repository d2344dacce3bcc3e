//! The error report posted to us by the error reporting service.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::fmt;

/// Identifies the application that raised the error. This is the routing key
/// for [crate::slack::channel::ChannelRouting].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One captured exception.
///
/// Every field is free text. Absent or `null` fields and objects decode as
/// empty, and unknown fields are ignored, so that a sender adding or dropping
/// metadata never costs us an alert.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    #[serde_as(as = "DefaultOnNull")]
    pub version: String,
    #[serde_as(as = "DefaultOnNull")]
    pub subject: String,
    #[serde_as(as = "DefaultOnNull")]
    pub group_info: GroupInfo,
    #[serde_as(as = "DefaultOnNull")]
    pub exception_info: ExceptionInfo,
    #[serde_as(as = "DefaultOnNull")]
    pub event_info: EventInfo,
}

/// The error group this event was bucketed into.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupInfo {
    #[serde_as(as = "DefaultOnNull")]
    pub project_id: ProjectId,
    /// Link to the group in the reporting service's UI.
    #[serde_as(as = "DefaultOnNull")]
    pub detail_link: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionInfo {
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub typ: String,
    #[serde_as(as = "DefaultOnNull")]
    pub message: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInfo {
    #[serde_as(as = "DefaultOnNull")]
    pub log_message: String,
    #[serde_as(as = "DefaultOnNull")]
    pub request_method: String,
    #[serde_as(as = "DefaultOnNull")]
    pub request_url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub referrer: String,
    #[serde_as(as = "DefaultOnNull")]
    pub user_agent: String,
    #[serde_as(as = "DefaultOnNull")]
    pub service: String,
    #[serde_as(as = "DefaultOnNull")]
    pub version: String,
    #[serde_as(as = "DefaultOnNull")]
    pub response_status: String,
}
