//! Turn an error report into a Slack notification and deliver it.
//!
//! Each report produces exactly one `chat.postMessage` call to the channel
//! its project routes to. Nothing is retried: the outcome is handed back for
//! the caller to log.

use super::payload::{ProjectId, WebhookPayload};
use crate::{
    router::Deps,
    slack::{
        channel::ChannelId,
        message::{Action, DeliveryReceipt, Field, Notification},
        SlackError,
    },
};
use std::fmt;

/// A failed delivery, with enough context to find the report it belonged to.
#[derive(Debug)]
pub struct DispatchError {
    pub project: ProjectId,
    pub channel: ChannelId,
    pub source: SlackError,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to notify channel {} of error in project {}: {}",
            self.channel, self.project, self.source
        )
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Resolve the channel for a report, format it, and post it.
pub async fn dispatch(
    deps: &Deps,
    payload: &WebhookPayload,
) -> Result<DeliveryReceipt, DispatchError> {
    let project = &payload.group_info.project_id;
    let channel = deps.channels.resolve(project);

    deps.slack_client
        .post_message(channel, &build_notification(payload), deps.message_format)
        .await
        .map_err(|source| DispatchError {
            project: project.clone(),
            channel: channel.clone(),
            source,
        })
}

/// The fixed layout of every alert.
pub fn build_notification(payload: &WebhookPayload) -> Notification {
    // Slack rejects buttons without a URL, so an empty link drops both.
    let link = Some(payload.group_info.detail_link.trim())
        .filter(|x| !x.is_empty())
        .map(String::from);

    Notification {
        title: format!(
            "[Alert] New error reported in service: {}",
            payload.event_info.service
        ),
        link: link.clone(),
        fields: vec![
            Field {
                title: "Project ID".into(),
                value: payload.group_info.project_id.to_string(),
            },
            Field {
                title: "Version".into(),
                value: payload.event_info.version.to_owned(),
            },
        ],
        body: payload.exception_info.message.to_owned(),
        action: link.map(|url| Action {
            text: "View Details".into(),
            url,
        }),
    }
}
