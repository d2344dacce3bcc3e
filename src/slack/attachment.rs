//! Slack's legacy "secondary attachments". Superseded by [super::block], but
//! still the only way to get the coloured sidebar down the message edge.
//!
//! <https://api.slack.com/reference/messaging/attachments>

use super::block::ButtonStyle;
use serde::Serialize;
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Serialize)]
pub struct Attachment {
    /// Plaintext summary for clients which can't render attachments.
    pub fallback: String,
    /// Hex colour of the sidebar, e.g. `#ff0000`.
    pub color: Option<&'static str>,
    pub title: String,
    pub title_link: Option<String>,
    pub fields: Vec<AttachmentField>,
    pub actions: Vec<AttachmentAction>,
}

#[derive(Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// Whether the field may sit side by side with other short fields.
    pub short: bool,
}

#[skip_serializing_none]
#[derive(Serialize)]
pub struct AttachmentAction {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub text: String,
    pub url: String,
    pub style: Option<ButtonStyle>,
}

impl AttachmentAction {
    pub fn link_button(text: String, url: String, style: Option<ButtonStyle>) -> Self {
        AttachmentAction {
            typ: "button",
            text,
            url,
            style,
        }
    }
}
