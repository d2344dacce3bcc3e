//! Send structured messages to any given Slack channel.

use super::{api::*, attachment::*, block::*, channel::*, SlackError};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::{fmt, str::FromStr};

/// A structured message which does not permit custom formatting.
///
/// The definition is intentionally a little generalised to reduce coupling to
/// Slack's two message encodings; see [MessageFormat].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub link: Option<String>,
    /// Rendered side by side.
    pub fields: Vec<Field>,
    pub body: String,
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
}

/// A link button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub text: String,
    pub url: String,
}

/// How a [Notification] is encoded onto the wire. Both carry the same
/// information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// Legacy attachment with a red sidebar.
    #[default]
    Attachment,
    /// Block Kit layout.
    Blocks,
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attachment" | "attachments" => Ok(MessageFormat::Attachment),
            "blocks" => Ok(MessageFormat::Blocks),
            x => Err(format!("unknown message format {:?}, expected `attachment` or `blocks`", x)),
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageFormat::Attachment => write!(f, "attachment"),
            MessageFormat::Blocks => write!(f, "blocks"),
        }
    }
}

/// What Slack hands back after a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub channel: ChannelId,
    /// The message timestamp, which doubles as its ID within the channel.
    pub ts: Option<String>,
}

/// Colour of the attachment sidebar.
const ALERT_COLOR: &str = "#ff0000";

/// Slack rejects empty text objects.
const EMPTY_BODY: &str = "No error message provided";

/// <https://api.slack.com/methods/chat.postMessage#args>
#[skip_serializing_none]
#[derive(Serialize)]
struct MessageRequest<'a> {
    channel: &'a ChannelId,
    // Used for notifications in the presence of `blocks`. Attachments carry
    // their own `fallback`, and a top-level `text` would render above them.
    text: Option<String>,
    attachments: Option<Vec<Attachment>>,
    blocks: Option<Vec<Block>>,
}

/// <https://api.slack.com/methods/chat.postMessage#examples>
#[derive(Deserialize)]
struct MessageResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "ok_true")]
    ok: bool,
    channel: Option<ChannelId>,
    ts: Option<String>,
}

impl SlackClient {
    /// Post a message in a channel. Exactly one request is made; failures are
    /// returned to the caller rather than retried.
    pub async fn post_message(
        &self,
        channel: &ChannelId,
        msg: &Notification,
        format: MessageFormat,
    ) -> Result<DeliveryReceipt, SlackError> {
        let res: APIResult<MessageResponse> = self
            .post("/chat.postMessage")
            .json(&build_request(channel, msg, format))
            .send()
            .await?
            .json()
            .await?;

        match res {
            APIResult::Ok(res) => Ok(DeliveryReceipt {
                channel: res.channel.unwrap_or_else(|| channel.clone()),
                ts: res.ts,
            }),
            APIResult::Err(res) => Err(res
                .error
                .map(SlackError::APIResponseError)
                .unwrap_or(SlackError::APIResponseMissingError)),
        }
    }
}

fn build_request<'a>(
    channel: &'a ChannelId,
    msg: &Notification,
    format: MessageFormat,
) -> MessageRequest<'a> {
    match format {
        MessageFormat::Attachment => MessageRequest {
            channel,
            text: None,
            attachments: Some(vec![build_attachment(msg)]),
            blocks: None,
        },
        MessageFormat::Blocks => MessageRequest {
            channel,
            text: Some(build_notif_text(msg)),
            attachments: None,
            blocks: Some(build_blocks(msg)),
        },
    }
}

fn build_notif_text(msg: &Notification) -> String {
    if msg.body.is_empty() {
        msg.title.to_owned()
    } else {
        format!("{}: {}", msg.title, msg.body)
    }
}

/// Map [Notification] to a single legacy attachment. The body goes in a
/// full-width field as attachments have no dedicated text slot that renders
/// beneath fields.
fn build_attachment(msg: &Notification) -> Attachment {
    let mut fields: Vec<AttachmentField> = msg
        .fields
        .iter()
        .map(|x| AttachmentField {
            title: x.title.to_owned(),
            value: x.value.to_owned(),
            short: true,
        })
        .collect();

    fields.push(AttachmentField {
        title: "Error Message".into(),
        value: msg.body.to_owned(),
        short: false,
    });

    Attachment {
        fallback: build_notif_text(msg),
        color: Some(ALERT_COLOR),
        title: msg.title.to_owned(),
        title_link: msg.link.to_owned(),
        fields,
        actions: msg
            .action
            .iter()
            .map(|a| {
                AttachmentAction::link_button(
                    a.text.to_owned(),
                    a.url.to_owned(),
                    Some(ButtonStyle::Danger),
                )
            })
            .collect(),
    }
}

/// Put together the blocks, mapping [Notification] to its format on Slack's
/// end, including formatting.
fn build_blocks(msg: &Notification) -> Vec<Block> {
    let mut xs = Vec::with_capacity(4);

    xs.push(Block::Section(Text::Mrkdwn(fmt_title(msg))));

    if !msg.fields.is_empty() {
        let fields = msg
            .fields
            .iter()
            .map(|x| {
                let text = format!(
                    "*{}*\n{}",
                    escape_mrkdwn(&x.title),
                    escape_mrkdwn(&x.value)
                );
                Text::Mrkdwn(truncate_mrkdwn(&text, MAX_FIELD_TEXT))
            })
            .collect();
        xs.push(Block::Fields(fields));
    }

    let body = if msg.body.is_empty() {
        EMPTY_BODY.to_owned()
    } else {
        truncate(&msg.body, MAX_SECTION_TEXT)
    };
    xs.push(Block::Section(Text::Plaintext(body)));

    if let Some(a) = &msg.action {
        xs.push(Block::Actions(vec![Button {
            text: a.text.to_owned(),
            url: a.url.to_owned(),
            style: Some(ButtonStyle::Danger),
        }]));
    }

    xs
}

/// A bold title, linked if we've somewhere to link to. A link too long to fit
/// in the section is dropped; the button still carries it.
fn fmt_title(msg: &Notification) -> String {
    let title = escape_mrkdwn(&msg.title);

    msg.link
        .as_ref()
        .map(|link| format!("*<{}|{}>*", escape_link(link), title))
        .filter(|x| x.chars().count() <= MAX_SECTION_TEXT)
        .unwrap_or_else(|| format!("*{}*", truncate_mrkdwn(&title, MAX_SECTION_TEXT - 2)))
}
