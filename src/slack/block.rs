use serde::ser::SerializeStruct;
use serde::{ser, Serialize};

/// Slack's block API is its most modern, and allows us to mix rich formatting
/// with foreign plaintext. This is our limited subset thereof.
///
/// <https://api.slack.com/reference/block-kit/blocks>
pub enum Block {
    /// A `section` holding a single text object.
    Section(Text),
    /// A `section` laid out as a two-column grid of text objects.
    Fields(Vec<Text>),
    /// An `actions` block of interactive elements.
    Actions(Vec<Button>),
}

/// <https://api.slack.com/reference/block-kit/composition-objects#text>
pub enum Text {
    Plaintext(String),
    /// "mrkdwn" is Slack's alternative to Markdown. Callers are responsible
    /// for escaping foreign text with [escape_mrkdwn].
    ///
    /// <https://api.slack.com/reference/surfaces/formatting#basics>
    Mrkdwn(String),
}

/// A link button. Slack still delivers an interaction payload on click, which
/// we don't listen for.
///
/// <https://api.slack.com/reference/block-kit/block-elements#button>
pub struct Button {
    pub text: String,
    pub url: String,
    pub style: Option<ButtonStyle>,
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Danger,
}

// This won't scale to every text object option but for now is simpler than a
// more custom serialisation implementation.
#[derive(Serialize)]
struct RawText<'a> {
    #[serde(rename = "type")]
    typ: &'static str,
    text: &'a String,
}

impl ser::Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let raw = match self {
            Text::Plaintext(text) => RawText {
                typ: "plain_text",
                text,
            },
            Text::Mrkdwn(text) => RawText { typ: "mrkdwn", text },
        };

        raw.serialize(serializer)
    }
}

impl ser::Serialize for Button {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let len = if self.style.is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("Button", len)?;

        state.serialize_field("type", "button")?;
        state.serialize_field("text", &Text::Plaintext(self.text.to_owned()))?;
        state.serialize_field("url", &self.url)?;
        if let Some(style) = self.style {
            state.serialize_field("style", &style)?;
        }

        state.end()
    }
}

impl ser::Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut state = serializer.serialize_struct("Block", 2)?;

        match self {
            Block::Section(x) => {
                state.serialize_field("type", "section")?;
                state.serialize_field("text", x)?;
            }

            Block::Fields(xs) => {
                state.serialize_field("type", "section")?;
                state.serialize_field("fields", xs)?;
            }

            Block::Actions(xs) => {
                state.serialize_field("type", "actions")?;
                state.serialize_field("elements", xs)?;
            }
        };

        state.end()
    }
}

/// Escape the three characters Slack treats as control characters in mrkdwn.
///
/// <https://api.slack.com/reference/surfaces/formatting#escaping>
pub fn escape_mrkdwn(x: &str) -> String {
    x.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Longest `text` Slack accepts in a section block.
pub const MAX_SECTION_TEXT: usize = 3000;
/// Longest text Slack accepts for each of a section's fields.
pub const MAX_FIELD_TEXT: usize = 2000;

/// Cut `x` to at most `max` characters, marking the cut with an ellipsis.
/// Slack rejects the whole message if any one text object is too long.
pub fn truncate(x: &str, max: usize) -> String {
    if x.chars().count() <= max {
        return x.to_owned();
    }

    let mut kept: String = x.chars().take(max.saturating_sub(1)).collect();
    kept.push('…');
    kept
}

/// As [truncate], for text that's already been through [escape_mrkdwn]; an
/// entity such as `&amp;` is dropped whole rather than cut in half.
pub fn truncate_mrkdwn(x: &str, max: usize) -> String {
    if x.chars().count() <= max {
        return x.to_owned();
    }

    let mut kept: String = x.chars().take(max.saturating_sub(1)).collect();
    if let Some(amp) = kept.rfind('&') {
        if !kept[amp..].contains(';') {
            kept.truncate(amp);
        }
    }
    kept.push('…');
    kept
}

/// Percent-encode the characters which would end a mrkdwn `<url|text>` link
/// early.
pub fn escape_link(url: &str) -> String {
    url.replace('|', "%7C")
        .replace('<', "%3C")
        .replace('>', "%3E")
}
