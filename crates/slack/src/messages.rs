use namegame_core::engine::{Card, CardField, Reply};
use serde::Serialize;

/// A Slack message attachment in wire shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl From<Card> for Attachment {
    fn from(card: Card) -> Self {
        Self {
            color: card.color,
            title: card.title,
            image_url: card.image_url,
            text: card.body,
            fields: card.fields.into_iter().map(AttachmentField::from).collect(),
        }
    }
}

impl From<CardField> for AttachmentField {
    fn from(field: CardField) -> Self {
        Self { title: field.title, value: field.value, short: field.short }
    }
}

/// One outgoing chat action, addressed to a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Text { channel_id: String, text: String },
    Card { channel_id: String, fallback_text: String, attachment: Attachment },
}

/// Maps an engine reply onto the wire. Cards fall back to their title for
/// clients that cannot render attachments.
pub fn outbound_from_reply(channel_id: &str, reply: Reply) -> Outbound {
    match reply {
        Reply::Text(text) => Outbound::Text { channel_id: channel_id.to_owned(), text },
        Reply::Card(card) => Outbound::Card {
            channel_id: channel_id.to_owned(),
            fallback_text: card.title.clone().unwrap_or_default(),
            attachment: Attachment::from(card),
        },
    }
}
