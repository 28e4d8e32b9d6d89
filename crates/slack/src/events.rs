/// One inbound RTM event, already decoded off the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RtmEvent {
    Connected { connection_count: u32 },
    Message(MessageEvent),
    Error(String),
    InvalidAuth,
    Unsupported { event_type: String },
}

/// A chat message addressed to (or visible to) the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub user_id: String,
    pub channel_id: String,
    pub text: String,
}
