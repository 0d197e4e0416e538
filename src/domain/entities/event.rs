//! Raw transport events as delivered by the protocol client

/// Kind of a room message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Emote,
    Notice,
    Image,
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Emote => "emote",
            MessageKind::Notice => "notice",
            MessageKind::Image => "image",
            MessageKind::Other(s) => s,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, MessageKind::Text)
    }
}

/// Content of a room message event. Redacted events carry no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContent {
    pub kind: MessageKind,
    pub body: Option<String>,
    /// Event id this message replies to, when the event is a reply
    pub in_reply_to: Option<String>,
}

impl EventContent {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            body: Some(body.into()),
            in_reply_to: None,
        }
    }

    pub fn reply(body: impl Into<String>, reply_to: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            body: Some(body.into()),
            in_reply_to: Some(reply_to.into()),
        }
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some()
    }
}

/// A room message event as delivered by the transport
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub event_id: String,
    pub room: String,
    pub sender: String,
    /// Server timestamp in milliseconds
    pub timestamp_ms: i64,
    /// None for redacted or tombstoned events
    pub content: Option<EventContent>,
}

impl RoomEvent {
    pub fn new(
        room: impl Into<String>,
        sender: impl Into<String>,
        timestamp_ms: i64,
        content: EventContent,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            room: room.into(),
            sender: sender.into(),
            timestamp_ms,
            content: Some(content),
        }
    }

    pub fn redacted(room: impl Into<String>, sender: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            room: room.into(),
            sender: sender.into(),
            timestamp_ms,
            content: None,
        }
    }
}

/// Events the run loop consumes from the transport
#[derive(Debug, Clone)]
pub enum TransportEvent {
    RoomJoin { room: String },
    RoomMessage { event: RoomEvent },
}
