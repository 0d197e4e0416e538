//! Normalized message handed to module handlers

use super::RoomEvent;

/// A message that survived the filtering pipeline.
///
/// `body` is trimmed and reply-quote stripped and is guaranteed non-empty.
/// Constructed once per accepted inbound event and never mutated.
#[derive(Debug, Clone)]
pub struct Message {
    body: String,
    sender: String,
    room: String,
    raw: RoomEvent,
}

impl Message {
    pub(crate) fn new(body: String, raw: RoomEvent) -> Self {
        debug_assert!(!body.trim().is_empty());
        Self {
            sender: raw.sender.clone(),
            room: raw.room.clone(),
            body,
            raw,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// The raw transport event this message was built from
    pub fn raw(&self) -> &RoomEvent {
        &self.raw
    }
}
