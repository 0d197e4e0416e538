//! Event normalizer - turns raw room events into dispatchable messages
//!
//! Every inbound message event runs through a fixed filtering pipeline that
//! short-circuits on the first failing check. Events that fall out are
//! dropped silently; only events that represent a fresh, human-authored,
//! plain-text command survive as a [`Message`].

use std::collections::HashMap;

use tracing::trace;

use crate::domain::entities::{Message, RoomEvent};

/// Marker prefixing each quoted line in a reply body
const QUOTE_PREFIX: &str = "> ";

/// Normalize a raw event into a [`Message`], or `None` to drop it.
///
/// Filter order, short-circuiting on the first match:
/// 1. no content (redacted/tombstoned)
/// 2. older than process start (history replayed during initial sync)
/// 3. older than this process's join time for the room
/// 4. not plain text
/// 5. empty or absent body
/// 6. reply events get their leading quote block stripped
/// 7. authored by the bot itself
/// 8. empty after trimming
pub fn normalize(
    event: RoomEvent,
    start_time_ms: i64,
    room_joined_at: &HashMap<String, i64>,
    self_user_id: &str,
) -> Option<Message> {
    let Some(content) = event.content.as_ref() else {
        trace!(event_id = %event.event_id, "dropping event without content");
        return None;
    };

    if event.timestamp_ms < start_time_ms {
        trace!(event_id = %event.event_id, "dropping pre-start event");
        return None;
    }

    if let Some(joined_at) = room_joined_at.get(&event.room) {
        if event.timestamp_ms < *joined_at {
            trace!(event_id = %event.event_id, room = %event.room, "dropping pre-join event");
            return None;
        }
    }

    if !content.kind.is_text() {
        trace!(event_id = %event.event_id, kind = content.kind.as_str(), "dropping non-text event");
        return None;
    }

    let body = content.body.as_deref()?;
    if body.is_empty() {
        return None;
    }

    let body = if content.is_reply() {
        strip_reply_quote(body)
    } else {
        body.to_string()
    };

    if event.sender == self_user_id {
        trace!(event_id = %event.event_id, "dropping self-authored event");
        return None;
    }

    let body = body.trim().to_string();
    if body.is_empty() {
        return None;
    }

    Some(Message::new(body, event))
}

/// Strip the leading quoted block from a reply body.
///
/// Removes consecutive leading lines that start with `"> "` or are blank,
/// stopping at the first line that is neither. Idempotent: a body with no
/// leading quote or blank lines comes back unchanged.
pub(crate) fn strip_reply_quote(body: &str) -> String {
    body.lines()
        .skip_while(|line| line.starts_with(QUOTE_PREFIX) || line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
