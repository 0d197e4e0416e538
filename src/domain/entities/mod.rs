//! Domain entities

mod event;
mod message;

pub use event::{EventContent, MessageKind, RoomEvent, TransportEvent};
pub use message::Message;
