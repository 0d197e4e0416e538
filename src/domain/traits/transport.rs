//! Transport trait - abstraction over the underlying protocol client

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::TransportEvent;

/// Presence state as reported by the protocol client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Online,
    Offline,
    Unavailable,
}

impl PresenceState {
    pub fn as_str(&self) -> &str {
        match self {
            PresenceState::Online => "online",
            PresenceState::Offline => "offline",
            PresenceState::Unavailable => "unavailable",
        }
    }
}

/// Chat transport trait - the protocol client seen from the dispatch layer.
///
/// Connection management, sync, and storage live behind this boundary; the
/// dispatch layer only consumes join/message events and issues sends and
/// presence transitions.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Start the event loop. Events arrive on the channel from [`subscribe`].
    ///
    /// [`subscribe`]: ChatTransport::subscribe
    async fn start(&self) -> Result<(), BotError>;

    /// Stop the event loop. No events are delivered after this returns.
    async fn stop(&self) -> Result<(), BotError>;

    /// Obtain the event stream. Must be called before `start`.
    fn subscribe(&self) -> mpsc::Receiver<TransportEvent>;

    /// Send a text message to a room
    async fn send_message(&self, room: &str, text: &str) -> Result<(), BotError>;

    /// Set the bot's presence
    async fn set_presence(&self, state: PresenceState, message: Option<&str>)
        -> Result<(), BotError>;

    /// Current presence as the server sees it
    async fn presence(&self) -> Result<PresenceState, BotError>;

    /// The bot's own resolved user id
    fn user_id(&self) -> &str;
}
