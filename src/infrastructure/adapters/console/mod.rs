//! Console transport for development/testing
//!
//! Turns stdin lines into room message events in a fixed local room and
//! prints outgoing messages to stdout, so the full pipeline runs without a
//! real protocol client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::application::lifecycle::now_ms;
use crate::domain::entities::{EventContent, RoomEvent, TransportEvent};
use crate::domain::traits::{ChatTransport, PresenceState};

const CONSOLE_ROOM: &str = "#console";
const CONSOLE_SENDER: &str = "@console:local";

pub struct ConsoleTransport {
    user_id: String,
    running: Arc<AtomicBool>,
    sender: mpsc::Sender<TransportEvent>,
    receiver: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
    presence: Mutex<PresenceState>,
}

impl ConsoleTransport {
    pub fn new(user_id: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            user_id: user_id.into(),
            running: Arc::new(AtomicBool::new(false)),
            sender,
            receiver: Mutex::new(Some(receiver)),
            presence: Mutex::new(PresenceState::Offline),
        }
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console transport (dev mode)");
        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        // We join the console room as soon as the loop starts.
        sender
            .send(TransportEvent::RoomJoin {
                room: CONSOLE_ROOM.to_string(),
            })
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let running = self.running.clone();
        tokio::task::spawn_blocking(move || {
            use std::io::BufRead;
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(line) = line else { break };
                let event = RoomEvent::new(
                    CONSOLE_ROOM,
                    CONSOLE_SENDER,
                    now_ms(),
                    EventContent::text(line),
                );
                if sender
                    .blocking_send(TransportEvent::RoomMessage { event })
                    .is_err()
                {
                    break;
                }
            }
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), BotError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<TransportEvent> {
        // Single consumer; a second subscriber gets a closed channel.
        self.receiver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .unwrap_or_else(|| mpsc::channel(1).1)
    }

    async fn send_message(&self, room: &str, text: &str) -> Result<(), BotError> {
        println!("[{}] {}", room, text);
        Ok(())
    }

    async fn set_presence(
        &self,
        state: PresenceState,
        _message: Option<&str>,
    ) -> Result<(), BotError> {
        *self.presence.lock().unwrap_or_else(|e| e.into_inner()) = state;
        Ok(())
    }

    async fn presence(&self) -> Result<PresenceState, BotError> {
        Ok(*self.presence.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}
