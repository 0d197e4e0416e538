//! Lifecycle controller - replay suppression state and graceful shutdown

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::traits::{ChatTransport, PresenceState};

/// Wait for in-flight sends to flush after stopping the event loop
pub const DRAIN_WAIT: Duration = Duration::from_millis(1000);

/// Presence propagation is eventually consistent; poll slowly
pub const PRESENCE_POLL_INTERVAL: Duration = Duration::from_millis(11_000);

/// Upper bound on offline-presence polls so shutdown can never hang forever
pub const MAX_PRESENCE_POLLS: u32 = 16;

/// Process-wide state owned by the run loop.
///
/// Replaces module-level globals: signal handlers and the event loop share a
/// handle to this context instead of touching statics.
pub struct AppContext {
    start_time_ms: i64,
    room_joined_at: Mutex<HashMap<String, i64>>,
    shutting_down: AtomicBool,
}

impl AppContext {
    /// Capture the process start time. Must happen before subscribing to
    /// message events so no accepted event can predate it.
    pub fn new() -> Self {
        Self {
            start_time_ms: now_ms(),
            room_joined_at: Mutex::new(HashMap::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn start_time_ms(&self) -> i64 {
        self.start_time_ms
    }

    /// Record the join time for a room. Entries are never removed; the map
    /// grows monotonically for the process lifetime and is only read for
    /// timestamp comparison.
    pub fn record_join(&self, room: &str) {
        let mut joined = self.room_joined_at.lock().unwrap_or_else(|e| e.into_inner());
        joined.insert(room.to_string(), now_ms());
    }

    /// Run `f` with the join-time map held. The closure must not block.
    pub fn with_joined_at<R>(&self, f: impl FnOnce(&HashMap<String, i64>) -> R) -> R {
        let joined = self.room_joined_at.lock().unwrap_or_else(|e| e.into_inner());
        f(&joined)
    }

    /// First caller wins; later callers (repeated signals) see false and
    /// must no-op. Flipped before any awaiting step so shutdown is
    /// re-entrant-safe.
    pub fn begin_shutdown(&self) -> bool {
        !self.shutting_down.swap(true, Ordering::SeqCst)
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall-clock time in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Graceful shutdown: stop the event loop, let in-flight sends drain, go
/// offline, and wait (bounded) for the server to agree we are offline.
///
/// Idempotent under repeated signals via [`AppContext::begin_shutdown`].
pub async fn shutdown(ctx: &AppContext, transport: &dyn ChatTransport) {
    if !ctx.begin_shutdown() {
        return;
    }

    info!("Shutting down");
    if let Err(e) = transport.stop().await {
        warn!("Failed to stop transport: {}", e);
    }

    tokio::time::sleep(DRAIN_WAIT).await;

    if let Err(e) = transport.set_presence(PresenceState::Offline, None).await {
        warn!("Failed to set offline presence: {}", e);
    }

    for attempt in 1..=MAX_PRESENCE_POLLS {
        match transport.presence().await {
            Ok(PresenceState::Online) => {}
            Ok(state) => {
                info!("Presence settled to {}", state.as_str());
                return;
            }
            Err(e) => warn!("Presence poll failed: {}", e),
        }
        if attempt < MAX_PRESENCE_POLLS {
            tokio::time::sleep(PRESENCE_POLL_INTERVAL).await;
        }
    }

    // Exiting with stale presence beats an unkillable process.
    warn!("Presence never left online after {} polls, exiting anyway", MAX_PRESENCE_POLLS);
}
