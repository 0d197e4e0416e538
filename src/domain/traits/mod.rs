//! Domain traits

pub mod store;
pub mod transport;

pub use store::SettingsStore;
pub use transport::{ChatTransport, PresenceState};
