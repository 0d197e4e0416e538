//! Settings store trait - per-room module enablement

use async_trait::async_trait;

use crate::application::errors::StorageError;

/// Per-room, per-module enable/disable persistence.
///
/// Absence of a stored value means enabled; the `admin` module bypasses this
/// gate entirely (see the dispatcher).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn is_module_enabled(&self, room: &str, module: &str) -> Result<bool, StorageError>;

    async fn set_module_enabled(
        &self,
        room: &str,
        module: &str,
        enabled: bool,
    ) -> Result<(), StorageError>;
}
