//! Capability modules and their registry
//!
//! A module is a pluggable unit exposing a command handler, an optional
//! startup hook, and an optional help string. The registry is assembled by
//! explicit registration at startup; module order is lexical by name and is
//! the dispatch priority order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::application::errors::ModuleError;
use crate::domain::entities::Message;
use crate::domain::traits::ChatTransport;
use crate::infrastructure::config::Config;

pub mod admin;
pub mod echo;
pub mod help;
pub mod ping;

pub use admin::AdminModule;
pub use echo::EchoModule;
pub use help::HelpModule;
pub use ping::PingModule;

/// Name of the module exempt from the per-room settings gate
pub const ADMIN_MODULE: &str = "admin";

/// Help text used when a module provides none
pub const DEFAULT_HELP: &str = "No help for this module.";

/// A pluggable capability unit
#[async_trait]
pub trait Module: Send + Sync {
    /// Unique module name; doubles as the settings-gate key
    fn name(&self) -> &str;

    /// One-line help text shown by the help module
    fn help(&self) -> Option<&str> {
        None
    }

    /// Startup hook, awaited before registration completes. A failure here
    /// aborts startup; there is no partial registry.
    async fn init(&self, _config: &Config) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Handle a normalized message. Modules that are not addressed by the
    /// message simply return Ok; dispatch is broadcast, not first-match.
    async fn handle(
        &self,
        client: &dyn ChatTransport,
        message: &Message,
        extra: Extra,
    ) -> Result<(), ModuleError>;
}

/// Shared read-only configuration handed to every handler invocation.
///
/// The dispatcher clones this per invocation so one module can never leak
/// mutations into the next.
#[derive(Debug, Clone)]
pub struct Extra {
    pub handler_names: Vec<String>,
    pub help_messages: HashMap<String, String>,
    pub owner: String,
    pub log_level: String,
}

/// Ordered module list plus the shared [`Extra`], built once at startup
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
    extra: Extra,
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            modules: Vec::new(),
        }
    }

    /// Handlers in dispatch priority order
    pub fn handlers(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }
}

/// Explicit-registration builder for the module registry
pub struct RegistryBuilder {
    modules: Vec<Arc<dyn Module>>,
}

impl RegistryBuilder {
    /// Register a module. Names must be unique.
    pub fn register<M: Module + 'static>(self, module: M) -> Result<Self, ModuleError> {
        self.register_arc(Arc::new(module))
    }

    pub fn register_arc(mut self, module: Arc<dyn Module>) -> Result<Self, ModuleError> {
        let name = module.name().to_string();
        if self.modules.iter().any(|m| m.name() == name) {
            return Err(ModuleError::Duplicate(name));
        }
        self.modules.push(module);
        Ok(self)
    }

    /// Finalize the registry: order modules lexically by name, run each
    /// `init` hook in that order, and assemble the shared [`Extra`].
    pub async fn build(mut self, config: &Config) -> Result<ModuleRegistry, ModuleError> {
        self.modules.sort_by(|a, b| a.name().cmp(b.name()));

        for module in &self.modules {
            module
                .init(config)
                .await
                .map_err(|e| ModuleError::InitFailed {
                    name: module.name().to_string(),
                    reason: e.to_string(),
                })?;
            info!("Registered module: {}", module.name());
        }

        let handler_names: Vec<String> =
            self.modules.iter().map(|m| m.name().to_string()).collect();
        let help_messages = self
            .modules
            .iter()
            .map(|m| {
                (
                    m.name().to_string(),
                    m.help().unwrap_or(DEFAULT_HELP).to_string(),
                )
            })
            .collect();

        Ok(ModuleRegistry {
            modules: self.modules,
            extra: Extra {
                handler_names,
                help_messages,
                owner: config.owner.clone(),
                log_level: config.log_level.clone(),
            },
        })
    }
}

#[cfg(test)]
pub(crate) mod testsupport {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::application::errors::BotError;
    use crate::domain::entities::TransportEvent;
    use crate::domain::traits::{ChatTransport, PresenceState};

    /// Transport that records outgoing messages for assertions
    pub struct CapturingTransport {
        pub sent: Mutex<Vec<(String, String)>>,
        user_id: String,
    }

    impl CapturingTransport {
        pub fn new(user_id: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                user_id: user_id.to_string(),
            }
        }

        pub fn sent_bodies(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl ChatTransport for CapturingTransport {
        async fn start(&self) -> Result<(), BotError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), BotError> {
            Ok(())
        }
        fn subscribe(&self) -> mpsc::Receiver<TransportEvent> {
            mpsc::channel(1).1
        }
        async fn send_message(&self, room: &str, text: &str) -> Result<(), BotError> {
            self.sent
                .lock()
                .unwrap()
                .push((room.to_string(), text.to_string()));
            Ok(())
        }
        async fn set_presence(
            &self,
            _state: PresenceState,
            _message: Option<&str>,
        ) -> Result<(), BotError> {
            Ok(())
        }
        async fn presence(&self) -> Result<PresenceState, BotError> {
            Ok(PresenceState::Online)
        }
        fn user_id(&self) -> &str {
            &self.user_id
        }
    }
}
