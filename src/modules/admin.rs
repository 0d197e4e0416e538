//! Administrative module - per-room module enablement
//!
//! Exempt from the settings gate (the dispatcher never consults the store
//! for it), so administrative control can never be disabled from inside the
//! gated system.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::ModuleError;
use crate::domain::entities::Message;
use crate::domain::traits::{ChatTransport, SettingsStore};

use super::{Extra, Module, ADMIN_MODULE};

pub struct AdminModule {
    store: Arc<dyn SettingsStore>,
}

impl AdminModule {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    async fn run(&self, message: &Message, extra: &Extra) -> Result<String, ModuleError> {
        let args: Vec<&str> = message
            .body()
            .trim_start_matches("!admin")
            .split_whitespace()
            .collect();
        let room = message.room();

        match args.as_slice() {
            ["list"] | [] => {
                let mut lines = vec![format!("Modules in {}:", room)];
                for name in &extra.handler_names {
                    let state = if name == ADMIN_MODULE {
                        "always on"
                    } else if self
                        .store
                        .is_module_enabled(room, name)
                        .await
                        .map_err(|e| ModuleError::ExecutionFailed(e.to_string()))?
                    {
                        "enabled"
                    } else {
                        "disabled"
                    };
                    lines.push(format!("  {} - {}", name, state));
                }
                Ok(lines.join("\n"))
            }
            [action @ ("enable" | "disable"), name] => {
                if *name == ADMIN_MODULE {
                    return Ok("The admin module is always enabled.".to_string());
                }
                if !extra.handler_names.iter().any(|n| n == name) {
                    return Ok(format!("No module named '{}'", name));
                }
                let enabled = *action == "enable";
                self.store
                    .set_module_enabled(room, name, enabled)
                    .await
                    .map_err(|e| ModuleError::ExecutionFailed(e.to_string()))?;
                Ok(format!(
                    "Module '{}' {} in this room.",
                    name,
                    if enabled { "enabled" } else { "disabled" }
                ))
            }
            _ => Ok("Usage: !admin <list|enable|disable> [module]".to_string()),
        }
    }
}

#[async_trait]
impl Module for AdminModule {
    fn name(&self) -> &str {
        ADMIN_MODULE
    }

    fn help(&self) -> Option<&str> {
        Some("!admin <list|enable|disable> [module] - manage modules in this room (owner only)")
    }

    async fn handle(
        &self,
        client: &dyn ChatTransport,
        message: &Message,
        extra: Extra,
    ) -> Result<(), ModuleError> {
        if message.body() != "!admin" && !message.body().starts_with("!admin ") {
            return Ok(());
        }

        let reply = if message.sender() == extra.owner {
            self.run(message, &extra).await?
        } else {
            "Only the owner can manage modules.".to_string()
        };

        client
            .send_message(message.room(), &reply)
            .await
            .map_err(|e| ModuleError::ExecutionFailed(e.to_string()))
    }
}
