//! Help module - lists the installed modules and their help text

use async_trait::async_trait;

use crate::application::errors::ModuleError;
use crate::domain::entities::Message;
use crate::domain::traits::ChatTransport;

use super::{Extra, Module, DEFAULT_HELP};

pub struct HelpModule;

#[async_trait]
impl Module for HelpModule {
    fn name(&self) -> &str {
        "help"
    }

    fn help(&self) -> Option<&str> {
        Some("!help [module] - show help for all modules or one of them")
    }

    async fn handle(
        &self,
        client: &dyn ChatTransport,
        message: &Message,
        extra: Extra,
    ) -> Result<(), ModuleError> {
        let body = message.body();
        let text = if body == "!help" {
            let mut lines = vec!["Available modules:".to_string()];
            for name in &extra.handler_names {
                let help = extra
                    .help_messages
                    .get(name)
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_HELP);
                lines.push(format!("  {} - {}", name, help));
            }
            lines.join("\n")
        } else if let Some(name) = body.strip_prefix("!help ") {
            let name = name.trim();
            match extra.help_messages.get(name) {
                Some(help) => format!("{} - {}", name, help),
                None => format!("No module named '{}'", name),
            }
        } else {
            return Ok(());
        };

        client
            .send_message(message.room(), &text)
            .await
            .map_err(|e| ModuleError::ExecutionFailed(e.to_string()))
    }
}
