//! Echo module

use async_trait::async_trait;

use crate::application::errors::ModuleError;
use crate::domain::entities::Message;
use crate::domain::traits::ChatTransport;

use super::{Extra, Module};

pub struct EchoModule;

#[async_trait]
impl Module for EchoModule {
    fn name(&self) -> &str {
        "echo"
    }

    fn help(&self) -> Option<&str> {
        Some("!echo <text> - repeat <text> back into the room")
    }

    async fn handle(
        &self,
        client: &dyn ChatTransport,
        message: &Message,
        _extra: Extra,
    ) -> Result<(), ModuleError> {
        let Some(rest) = message.body().strip_prefix("!echo ") else {
            return Ok(());
        };
        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(());
        }
        client
            .send_message(message.room(), rest)
            .await
            .map_err(|e| ModuleError::ExecutionFailed(e.to_string()))
    }
}
