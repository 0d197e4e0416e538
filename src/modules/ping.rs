//! Liveness check module

use async_trait::async_trait;

use crate::application::errors::ModuleError;
use crate::domain::entities::Message;
use crate::domain::traits::ChatTransport;

use super::{Extra, Module};

pub struct PingModule;

#[async_trait]
impl Module for PingModule {
    fn name(&self) -> &str {
        "ping"
    }

    fn help(&self) -> Option<&str> {
        Some("!ping - check that the bot is alive")
    }

    async fn handle(
        &self,
        client: &dyn ChatTransport,
        message: &Message,
        _extra: Extra,
    ) -> Result<(), ModuleError> {
        if message.body() != "!ping" {
            return Ok(());
        }
        client
            .send_message(message.room(), "pong!")
            .await
            .map_err(|e| ModuleError::ExecutionFailed(e.to_string()))
    }
}
