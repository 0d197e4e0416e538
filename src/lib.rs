//! parley-bot - a command-dispatch layer on top of a chat-protocol client
//!
//! Inbound room events are filtered by the normalizer (replay, self-authored,
//! non-text, reply quotes), then fanned out to the registered capability
//! modules, gated per room by the settings store. The protocol client itself
//! lives behind the [`domain::traits::ChatTransport`] seam.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod modules;
