//! Infrastructure layer - config, persistence, adapters

pub mod adapters;
pub mod config;
pub mod settings;
