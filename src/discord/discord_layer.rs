// Discord layer - command handlers, response formatting and the serenity
// adapters that feed the core routers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "gateway/gateway_adapter.rs"]
pub mod gateway;

pub mod data;
pub mod responses;

// Re-export command types for convenience
pub use crate::core::dispatch::Error;
pub use data::{Data, Settings};
