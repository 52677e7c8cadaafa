// The outbound side of the chat platform, as a port.
//
// The core only ever sends replies and asks a handful of questions about the
// guild. The serenity implementation lives in `discord::gateway::platform`.

use super::reply::Reply;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform request failed: {0}")]
    Request(String),

    #[error("Role {0} not found")]
    RoleNotFound(u64),

    #[error("Invalid platform identifier")]
    InvalidId,
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Send a reply to a channel.
    async fn send(&self, channel_id: u64, reply: Reply) -> Result<(), PlatformError>;

    /// Current websocket heartbeat latency, if the gateway has measured one yet.
    async fn latency(&self) -> Option<Duration>;

    /// Does the member's highest role sit above `role_id` in the guild hierarchy?
    async fn outranks_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<bool, PlatformError>;

    /// Name of the member's highest role, `None` when they only have @everyone.
    async fn highest_role_name(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<String>, PlatformError>;

    /// Bulk-delete up to `count` recent messages. Returns how many were removed.
    async fn delete_recent_messages(
        &self,
        channel_id: u64,
        count: u8,
    ) -> Result<usize, PlatformError>;

    /// Avatar of the bot account, used as a default thumbnail.
    fn bot_avatar_url(&self) -> Option<String>;
}
