// ChatPlatform backed by serenity's HTTP client and cache.

use super::render;
use crate::core::dispatch::{ChatPlatform, PlatformError, Reply};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
    cache: Arc<serenity::Cache>,
    shard_manager: Arc<serenity::ShardManager>,
    shard_id: serenity::ShardId,
}

impl SerenityPlatform {
    pub fn new(ctx: &serenity::Context, shard_manager: Arc<serenity::ShardManager>) -> Self {
        Self {
            http: Arc::clone(&ctx.http),
            cache: Arc::clone(&ctx.cache),
            shard_manager,
            shard_id: ctx.shard_id,
        }
    }

    /// Member role ids and the guild's role table, cache first.
    async fn roles_of(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> Result<(Vec<serenity::RoleId>, HashMap<serenity::RoleId, serenity::Role>), PlatformError>
    {
        let cached = self.cache.guild(guild_id).and_then(|guild| {
            let member = guild.members.get(&user_id)?;
            Some((member.roles.clone(), guild.roles.clone()))
        });
        if let Some(snapshot) = cached {
            return Ok(snapshot);
        }

        let member = guild_id
            .member(&self.http, user_id)
            .await
            .map_err(request_failed)?;
        let roles = guild_id.roles(&self.http).await.map_err(request_failed)?;
        Ok((member.roles, roles))
    }

    async fn highest_role(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<(Option<serenity::Role>, HashMap<serenity::RoleId, serenity::Role>), PlatformError>
    {
        let (member_roles, roles) = self.roles_of(guild(guild_id)?, user(user_id)?).await?;
        let highest = member_roles
            .iter()
            .filter_map(|id| roles.get(id))
            .max_by_key(|role| role.position)
            .cloned();
        Ok((highest, roles))
    }
}

fn request_failed(e: serenity::Error) -> PlatformError {
    PlatformError::Request(e.to_string())
}

// Serenity's id constructors panic on zero.
fn guild(id: u64) -> Result<serenity::GuildId, PlatformError> {
    (id != 0)
        .then(|| serenity::GuildId::new(id))
        .ok_or(PlatformError::InvalidId)
}

fn user(id: u64) -> Result<serenity::UserId, PlatformError> {
    (id != 0)
        .then(|| serenity::UserId::new(id))
        .ok_or(PlatformError::InvalidId)
}

fn channel(id: u64) -> Result<serenity::ChannelId, PlatformError> {
    (id != 0)
        .then(|| serenity::ChannelId::new(id))
        .ok_or(PlatformError::InvalidId)
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn send(&self, channel_id: u64, reply: Reply) -> Result<(), PlatformError> {
        channel(channel_id)?
            .send_message(&self.http, render::message(reply))
            .await
            .map_err(request_failed)?;
        Ok(())
    }

    async fn latency(&self) -> Option<Duration> {
        let runners = self.shard_manager.runners.lock().await;
        runners.get(&self.shard_id).and_then(|runner| runner.latency)
    }

    async fn outranks_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<bool, PlatformError> {
        let (highest, roles) = self.highest_role(guild_id, user_id).await?;
        let target = (role_id != 0)
            .then(|| serenity::RoleId::new(role_id))
            .and_then(|id| roles.get(&id))
            .ok_or(PlatformError::RoleNotFound(role_id))?;
        Ok(highest.is_some_and(|role| role.position > target.position))
    }

    async fn highest_role_name(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<String>, PlatformError> {
        let (highest, _) = self.highest_role(guild_id, user_id).await?;
        Ok(highest.map(|role| role.name))
    }

    async fn delete_recent_messages(
        &self,
        channel_id: u64,
        count: u8,
    ) -> Result<usize, PlatformError> {
        let channel = channel(channel_id)?;
        let messages = channel
            .messages(&self.http, serenity::GetMessages::new().limit(count))
            .await
            .map_err(request_failed)?;
        if messages.is_empty() {
            return Ok(0);
        }

        let ids: Vec<serenity::MessageId> = messages.iter().map(|message| message.id).collect();
        // Bulk delete wants at least two ids.
        if let [only] = ids.as_slice() {
            channel
                .delete_message(&self.http, *only)
                .await
                .map_err(request_failed)?;
        } else {
            channel
                .delete_messages(&self.http, &ids)
                .await
                .map_err(request_failed)?;
        }
        Ok(ids.len())
    }

    fn bot_avatar_url(&self) -> Option<String> {
        Some(self.cache.current_user().face())
    }
}
