// Message routing.
//
// Two states, decided per message by where it came from:
//
// - Guild message: bots are skipped, every other author earns chat XP whether
//   or not the message is a command, and a resolved command gets the author's
//   user record.
// - Direct message: bots are skipped, no XP, no user record.
//
// An unresolved command name is not an error. The router swallows it.

use super::{ChatPlatform, CommandContext, InboundMessage, Reply};
use crate::core::commands::{parse_invocation, CommandDescriptor, CommandRegistry};
use crate::core::leveling::XpManager;
use crate::core::profiles::{UserRecord, UserStore};
use std::sync::Arc;

/// Sent to the channel when a handler returns an error.
pub const FAILURE_REPLY: &str = "Something went wrong while running that command";

/// What the router needs from the bot's shared state.
pub trait BotData: Send + Sync + 'static {
    fn store(&self) -> &dyn UserStore;
    fn xp(&self) -> &Arc<XpManager>;
}

/// How one inbound message was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    IgnoredBot,
    NotCommand,
    Unresolved,
    WrongScope,
    Dispatched { command: String },
    DeliveryFailed { command: String },
}

/// Result of running a command without delivering its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    Replied { command: String, reply: Reply },
    Unresolved,
    WrongScope,
}

pub struct MessageRouter<D> {
    commands: CommandRegistry<D>,
    prefix: char,
}

impl<D: BotData> MessageRouter<D> {
    pub fn new(commands: CommandRegistry<D>, prefix: char) -> Self {
        Self { commands, prefix }
    }

    pub fn commands(&self) -> &CommandRegistry<D> {
        &self.commands
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Route a text message and deliver the reply to its channel.
    pub async fn route(
        &self,
        data: &D,
        platform: &dyn ChatPlatform,
        message: &InboundMessage,
    ) -> RouteOutcome {
        if message.author.bot {
            return RouteOutcome::IgnoredBot;
        }

        if !message.is_direct() {
            data.xp().increase_chat_xp(message.author.id);
        }

        let Some(invocation) = parse_invocation(&message.content, self.prefix) else {
            return RouteOutcome::NotCommand;
        };

        match self
            .execute(data, platform, message, &invocation.command, invocation.args)
            .await
        {
            Execution::Unresolved => RouteOutcome::Unresolved,
            Execution::WrongScope => RouteOutcome::WrongScope,
            Execution::Replied { command, reply } => {
                match platform.send(message.channel_id, reply).await {
                    Ok(()) => RouteOutcome::Dispatched { command },
                    Err(e) => {
                        tracing::warn!(
                            channel_id = message.channel_id,
                            command = %command,
                            "Failed to deliver reply: {}",
                            e
                        );
                        RouteOutcome::DeliveryFailed { command }
                    }
                }
            }
        }
    }

    /// Resolve and run a command, returning the reply instead of sending it.
    ///
    /// Slash interactions come through here too: they answer with an
    /// interaction response rather than a channel message.
    pub async fn execute(
        &self,
        data: &D,
        platform: &dyn ChatPlatform,
        message: &InboundMessage,
        name: &str,
        args: Vec<String>,
    ) -> Execution {
        let Some(descriptor) = self.commands.resolve(name) else {
            tracing::debug!(command = name, "Ignoring unknown command");
            return Execution::Unresolved;
        };

        let direct = message.is_direct();
        let allowed = if direct {
            descriptor.scope().allows_direct()
        } else {
            descriptor.scope().allows_guild()
        };
        if !allowed {
            tracing::debug!(command = name, direct, "Command not available here");
            return Execution::WrongScope;
        }

        tracing::info!(
            user_id = message.author.id,
            "{} issued {} command: {} {}",
            message.author.name,
            if direct { "direct" } else { "guild" },
            name,
            args.join(" ")
        );

        let profile = if direct {
            None
        } else {
            Some(load_profile(data.store(), message.author.id).await)
        };

        let ctx = CommandContext {
            data,
            commands: &self.commands,
            platform,
            message,
            invoked_as: name.to_string(),
            args,
            profile,
            prefix: self.prefix,
        };

        Execution::Replied {
            command: descriptor.name().to_string(),
            reply: invoke(descriptor, ctx).await,
        }
    }
}

/// A store outage should not make every command unusable, so a failed read
/// falls back to the record a new user would get.
async fn load_profile(store: &dyn UserStore, user_id: u64) -> UserRecord {
    match store.fetch(user_id).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(user_id, "Failed to fetch user record: {}", e);
            UserRecord::new(user_id)
        }
    }
}

async fn invoke<'a, D>(descriptor: &CommandDescriptor<D>, ctx: CommandContext<'a, D>) -> Reply {
    match (descriptor.action())(ctx).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(command = descriptor.name(), "Command failed: {}", e);
            Reply::text(FAILURE_REPLY)
        }
    }
}
