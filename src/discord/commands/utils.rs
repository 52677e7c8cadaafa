// Utility commands: help, ping and clear.

use crate::core::commands::arguments;
use crate::core::dispatch::{BoxFuture, Error, Reply};
use crate::discord::data::Context;
use crate::discord::responses::{card, respond, UTILS};

/// Most messages `clear` removes in one go, on top of the command itself.
const CLEAR_LIMIT: i64 = 99;

const NO_PERMISSION: &str = "You do not have sufficient permissions to do that";

/// List every guild command, or describe one.
pub fn help(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        if let Some(name) = ctx.arg(0) {
            let name = name.trim_start_matches(ctx.prefix);
            let Some(command) = ctx
                .commands
                .resolve(name)
                .filter(|command| command.scope().allows_guild())
            else {
                return Ok(respond(&ctx, "Help", UTILS, "Command not found"));
            };

            let aliases = command.names()[1..]
                .iter()
                .map(|alias| format!("`{}`", alias))
                .collect::<Vec<_>>();
            let embed = card(&ctx, UTILS)
                .title(format!("{}{}", ctx.prefix, command.name()))
                .field("Description", command.description(), false)
                .field(
                    "Aliases",
                    if aliases.is_empty() {
                        "None".to_string()
                    } else {
                        aliases.join(", ")
                    },
                    false,
                )
                .field(
                    "Usage",
                    format!("`{}{}`", ctx.prefix, command.usage()),
                    false,
                );
            return Ok(embed.into());
        }

        let listing = ctx
            .commands
            .iter()
            .filter(|command| command.scope().allows_guild())
            .map(|command| format!("`{}{}` {}", ctx.prefix, command.name(), command.description()))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(respond(&ctx, "Commands", UTILS, listing))
    })
}

pub fn ping(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let millis = ctx
            .platform
            .latency()
            .await
            .map(|latency| latency.as_millis())
            .unwrap_or(0);
        Ok(respond(
            &ctx,
            "Ping",
            UTILS,
            format!("Websocket latency is `{}ms`", millis),
        ))
    })
}

/// Bulk-delete recent messages. Moderators only.
pub fn clear(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let guild_id = ctx.guild_id()?;
        let Some(role_id) = ctx.data.settings.moderator_role else {
            return Ok(respond(&ctx, "Clear", UTILS, NO_PERMISSION));
        };
        if !ctx
            .platform
            .outranks_role(guild_id, ctx.author().id, role_id)
            .await?
        {
            return Ok(respond(&ctx, "Clear", UTILS, NO_PERMISSION));
        }

        let count = match arguments::integer(ctx.arg(0)) {
            Ok(count) if (1..=CLEAR_LIMIT).contains(&count) => count as u8,
            _ => {
                return Ok(respond(
                    &ctx,
                    "Clear",
                    UTILS,
                    "Please specify a number in between 1 and 99",
                ))
            }
        };

        // The invoking message goes too.
        let deleted = ctx
            .platform
            .delete_recent_messages(ctx.message.channel_id, count + 1)
            .await?;
        tracing::info!(
            user_id = ctx.author().id,
            channel_id = ctx.message.channel_id,
            "Cleared {} messages",
            deleted
        );

        Ok(respond(
            &ctx,
            "Clear",
            UTILS,
            format!("Cleared {} messages", deleted.saturating_sub(1)),
        ))
    })
}
