// Social commands: profile cards, reputation and matchmaking.

use crate::core::commands::arguments;
use crate::core::dispatch::{BoxFuture, Error, Reply};
use crate::core::leveling::LevelProgress;
use crate::core::social::{compatibility, RepChange, SocialError};
use crate::discord::data::Context;
use crate::discord::responses::{card, mention, parse_color, respond, usage, SOCIAL};
use chrono::Utc;

/// Profile card, or `profile color <#hex>` to change its colour.
pub fn profile(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        if matches!(ctx.arg(0), Some("color" | "colour")) {
            let Some(color) = ctx.arg(1) else {
                return Ok(usage(&ctx, SOCIAL));
            };
            return match ctx.data.social.set_color(ctx.author().id, color).await {
                Ok(()) => Ok(respond(
                    &ctx,
                    "Profile",
                    SOCIAL,
                    format!("Profile colour set to `{}`", color),
                )),
                Err(SocialError::InvalidColor(_)) => Ok(usage(&ctx, SOCIAL)),
                Err(e) => Err(e.into()),
            };
        }

        let guild_id = ctx.guild_id()?;
        let record = ctx.profile()?;
        let author = ctx.author();

        let rank = match ctx.platform.highest_role_name(guild_id, author.id).await {
            Ok(name) => name.unwrap_or_else(|| "None".to_string()),
            Err(e) => {
                tracing::warn!(user_id = author.id, "Failed to look up rank: {}", e);
                "Unknown".to_string()
            }
        };
        let xp = u64::try_from(record.xp).unwrap_or(0) + ctx.data.xp.pending_for(author.id);
        let progress = LevelProgress::for_xp(xp);

        let mut embed = card(&ctx, SOCIAL)
            .color(parse_color(&record.color, ctx.data.settings.embed_color))
            .title(format!("{}'s profile", author.name))
            .field("Rank", rank, true)
            .field("Level", progress.level.to_string(), true)
            .field("Balance", format!(":dollar: {}", record.balance), true)
            .field("Total XP", xp.to_string(), true)
            .field("Reputation", record.rep.to_string(), true)
            .field(
                "Progress",
                format!(
                    "{} {}/{}",
                    progress.bar(),
                    xp,
                    progress.next_threshold
                ),
                false,
            );
        if let Some(avatar) = &author.avatar_url {
            embed = embed.thumbnail(avatar.clone());
        }
        Ok(embed.into())
    })
}

pub fn rep(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(change_rep(ctx, RepChange::Give))
}

pub fn unrep(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(change_rep(ctx, RepChange::Take))
}

async fn change_rep(ctx: Context<'_>, change: RepChange) -> Result<Reply, Error> {
    let Ok(target) = arguments::user_id(ctx.arg(0)) else {
        return Ok(usage(&ctx, SOCIAL));
    };

    let result = ctx
        .data
        .social
        .change_rep(ctx.profile()?, target, change, Utc::now())
        .await;
    let text = match result {
        Ok(()) => match change {
            RepChange::Give => format!("Gave {} a reputation point", mention(target)),
            RepChange::Take => format!("Removed a reputation point from {}", mention(target)),
        },
        Err(e @ (SocialError::AlreadyRepped | SocialError::SelfTarget(_))) => e.to_string(),
        Err(e) => return Err(e.into()),
    };
    Ok(respond(&ctx, "Reputation", SOCIAL, text))
}

/// Compatibility between two members, or between the invoker and one member.
pub fn matchmake(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let Ok(first) = arguments::user_id(ctx.arg(0)) else {
            return Ok(usage(&ctx, SOCIAL));
        };
        let second = match ctx.arg(1) {
            None => ctx.author().id,
            Some(raw) => match arguments::user_id(Some(raw)) {
                Ok(id) => id,
                Err(_) => return Ok(usage(&ctx, SOCIAL)),
            },
        };

        let result = compatibility(
            &display_name(&ctx, first),
            &display_name(&ctx, second),
            first == second,
        );

        let embed = card(&ctx, SOCIAL)
            .description("Here's what I think about this ship")
            .field("Person 1", mention(first), true)
            .field("Person 2", mention(second), true)
            .field("Match Score", format!("{}%", result.score), false)
            .field("Conclusion", result.verdict, false);
        Ok(embed.into())
    })
}

/// Username for an id the message mentioned. Bare ids hash as themselves.
fn display_name(ctx: &Context<'_>, user_id: u64) -> String {
    std::iter::once(ctx.author())
        .chain(ctx.message.mentions.iter())
        .find(|user| user.id == user_id)
        .map(|user| user.name.clone())
        .unwrap_or_else(|| user_id.to_string())
}
