// Level lookups. Unflushed XP counts, so the answer never lags the timers.

use crate::core::commands::arguments;
use crate::core::dispatch::{BoxFuture, Error, Reply};
use crate::core::leveling::LevelProgress;
use crate::discord::data::Context;
use crate::discord::responses::{mention, respond, usage, LEVELING};

/// Level and XP to the next level, for yourself or another member.
pub fn level(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let target = match ctx.arg(0) {
            None => ctx.author().id,
            Some(raw) => match arguments::user_id(Some(raw)) {
                Ok(id) => id,
                Err(_) => return Ok(usage(&ctx, LEVELING)),
            },
        };

        let stored = if target == ctx.author().id {
            ctx.profile()?.xp
        } else {
            ctx.data.store.fetch(target).await?.xp
        };
        let xp = u64::try_from(stored).unwrap_or(0) + ctx.data.xp.pending_for(target);
        let progress = LevelProgress::for_xp(xp);

        Ok(respond(
            &ctx,
            "Level",
            LEVELING,
            format!(
                "{} is level **{}** with {} XP\n{} XP to level {}",
                mention(target),
                progress.level,
                xp,
                progress.xp_to_next_level(),
                progress.level + 1
            ),
        ))
    })
}
