// Response formatting shared by the command handlers.
//
// Every structured reply looks the same: the invoker as author, one titled
// field, the command category in the footer and a timestamp.

use crate::core::dispatch::{Embed, Reply};
use crate::discord::data::Context;

pub const UTILS: &str = "Utils";
pub const LIFESTYLE: &str = "Lifestyle";
pub const SOCIAL: &str = "Social";
pub const ECONOMY: &str = "Economy";
pub const GAMBLING: &str = "Gambling";
pub const LEVELING: &str = "Leveling";

/// Blank structured reply for the invoker, for handlers that add their own fields.
pub fn card(ctx: &Context<'_>, category: &str) -> Embed {
    let author = ctx.author();
    Embed::new()
        .color(ctx.data.settings.embed_color)
        .author(author.name.clone(), author.avatar_url.clone())
        .footer(category)
        .timestamp()
}

pub fn respond(ctx: &Context<'_>, title: &str, category: &str, text: impl Into<String>) -> Reply {
    card(ctx, category).field(title, text, false).into()
}

/// ``Usage: `.transfer <@user> <amount>` `` for the command being run.
pub fn usage(ctx: &Context<'_>, category: &str) -> Reply {
    let usage = ctx
        .commands
        .resolve(&ctx.invoked_as)
        .map(|command| command.usage().to_string())
        .unwrap_or_else(|| ctx.invoked_as.clone());
    respond(
        ctx,
        "Usage",
        category,
        format!("Usage: `{}{}`", ctx.prefix, usage),
    )
}

pub fn mention(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

/// `#rrggbb` to an embed colour. Falls back to `default` on anything else.
pub fn parse_color(hex: &str, default: u32) -> u32 {
    hex.strip_prefix('#')
        .filter(|digits| digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()))
        .and_then(|digits| u32::from_str_radix(digits, 16).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_colours_parse_as_hex() {
        assert_eq!(parse_color("#ff8800", 1), 0xff8800);
        assert_eq!(parse_color("#FFF", 1), 1);
        assert_eq!(parse_color("red", 1), 1);
    }
}
