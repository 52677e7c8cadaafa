// Core replies to serenity builders.

use crate::core::dispatch::{Embed, Reply};
use poise::serenity_prelude as serenity;

pub fn embed(embed: &Embed) -> serenity::CreateEmbed {
    let mut out = serenity::CreateEmbed::new().color(embed.color);
    if let Some(title) = &embed.title {
        out = out.title(title);
    }
    if let Some(description) = &embed.description {
        out = out.description(description);
    }
    if let Some(author) = &embed.author {
        let mut builder = serenity::CreateEmbedAuthor::new(&author.name);
        if let Some(icon) = &author.icon_url {
            builder = builder.icon_url(icon);
        }
        out = out.author(builder);
    }
    out = out.fields(
        embed
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone(), field.inline)),
    );
    if let Some(thumbnail) = &embed.thumbnail {
        out = out.thumbnail(thumbnail);
    }
    if let Some(image) = &embed.image {
        out = out.image(image);
    }
    if let Some(footer) = &embed.footer {
        out = out.footer(serenity::CreateEmbedFooter::new(footer));
    }
    if embed.timestamp {
        out = out.timestamp(serenity::Timestamp::now());
    }
    out
}

pub fn message(reply: Reply) -> serenity::CreateMessage {
    match reply {
        Reply::Text(text) => serenity::CreateMessage::new().content(text),
        Reply::Embed(e) => serenity::CreateMessage::new().embed(embed(&e)),
    }
}

/// Fills in a deferred interaction response.
pub fn deferred_reply(reply: Reply) -> serenity::EditInteractionResponse {
    match reply {
        Reply::Text(text) => serenity::EditInteractionResponse::new().content(text),
        Reply::Embed(e) => serenity::EditInteractionResponse::new().embed(embed(&e)),
    }
}

/// A short reply only the invoker sees.
pub fn ephemeral(text: &str) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(text)
            .ephemeral(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_replies_carry_text_or_embeds() {
        let text = serde_json::to_value(deferred_reply(Reply::text("Cleared 3 messages"))).unwrap();
        assert_eq!(text["content"], "Cleared 3 messages");

        let card = Embed::new().title("Weather").field("Humidity", "40%", true);
        let json = serde_json::to_value(deferred_reply(Reply::Embed(card))).unwrap();
        assert_eq!(json["embeds"][0]["title"], "Weather");
        assert_eq!(json["embeds"][0]["fields"][0]["name"], "Humidity");
        assert_eq!(json["embeds"][0]["fields"][0]["value"], "40%");
    }
}
