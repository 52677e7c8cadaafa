// Lifestyle commands backed by third-party content APIs.

use crate::core::dispatch::{BoxFuture, Error, Reply};
use crate::core::lifestyle::{condition_emoji, is_plain_english, LookupError};
use crate::discord::data::Context;
use crate::discord::responses::{card, respond, usage, LIFESTYLE};

/// Current conditions for a location.
pub fn weather(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let location = ctx.rest();
        if location.is_empty() {
            return Ok(usage(&ctx, LIFESTYLE));
        }

        let report = match ctx.data.weather.current(&location).await {
            Ok(Some(report)) => report,
            Ok(None) => return Ok(respond(&ctx, "Weather", LIFESTYLE, "Location not found")),
            Err(LookupError::Unavailable) => {
                return Ok(respond(
                    &ctx,
                    "Weather",
                    LIFESTYLE,
                    "Weather lookups are not configured",
                ))
            }
            Err(e) => return Err(e.into()),
        };

        let embed = card(&ctx, LIFESTYLE)
            .description(format!("Here's the weather today in **{}**", report.location))
            .thumbnail(report.icon_url.clone())
            .field(
                "Condition",
                format!("{} {}", condition_emoji(report.condition_id), report.condition()),
                true,
            )
            .field("Humidity", format!("{}%", report.humidity), true)
            .field("Temperature", format!("{:.1}°C", report.temperature_c), true)
            .field("Feels like", format!("{:.1}°C", report.feels_like_c), true)
            .field("Wind Speed", format!("{} m/s", report.wind_speed), true)
            .field("Wind Direction", format!("{}°", report.wind_degrees), true)
            .field(
                "Sunrise",
                format!("{} ({})", report.sunrise, report.utc_offset),
                true,
            )
            .field(
                "Sunset",
                format!("{} ({})", report.sunset, report.utc_offset),
                true,
            );
        Ok(embed.into())
    })
}

/// Encyclopedia summary for a search term.
pub fn wiki(ctx: Context<'_>) -> BoxFuture<'_, Result<Reply, Error>> {
    Box::pin(async move {
        let query = ctx.rest();
        if query.is_empty() {
            return Ok(usage(&ctx, LIFESTYLE));
        }
        if !is_plain_english(&query) {
            return Ok(respond(
                &ctx,
                "Wiki",
                LIFESTYLE,
                "Only English queries are supported",
            ));
        }

        let Some(article) = ctx.data.wiki.lookup(&query).await? else {
            return Ok(respond(
                &ctx,
                "Wiki",
                LIFESTYLE,
                "An article with matching keyword cannot be found",
            ));
        };

        let mut embed = card(&ctx, LIFESTYLE).field(article.title.clone(), article.excerpt(), false);
        if let Some(image) = &article.image_url {
            embed = embed.image(image.clone());
        }
        Ok(embed.into())
    })
}
