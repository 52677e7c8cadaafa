// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (user stores, content APIs)
// - `discord/` = Discord-specific adapters (commands, gateway)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Hand every gateway event to the core routers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::bot::Bot;
use crate::core::dispatch::MessageRouter;
use crate::core::events::standard_events;
use crate::discord::gateway::{events, interactions, schema_export, SerenityPlatform};
use crate::discord::{Data, Error, Settings};
use crate::infra::lifestyle::{OpenWeatherClient, WikipediaClient};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Every gateway event goes through here. Slash commands are answered
/// directly; everything else is translated and handed to the event router.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Bot<Data>, Error>,
    bot: &Bot<Data>,
) -> Result<(), Error> {
    let platform = SerenityPlatform::new(ctx, framework.shard_manager());

    if let serenity::FullEvent::InteractionCreate {
        interaction: serenity::Interaction::Command(command),
    } = event
    {
        return interactions::handle_command(&ctx.http, bot, &platform, command).await;
    }

    if let Some(event) = events::translate(event) {
        bot.handle(&platform, &event).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env().context("Invalid configuration")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let store = infra::profiles::connect(&config.store_url).await?;

    if config.openweather_key.is_none() {
        tracing::warn!("OPENWEATHERMAP_API_KEY is not set; weather lookups are disabled");
    }
    let weather = OpenWeatherClient::new(config.openweather_key.clone())
        .context("Failed to create OpenWeatherMap client")?;
    let wiki = WikipediaClient::new().context("Failed to create Wikipedia client")?;

    let data = Data::new(
        store,
        config.xp.clone(),
        Arc::new(weather),
        Arc::new(wiki),
        Settings {
            moderator_role: config.moderator_role,
            exempt_user: config.exempt_user,
            ..Settings::default()
        },
    );

    let commands = discord::commands::build_registry().context("Invalid command catalog")?;
    let listeners = standard_events().context("Invalid event bindings")?;
    let bot = Bot::new(data, MessageRouter::new(commands, config.prefix), listeners);

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Poise only supplies the gateway plumbing here; commands live in our own
    // registry so prefix and slash invocations share one code path.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let schemas = bot.messages().commands().schemas();
    let guild_id = config.guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: Vec::new(),
            event_handler: |ctx, event, framework, bot| {
                Box::pin(event_handler(ctx, event, framework, bot))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, _framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");
                schema_export::export(&ctx.http, guild_id, &schemas).await?;
                Ok(bot)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    if let Err(e) = client.start().await {
        tracing::error!("Client stopped: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
