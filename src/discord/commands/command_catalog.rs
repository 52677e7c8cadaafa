// Discord commands module.
// Each feature gets its own command file; this file declares every command
// and its typed options in one place.

pub mod economy;
pub mod gambling;
pub mod leveling;
pub mod lifestyle;
pub mod social;
pub mod utils;

use crate::core::commands::{CommandBuilder, CommandRegistry, CommandScope, RegistrationError};
use crate::discord::data::Data;

/// Every command the bot answers to, with its slash-command options.
pub fn build_registry() -> Result<CommandRegistry<Data>, RegistrationError> {
    let mut registry = CommandRegistry::new();

    // ========================================================================
    // UTILS
    // ========================================================================

    registry.register(
        CommandBuilder::new("help", utils::help)
            .description("List commands or describe one")
            .usage("help [command]"),
    )?;
    registry.add_argument("help", "command", "string", "Command to describe", false, &[])?;

    registry.register(
        CommandBuilder::new("ping", utils::ping)
            .description("Show the websocket latency")
            .usage("ping")
            .scope(CommandScope::Anywhere),
    )?;

    registry.register(
        CommandBuilder::new("clear", utils::clear)
            .description("Delete recent messages in this channel")
            .usage("clear <1-99>"),
    )?;
    registry.add_argument("clear", "count", "integer", "How many messages to delete", true, &[])?;

    // ========================================================================
    // LIFESTYLE
    // ========================================================================

    registry.register(
        CommandBuilder::new("weather", lifestyle::weather)
            .description("Current weather for a location")
            .usage("weather <location>"),
    )?;
    registry.add_argument("weather", "location", "string", "City or place name", true, &[])?;

    registry.register(
        CommandBuilder::new("wiki", lifestyle::wiki)
            .description("Look something up on Wikipedia")
            .usage("wiki <term>"),
    )?;
    registry.add_argument("wiki", "term", "string", "What to look up", true, &[])?;

    // ========================================================================
    // SOCIAL
    // ========================================================================

    registry.register(
        CommandBuilder::new("profile", social::profile)
            .alias("pf")
            .description("Show your profile card or change its colour")
            .usage("profile [color <#hex>]"),
    )?;
    registry.add_argument(
        "profile",
        "action",
        "string",
        "What to change",
        false,
        &[("color", "color")],
    )?;
    registry.add_argument("profile", "value", "string", "New colour, e.g. #ff8800", false, &[])?;

    registry.register(
        CommandBuilder::new("rep", social::rep)
            .description("Give a member a reputation point")
            .usage("rep <@user>"),
    )?;
    registry.add_argument("rep", "user", "user", "Member to rep", true, &[])?;

    registry.register(
        CommandBuilder::new("unrep", social::unrep)
            .description("Take a reputation point from a member")
            .usage("unrep <@user>"),
    )?;
    registry.add_argument("unrep", "user", "user", "Member to unrep", true, &[])?;

    registry.register(
        CommandBuilder::new("match", social::matchmake)
            .description("See how well two members match")
            .usage("match <@user> [@user]"),
    )?;
    registry.add_argument("match", "first", "user", "First member", true, &[])?;
    registry.add_argument("match", "second", "user", "Second member, defaults to you", false, &[])?;

    // ========================================================================
    // ECONOMY & GAMBLING
    // ========================================================================

    registry.register(
        CommandBuilder::new("transfer", economy::transfer)
            .alias("tf")
            .description("Send money to another member")
            .usage("transfer <@user> <amount|half|all>"),
    )?;
    registry.add_argument("transfer", "user", "user", "Recipient", true, &[])?;
    registry.add_argument("transfer", "amount", "string", "Amount, half or all", true, &[])?;

    registry.register(
        CommandBuilder::new("coinflip", gambling::coinflip)
            .alias("cf")
            .description("Bet on a coin flip")
            .usage("coinflip <h/t> <amount|half|all>"),
    )?;
    registry.add_argument(
        "coinflip",
        "side",
        "string",
        "Heads or tails",
        true,
        &[("Heads", "heads"), ("Tails", "tails")],
    )?;
    registry.add_argument("coinflip", "amount", "string", "Amount, half or all", true, &[])?;

    registry.register(
        CommandBuilder::new("rockpaperscissors", gambling::rock_paper_scissors)
            .alias("rps")
            .description("Bet on a game of rock paper scissors")
            .usage("rockpaperscissors <r/p/s> <amount|half|all>"),
    )?;
    registry.add_argument(
        "rockpaperscissors",
        "hand",
        "string",
        "Your hand",
        true,
        &[("Rock", "rock"), ("Paper", "paper"), ("Scissors", "scissors")],
    )?;
    registry.add_argument("rockpaperscissors", "amount", "string", "Amount, half or all", true, &[])?;

    // ========================================================================
    // LEVELING
    // ========================================================================

    registry.register(
        CommandBuilder::new("level", leveling::level)
            .alias("lvl")
            .description("Show a level and the XP to the next one")
            .usage("level [@user]"),
    )?;
    registry.add_argument("level", "user", "user", "Member to check, defaults to you", false, &[])?;

    Ok(registry)
}
