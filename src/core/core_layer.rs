// The core module contains all business logic.
// Nothing in here knows about serenity or poise.

#[path = "bot.rs"]
pub mod bot;

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "dispatch/mod.rs"]
pub mod dispatch;

#[path = "events/mod.rs"]
pub mod events;

#[path = "leveling/mod.rs"]
pub mod leveling;

#[path = "profiles/mod.rs"]
pub mod profiles;

#[path = "economy/economy_service.rs"]
pub mod economy;

#[path = "gambling/games.rs"]
pub mod gambling;

#[path = "social/social_service.rs"]
pub mod social;

#[path = "lifestyle/mod.rs"]
pub mod lifestyle;

#[cfg(test)]
#[path = "testing.rs"]
pub mod testing;
