// Serenity adapters: the platform port, event translation, slash-command
// export and interaction dispatch.

pub mod events;
pub mod interactions;
pub mod platform;
pub mod render;
pub mod schema_export;

pub use platform::SerenityPlatform;
