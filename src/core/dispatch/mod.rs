// Message dispatch: everything between "a message arrived" and "a reply went out".
//
// The types here are deliberately free of serenity types so the whole routing
// state machine can be exercised in tests with a recording platform.

pub mod inbound;
pub mod message_router;
pub mod platform;
pub mod reply;

use crate::core::commands::CommandRegistry;
use crate::core::profiles::UserRecord;
use std::future::Future;
use std::pin::Pin;

pub use inbound::{ChatUser, InboundMessage};
pub use message_router::{BotData, Execution, MessageRouter, RouteOutcome};
pub use platform::{ChatPlatform, PlatformError};
pub use reply::{Embed, EmbedField, Reply};

/// Boxed error used by command and event handlers, same shape poise uses.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A pinned, boxed, sendable future. Handlers are plain function pointers that
/// return one of these so the registry never needs reflection or trait objects.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Signature every command handler has.
pub type CommandAction<D> = for<'a> fn(CommandContext<'a, D>) -> BoxFuture<'a, Result<Reply, Error>>;

/// Everything a command handler can see while it runs.
pub struct CommandContext<'a, D> {
    pub data: &'a D,
    pub commands: &'a CommandRegistry<D>,
    pub platform: &'a dyn ChatPlatform,
    pub message: &'a InboundMessage,
    /// The alias the user actually typed.
    pub invoked_as: String,
    /// Whitespace-delimited positional arguments, uncoerced.
    pub args: Vec<String>,
    /// Author's record. Only fetched for guild invocations.
    pub profile: Option<UserRecord>,
    pub prefix: char,
}

impl<'a, D> CommandContext<'a, D> {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// All arguments joined back together, for free-text commands like `weather`.
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }

    pub fn author(&self) -> &ChatUser {
        &self.message.author
    }

    pub fn guild_id(&self) -> Result<u64, Error> {
        self.message
            .guild_id
            .ok_or_else(|| "This command only works in servers".into())
    }

    pub fn profile(&self) -> Result<&UserRecord, Error> {
        self.profile
            .as_ref()
            .ok_or_else(|| "No user record was loaded for this invocation".into())
    }
}
