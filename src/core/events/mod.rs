// Gateway events in platform-neutral form, and the router that binds them.

pub mod event_router;
pub mod listeners;

pub use event_router::{
    BotEvent, ConnectionState, EventAction, EventContext, EventKind, EventRouter, VoicePresence,
};
pub use listeners::standard_events;
