// The event router.
//
// Each event kind has at most one listener, bound explicitly at startup. A
// second binding for the same kind is a registration error rather than a
// silent overwrite.

use crate::core::commands::RegistrationError;
use crate::core::dispatch::{BoxFuture, ChatPlatform, Error, InboundMessage, MessageRouter};
use std::fmt;

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Message,
    VoiceStateUpdate,
    ConnectionStateChanged,
}

impl EventKind {
    /// Normalized event-type name, lower camel case.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::Message => "message",
            EventKind::VoiceStateUpdate => "voiceStateUpdate",
            EventKind::ConnectionStateChanged => "connectionStateChanged",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member's voice state after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoicePresence {
    pub user_id: u64,
    pub in_channel: bool,
    /// Server or self mute.
    pub muted: bool,
    /// Server or self deafen.
    pub deafened: bool,
}

impl VoicePresence {
    /// Present and neither muted nor deafened.
    pub fn eligible(&self) -> bool {
        self.in_channel && !self.muted && !self.deafened
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Resumed,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Resumed => "resumed",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    Ready { user_name: String, guilds: usize },
    Message(InboundMessage),
    VoiceStateUpdate(VoicePresence),
    ConnectionStateChanged(ConnectionState),
}

impl BotEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BotEvent::Ready { .. } => EventKind::Ready,
            BotEvent::Message(_) => EventKind::Message,
            BotEvent::VoiceStateUpdate(_) => EventKind::VoiceStateUpdate,
            BotEvent::ConnectionStateChanged(_) => EventKind::ConnectionStateChanged,
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub struct EventContext<'a, D> {
    pub data: &'a D,
    pub messages: &'a MessageRouter<D>,
    pub platform: &'a dyn ChatPlatform,
    pub event: &'a BotEvent,
}

pub type EventAction<D> = for<'a> fn(EventContext<'a, D>) -> BoxFuture<'a, Result<(), Error>>;

pub struct EventRouter<D> {
    bindings: Vec<(EventKind, EventAction<D>)>,
}

impl<D> Default for EventRouter<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> EventRouter<D> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn on(mut self, kind: EventKind, action: EventAction<D>) -> Result<Self, RegistrationError> {
        if self.is_bound(kind) {
            return Err(RegistrationError::DuplicateEvent(kind.as_str()));
        }
        self.bindings.push((kind, action));
        Ok(self)
    }

    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.bindings.iter().any(|(bound, _)| *bound == kind)
    }

    /// Bound event kinds in binding order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.bindings.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn log_bindings(&self) {
        let names: Vec<&str> = self.bindings.iter().map(|(kind, _)| kind.as_str()).collect();
        tracing::info!(
            "Registered {} event listeners: {}",
            names.len(),
            names.join(", ")
        );
    }

    /// Run the listener bound to the event's kind, if any. Listener errors are
    /// logged here and go no further.
    pub async fn dispatch(&self, ctx: EventContext<'_, D>) -> bool {
        let kind = ctx.event.kind();
        let Some((_, action)) = self.bindings.iter().find(|(bound, _)| *bound == kind) else {
            tracing::debug!(event = kind.as_str(), "No listener bound");
            return false;
        };

        if let Err(e) = action(ctx).await {
            tracing::error!(event = kind.as_str(), "Event listener failed: {}", e);
        }
        true
    }
}
