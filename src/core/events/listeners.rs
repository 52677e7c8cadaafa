// The bot's standard event listeners.

use super::event_router::{BotEvent, EventContext, EventKind, EventRouter};
use crate::core::commands::RegistrationError;
use crate::core::dispatch::{BotData, BoxFuture, Error, RouteOutcome};

pub fn standard_events<D: BotData>() -> Result<EventRouter<D>, RegistrationError> {
    EventRouter::new()
        .on(EventKind::Ready, on_ready::<D>)?
        .on(EventKind::Message, on_message::<D>)?
        .on(EventKind::VoiceStateUpdate, on_voice_state_update::<D>)?
        .on(EventKind::ConnectionStateChanged, on_connection_state_changed::<D>)
}

/// Ready fires again after every full reconnect; starting the timers is
/// idempotent so that is harmless.
fn on_ready<D: BotData>(ctx: EventContext<'_, D>) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async move {
        if let BotEvent::Ready { user_name, guilds } = ctx.event {
            tracing::info!(guilds = *guilds, "Logged in as {}", user_name);
        }
        ctx.data.xp().start();
        Ok(())
    })
}

fn on_message<D: BotData>(ctx: EventContext<'_, D>) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async move {
        let BotEvent::Message(message) = ctx.event else {
            return Ok(());
        };
        match ctx.messages.route(ctx.data, ctx.platform, message).await {
            RouteOutcome::DeliveryFailed { command } => {
                Err(format!("reply to `{}` could not be delivered", command).into())
            }
            _ => Ok(()),
        }
    })
}

fn on_voice_state_update<D: BotData>(
    ctx: EventContext<'_, D>,
) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async move {
        let BotEvent::VoiceStateUpdate(presence) = ctx.event else {
            return Ok(());
        };
        let xp = ctx.data.xp();
        if presence.eligible() {
            xp.set_active(presence.user_id);
        } else {
            xp.set_inactive(presence.user_id);
        }
        tracing::debug!(
            user_id = presence.user_id,
            active = presence.eligible(),
            "Voice state changed"
        );
        Ok(())
    })
}

fn on_connection_state_changed<D: BotData>(
    ctx: EventContext<'_, D>,
) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async move {
        if let BotEvent::ConnectionStateChanged(state) = ctx.event {
            tracing::info!("Gateway connection {}", state);
        }
        Ok(())
    })
}
