// The composed bot: shared state plus the two routers.

use crate::core::dispatch::{BotData, ChatPlatform, MessageRouter};
use crate::core::events::{BotEvent, EventContext, EventRouter};

pub struct Bot<D> {
    data: D,
    messages: MessageRouter<D>,
    events: EventRouter<D>,
}

impl<D: BotData> Bot<D> {
    pub fn new(data: D, messages: MessageRouter<D>, events: EventRouter<D>) -> Self {
        tracing::info!(
            "Registered {} commands: {}",
            messages.commands().len(),
            messages
                .commands()
                .iter()
                .map(|command| command.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        events.log_bindings();
        Self {
            data,
            messages,
            events,
        }
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn messages(&self) -> &MessageRouter<D> {
        &self.messages
    }

    pub fn events(&self) -> &EventRouter<D> {
        &self.events
    }

    pub async fn handle(&self, platform: &dyn ChatPlatform, event: &BotEvent) -> bool {
        self.events
            .dispatch(EventContext {
                data: &self.data,
                messages: &self.messages,
                platform,
                event,
            })
            .await
    }
}
