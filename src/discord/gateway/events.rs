// Gateway events to core events. Anything the bot has no listener for maps
// to `None` and never reaches the event router.

use crate::core::dispatch::{ChatUser, InboundMessage};
use crate::core::events::{BotEvent, ConnectionState, VoicePresence};
use poise::serenity_prelude as serenity;

pub fn translate(event: &serenity::FullEvent) -> Option<BotEvent> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => Some(BotEvent::Ready {
            user_name: data_about_bot.user.name.clone(),
            guilds: data_about_bot.guilds.len(),
        }),
        serenity::FullEvent::Message { new_message } => {
            Some(BotEvent::Message(inbound_message(new_message)))
        }
        serenity::FullEvent::VoiceStateUpdate { new, .. } => {
            Some(BotEvent::VoiceStateUpdate(voice_presence(new)))
        }
        serenity::FullEvent::Resume { .. } => {
            Some(BotEvent::ConnectionStateChanged(ConnectionState::Resumed))
        }
        serenity::FullEvent::ShardStageUpdate { event } => Some(BotEvent::ConnectionStateChanged(
            connection_state(event.new),
        )),
        _ => None,
    }
}

pub fn chat_user(user: &serenity::User) -> ChatUser {
    ChatUser {
        id: user.id.get(),
        name: user.name.clone(),
        avatar_url: user.avatar_url(),
        bot: user.bot,
    }
}

pub fn inbound_message(message: &serenity::Message) -> InboundMessage {
    InboundMessage {
        id: message.id.get(),
        channel_id: message.channel_id.get(),
        guild_id: message.guild_id.map(|id| id.get()),
        author: chat_user(&message.author),
        content: message.content.clone(),
        mentions: message.mentions.iter().map(chat_user).collect(),
        mentioned_roles: message.mention_roles.iter().map(|id| id.get()).collect(),
    }
}

pub fn voice_presence(state: &serenity::VoiceState) -> VoicePresence {
    VoicePresence {
        user_id: state.user_id.get(),
        in_channel: state.channel_id.is_some(),
        muted: state.mute || state.self_mute,
        deafened: state.deaf || state.self_deaf,
    }
}

fn connection_state(stage: serenity::ConnectionStage) -> ConnectionState {
    match stage {
        serenity::ConnectionStage::Connected => ConnectionState::Connected,
        serenity::ConnectionStage::Disconnected => ConnectionState::Disconnected,
        _ => ConnectionState::Connecting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_stages_collapse_to_connection_states() {
        assert_eq!(
            connection_state(serenity::ConnectionStage::Handshake),
            ConnectionState::Connecting
        );
        assert_eq!(
            connection_state(serenity::ConnectionStage::Connected),
            ConnectionState::Connected
        );
        assert_eq!(
            connection_state(serenity::ConnectionStage::Disconnected),
            ConnectionState::Disconnected
        );
    }
}
