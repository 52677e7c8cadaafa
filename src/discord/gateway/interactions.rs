// Slash-command interactions go through the same registry and handlers as
// prefix commands. Options become positional arguments in schema order.

use super::events::chat_user;
use super::render;
use crate::core::bot::Bot;
use crate::core::commands::{ArgumentSpec, CommandDescriptor};
use crate::core::dispatch::{ChatPlatform, Error, Execution, InboundMessage, Reply};
use crate::discord::data::Data;
use poise::serenity_prelude as serenity;

/// Render one option value the way a user would have typed it.
fn option_text(value: &serenity::CommandDataOptionValue) -> Option<String> {
    use serenity::CommandDataOptionValue as Value;
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Integer(number) => Some(number.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Boolean(flag) => Some(flag.to_string()),
        Value::User(id) => Some(format!("<@{}>", id)),
        Value::Role(id) => Some(format!("<@&{}>", id)),
        Value::Channel(id) => Some(format!("<#{}>", id)),
        Value::Mentionable(id) => Some(format!("<@{}>", id)),
        _ => None,
    }
}

/// Positional arguments in declaration order. Skipped optional options in the
/// middle become empty strings so later ones keep their position.
pub fn positional_args(
    specs: &[ArgumentSpec],
    options: &[serenity::CommandDataOption],
    roles: &[u64],
) -> Vec<String> {
    let mut args: Vec<String> = specs
        .iter()
        .map(|spec| {
            options
                .iter()
                .find(|option| option.name == spec.name)
                .and_then(|option| option_text(&option.value))
                .map(|text| fix_role_mention(text, roles))
                .unwrap_or_default()
        })
        .collect();
    while args.last().is_some_and(String::is_empty) {
        args.pop();
    }
    args
}

/// Mentionable options carry a bare id; the resolved data says whether it was a role.
fn fix_role_mention(text: String, roles: &[u64]) -> String {
    let is_role = text
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|id| id.parse::<u64>().ok())
        .is_some_and(|id| roles.contains(&id));
    if is_role {
        text.replacen("<@", "<@&", 1)
    } else {
        text
    }
}

fn inbound_message(command: &serenity::CommandInteraction, args: &[String]) -> InboundMessage {
    let resolved = &command.data.resolved;
    InboundMessage {
        id: command.id.get(),
        channel_id: command.channel_id.get(),
        guild_id: command.guild_id.map(|id| id.get()),
        author: chat_user(&command.user),
        content: format!("/{} {}", command.data.name, args.join(" ")),
        mentions: resolved.users.values().map(chat_user).collect(),
        mentioned_roles: resolved.roles.keys().map(|id| id.get()).collect(),
    }
}

/// Replies that can be given before running anything. These stay ephemeral.
fn early_reply(
    descriptor: Option<&CommandDescriptor<Data>>,
    in_guild: bool,
) -> Option<&'static str> {
    let Some(descriptor) = descriptor else {
        return Some(UNRESOLVED_REPLY);
    };
    let allowed = if in_guild {
        descriptor.scope().allows_guild()
    } else {
        descriptor.scope().allows_direct()
    };
    (!allowed).then_some(WRONG_SCOPE_REPLY)
}

const UNRESOLVED_REPLY: &str = "Command not found";
const WRONG_SCOPE_REPLY: &str = "That command is not available here";

/// Answer a slash command. Discord wants an acknowledgement within three
/// seconds, so the interaction is deferred before the handler runs and the
/// reply is edited in afterwards.
pub async fn handle_command(
    http: &serenity::Http,
    bot: &Bot<Data>,
    platform: &dyn ChatPlatform,
    command: &serenity::CommandInteraction,
) -> Result<(), Error> {
    let name = command.data.name.as_str();
    let descriptor = bot.messages().commands().resolve(name);
    if let Some(text) = early_reply(descriptor, command.guild_id.is_some()) {
        command.create_response(http, render::ephemeral(text)).await?;
        return Ok(());
    }

    command.defer(http).await?;

    let specs = descriptor
        .map(|descriptor| descriptor.arguments().to_vec())
        .unwrap_or_default();
    let roles: Vec<u64> = command.data.resolved.roles.keys().map(|id| id.get()).collect();
    let args = positional_args(&specs, &command.data.options, &roles);
    let message = inbound_message(command, &args);

    let reply = match bot
        .messages()
        .execute(bot.data(), platform, &message, name, args)
        .await
    {
        Execution::Replied { reply, .. } => reply,
        Execution::Unresolved => Reply::text(UNRESOLVED_REPLY),
        Execution::WrongScope => Reply::text(WRONG_SCOPE_REPLY),
    };

    command
        .edit_response(http, render::deferred_reply(reply))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::ArgumentKind;

    #[test]
    fn mentionable_roles_keep_their_sigil() {
        assert_eq!(fix_role_mention("<@5>".to_string(), &[5]), "<@&5>");
        assert_eq!(fix_role_mention("<@6>".to_string(), &[5]), "<@6>");
        assert_eq!(fix_role_mention("heads".to_string(), &[5]), "heads");
    }

    #[test]
    fn positional_args_follow_declaration_order() {
        let specs = vec![
            ArgumentSpec {
                name: "user".into(),
                kind: ArgumentKind::User,
                description: String::new(),
                required: true,
                choices: Vec::new(),
            },
            ArgumentSpec {
                name: "amount".into(),
                kind: ArgumentKind::Text,
                description: String::new(),
                required: false,
                choices: Vec::new(),
            },
        ];
        let options: Vec<serenity::CommandDataOption> = serde_json::from_value(serde_json::json!([
            {"name": "amount", "type": 3, "value": "all"},
            {"name": "user", "type": 6, "value": "42"}
        ]))
        .unwrap();

        assert_eq!(positional_args(&specs, &options, &[]), vec!["<@42>", "all"]);
        assert_eq!(positional_args(&specs, &options[1..], &[]), vec!["<@42>"]);
    }

    #[test]
    fn only_unknown_or_misplaced_commands_answer_before_deferring() {
        let registry = crate::discord::commands::build_registry().unwrap();

        assert_eq!(
            early_reply(registry.resolve("nope"), true),
            Some(UNRESOLVED_REPLY)
        );
        assert_eq!(
            early_reply(registry.resolve("transfer"), false),
            Some(WRONG_SCOPE_REPLY)
        );
        assert_eq!(early_reply(registry.resolve("transfer"), true), None);
        assert_eq!(early_reply(registry.resolve("ping"), false), None);
    }
}
