// Bulk export of the declarative command schema as guild slash commands.

use crate::core::commands::{ArgumentKind, ArgumentSpec, ChoiceValue, CommandSchema};
use poise::serenity_prelude as serenity;

fn option_type(kind: ArgumentKind) -> serenity::CommandOptionType {
    match kind {
        ArgumentKind::Text => serenity::CommandOptionType::String,
        ArgumentKind::Boolean => serenity::CommandOptionType::Boolean,
        ArgumentKind::Channel => serenity::CommandOptionType::Channel,
        ArgumentKind::Integer => serenity::CommandOptionType::Integer,
        ArgumentKind::Number => serenity::CommandOptionType::Number,
        ArgumentKind::Mentionable => serenity::CommandOptionType::Mentionable,
        ArgumentKind::Role => serenity::CommandOptionType::Role,
        ArgumentKind::User => serenity::CommandOptionType::User,
    }
}

fn create_option(spec: &ArgumentSpec) -> serenity::CreateCommandOption {
    let mut option =
        serenity::CreateCommandOption::new(option_type(spec.kind), &spec.name, &spec.description)
            .required(spec.required);
    for choice in &spec.choices {
        option = match &choice.value {
            ChoiceValue::Text(value) => option.add_string_choice(&choice.name, value),
            ChoiceValue::Integer(value) => match i32::try_from(*value) {
                Ok(value) => option.add_int_choice(&choice.name, value),
                Err(_) => {
                    tracing::warn!(option = %spec.name, "Skipping out-of-range choice {}", value);
                    option
                }
            },
        };
    }
    option
}

pub fn create_command(schema: &CommandSchema) -> serenity::CreateCommand {
    serenity::CreateCommand::new(&schema.name)
        .description(&schema.description)
        .set_options(schema.options.iter().map(create_option).collect())
}

/// Replace the guild's slash commands with `schemas`. Returns how many were set.
pub async fn export(
    http: &serenity::Http,
    guild_id: u64,
    schemas: &[CommandSchema],
) -> Result<usize, serenity::Error> {
    let commands = schemas.iter().map(create_command).collect();
    let registered = serenity::GuildId::new(guild_id)
        .set_commands(http, commands)
        .await?;
    tracing::info!(guild_id, "Exported {} slash commands", registered.len());
    Ok(registered.len())
}
