// Declarative command schema. This is what gets exported in bulk to the
// platform's structured-command endpoint at startup.

use super::registry::RegistrationError;
use serde::Serialize;
use std::fmt;

/// The fixed set of argument types a command may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Text,
    Boolean,
    Channel,
    Integer,
    Number,
    Mentionable,
    Role,
    User,
}

impl ArgumentKind {
    /// Parse a declared type name. Unknown names are a registration error.
    pub fn parse(type_name: &str) -> Result<Self, RegistrationError> {
        match type_name {
            "string" | "text" => Ok(ArgumentKind::Text),
            "boolean" => Ok(ArgumentKind::Boolean),
            "channel" => Ok(ArgumentKind::Channel),
            "integer" => Ok(ArgumentKind::Integer),
            "number" => Ok(ArgumentKind::Number),
            "mention" | "mentionable" => Ok(ArgumentKind::Mentionable),
            "role" => Ok(ArgumentKind::Role),
            "user" => Ok(ArgumentKind::User),
            other => Err(RegistrationError::UnknownArgumentType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentKind::Text => "text",
            ArgumentKind::Boolean => "boolean",
            ArgumentKind::Channel => "channel",
            ArgumentKind::Integer => "integer",
            ArgumentKind::Number => "number",
            ArgumentKind::Mentionable => "mentionable",
            ArgumentKind::Role => "role",
            ArgumentKind::User => "user",
        }
    }

    /// Only text and whole-number options may carry an enumerated choice list.
    pub fn supports_choices(&self) -> bool {
        matches!(self, ArgumentKind::Text | ArgumentKind::Integer)
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: ChoiceValue,
}

/// One typed, positional argument of a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentSpec {
    pub name: String,
    pub kind: ArgumentKind,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

/// Name, description and typed option list of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    pub options: Vec<ArgumentSpec>,
}

impl CommandSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_type_names_are_accepted() {
        assert_eq!(ArgumentKind::parse("string").unwrap(), ArgumentKind::Text);
        assert_eq!(
            ArgumentKind::parse("mention").unwrap(),
            ArgumentKind::Mentionable
        );
        assert_eq!(ArgumentKind::parse("user").unwrap(), ArgumentKind::User);
    }

    #[test]
    fn unknown_type_names_are_rejected() {
        assert_eq!(
            ArgumentKind::parse("attachment"),
            Err(RegistrationError::UnknownArgumentType(
                "attachment".to_string()
            ))
        );
    }

    #[test]
    fn schema_serializes_to_plain_json() {
        let mut schema = CommandSchema::new("coinflip", "Play a game of coinflip");
        schema.options.push(ArgumentSpec {
            name: "side".into(),
            kind: ArgumentKind::Text,
            description: "heads or tails".into(),
            required: true,
            choices: vec![OptionChoice {
                name: "Heads".into(),
                value: ChoiceValue::Text("heads".into()),
            }],
        });

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["options"][0]["kind"], "text");
        assert_eq!(json["options"][0]["choices"][0]["value"], "heads");
    }
}
