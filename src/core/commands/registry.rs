// The command registry.
//
// Commands are declared explicitly at composition time with a builder; there is
// no name-based discovery. Every alias of a command points at the same
// descriptor, and arguments can only be added to commands that already exist.

use super::schema::{ArgumentKind, ArgumentSpec, ChoiceValue, CommandSchema, OptionChoice};
use crate::core::dispatch::CommandAction;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Startup-time registration failures. Any of these aborts startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Command name `{0}` is empty or contains whitespace")]
    InvalidName(String),

    #[error("`{0}` is already registered")]
    DuplicateCommand(String),

    #[error("Cannot add argument `{argument}` to unregistered command `{command}`")]
    UnknownCommand { command: String, argument: String },

    #[error("Type `{0}` is not a valid type for options")]
    UnknownArgumentType(String),

    #[error("Argument `{argument}` of type {kind} does not support choices")]
    ChoicesNotSupported {
        argument: String,
        kind: ArgumentKind,
    },

    #[error("Choice value `{0}` is not a whole number")]
    InvalidChoice(String),

    #[error("Required argument `{0}` cannot follow an optional one")]
    RequiredAfterOptional(String),

    #[error("An event listener for `{0}` is already registered")]
    DuplicateEvent(&'static str),
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Where a command may be invoked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Guild,
    Direct,
    Anywhere,
}

impl CommandScope {
    pub fn allows_guild(&self) -> bool {
        matches!(self, CommandScope::Guild | CommandScope::Anywhere)
    }

    pub fn allows_direct(&self) -> bool {
        matches!(self, CommandScope::Direct | CommandScope::Anywhere)
    }
}

/// Metadata plus handler for one invocable command.
pub struct CommandDescriptor<D> {
    names: Vec<String>,
    description: String,
    usage: String,
    scope: CommandScope,
    schema: CommandSchema,
    action: CommandAction<D>,
}

impl<D> CommandDescriptor<D> {
    /// Primary name, the first one declared.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// All invocation names, primary first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn scope(&self) -> CommandScope {
        self.scope
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.schema.options
    }

    pub fn schema(&self) -> &CommandSchema {
        &self.schema
    }

    pub fn action(&self) -> CommandAction<D> {
        self.action
    }
}

impl<D> fmt::Debug for CommandDescriptor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("names", &self.names)
            .field("usage", &self.usage)
            .field("scope", &self.scope)
            .field("arguments", &self.schema.options.len())
            .finish()
    }
}

/// Declares one command. Consumed by [`CommandRegistry::register`].
pub struct CommandBuilder<D> {
    names: Vec<String>,
    description: String,
    usage: Option<String>,
    scope: CommandScope,
    action: CommandAction<D>,
}

impl<D> CommandBuilder<D> {
    pub fn new(name: impl Into<String>, action: CommandAction<D>) -> Self {
        Self {
            names: vec![name.into()],
            description: String::new(),
            usage: None,
            scope: CommandScope::Guild,
            action,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.names.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn scope(mut self, scope: CommandScope) -> Self {
        self.scope = scope;
        self
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

pub struct CommandRegistry<D> {
    commands: Vec<CommandDescriptor<D>>,
    /// Flattened alias table: every name of every command -> index into `commands`.
    aliases: HashMap<String, usize>,
}

impl<D> Default for CommandRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> CommandRegistry<D> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// Declare a command. Registering a name or alias twice is an error rather
    /// than a silent overwrite.
    pub fn register(&mut self, builder: CommandBuilder<D>) -> Result<(), RegistrationError> {
        for (i, name) in builder.names.iter().enumerate() {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(RegistrationError::InvalidName(name.clone()));
            }
            if self.aliases.contains_key(name) || builder.names[..i].contains(name) {
                return Err(RegistrationError::DuplicateCommand(name.clone()));
            }
        }

        let index = self.commands.len();
        for name in &builder.names {
            self.aliases.insert(name.clone(), index);
        }

        let usage = builder.usage.unwrap_or_else(|| builder.names[0].clone());
        let schema = CommandSchema::new(builder.names[0].clone(), builder.description.clone());
        self.commands.push(CommandDescriptor {
            names: builder.names,
            description: builder.description,
            usage,
            scope: builder.scope,
            schema,
            action: builder.action,
        });

        Ok(())
    }

    /// Append a typed argument to a registered command and to its schema.
    ///
    /// `choices` are `(display name, value)` pairs. Whole-number arguments need
    /// integer values.
    pub fn add_argument(
        &mut self,
        command: &str,
        name: &str,
        type_name: &str,
        description: &str,
        required: bool,
        choices: &[(&str, &str)],
    ) -> Result<(), RegistrationError> {
        let index = *self
            .aliases
            .get(command)
            .ok_or_else(|| RegistrationError::UnknownCommand {
                command: command.to_string(),
                argument: name.to_string(),
            })?;
        let kind = ArgumentKind::parse(type_name)?;

        if !choices.is_empty() && !kind.supports_choices() {
            return Err(RegistrationError::ChoicesNotSupported {
                argument: name.to_string(),
                kind,
            });
        }

        let choices = choices
            .iter()
            .map(|(choice, value)| -> Result<OptionChoice, RegistrationError> {
                let value = match kind {
                    ArgumentKind::Integer => ChoiceValue::Integer(
                        value
                            .parse()
                            .map_err(|_| RegistrationError::InvalidChoice(value.to_string()))?,
                    ),
                    _ => ChoiceValue::Text(value.to_string()),
                };
                Ok(OptionChoice {
                    name: choice.to_string(),
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = &mut self.commands[index].schema.options;
        if required && options.iter().any(|option| !option.required) {
            return Err(RegistrationError::RequiredAfterOptional(name.to_string()));
        }

        options.push(ArgumentSpec {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required,
            choices,
        });

        Ok(())
    }

    /// Exact, case-sensitive lookup by any name or alias.
    pub fn resolve(&self, name: &str) -> Option<&CommandDescriptor<D>> {
        self.aliases.get(name).map(|&index| &self.commands[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor<D>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Schemas for every command reachable from a guild, in declaration order.
    pub fn schemas(&self) -> Vec<CommandSchema> {
        self.commands
            .iter()
            .filter(|command| command.scope.allows_guild())
            .map(|command| command.schema.clone())
            .collect()
    }
}

// ============================================================================
// TEXT-PREFIX INVOCATIONS
// ============================================================================

/// A prefix command split into its key and positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

/// Split `.transfer <@1> all` into `transfer` and `["<@1>", "all"]`.
///
/// Returns `None` when the message does not start with `prefix` or when the
/// prefix is not immediately followed by a command token.
pub fn parse_invocation(content: &str, prefix: char) -> Option<Invocation> {
    let rest = content.strip_prefix(prefix)?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = rest.split_whitespace();
    let command = tokens.next()?.to_string();
    Some(Invocation {
        command,
        args: tokens.map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::{BoxFuture, CommandContext, Error, Reply};

    fn noop(_ctx: CommandContext<'_, ()>) -> BoxFuture<'_, Result<Reply, Error>> {
        Box::pin(async move { Ok(Reply::text("ok")) })
    }

    fn registry_with_transfer() -> CommandRegistry<()> {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandBuilder::new("transfer", noop)
                    .alias("tf")
                    .description("Transfer funds to a user")
                    .usage("transfer <@user> <amount>"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn every_alias_resolves_to_the_same_descriptor() {
        let registry = registry_with_transfer();

        let by_name = registry.resolve("transfer").unwrap();
        let by_alias = registry.resolve("tf").unwrap();

        assert!(std::ptr::eq(by_name, by_alias));
        assert_eq!(by_alias.name(), "transfer");
        assert_eq!(by_alias.names(), ["transfer", "tf"]);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = registry_with_transfer();
        assert!(registry.resolve("Transfer").is_none());
        assert!(registry.resolve("TF").is_none());
    }

    #[test]
    fn usage_defaults_to_the_primary_name() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandBuilder::new("ping", noop)).unwrap();
        assert_eq!(registry.resolve("ping").unwrap().usage(), "ping");
    }

    #[test]
    fn argument_for_unregistered_command_fails() {
        let mut registry = registry_with_transfer();

        let err = registry
            .add_argument("ping", "test", "string", "Test argument", true, &[])
            .unwrap_err();

        assert_eq!(
            err,
            RegistrationError::UnknownCommand {
                command: "ping".into(),
                argument: "test".into()
            }
        );
    }

    #[test]
    fn unknown_argument_type_fails() {
        let mut registry = registry_with_transfer();
        let err = registry
            .add_argument("transfer", "amount", "float", "How much", true, &[])
            .unwrap_err();
        assert_eq!(err, RegistrationError::UnknownArgumentType("float".into()));
    }

    #[test]
    fn registering_a_taken_name_fails_and_keeps_the_first() {
        let mut registry = registry_with_transfer();

        let err = registry
            .register(CommandBuilder::new("give", noop).alias("tf"))
            .unwrap_err();

        assert_eq!(err, RegistrationError::DuplicateCommand("tf".into()));
        assert!(registry.resolve("give").is_none());
        assert_eq!(registry.resolve("tf").unwrap().name(), "transfer");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn repeated_alias_within_one_command_fails() {
        let mut registry: CommandRegistry<()> = CommandRegistry::new();
        let err = registry
            .register(CommandBuilder::new("cf", noop).alias("cf"))
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateCommand("cf".into()));
    }

    #[test]
    fn names_with_whitespace_are_rejected() {
        let mut registry: CommandRegistry<()> = CommandRegistry::new();
        let err = registry
            .register(CommandBuilder::new("coin flip", noop))
            .unwrap_err();
        assert_eq!(err, RegistrationError::InvalidName("coin flip".into()));
    }

    #[test]
    fn arguments_extend_the_schema_in_order() {
        let mut registry = registry_with_transfer();
        registry
            .add_argument("tf", "user", "user", "Who receives the funds", true, &[])
            .unwrap();
        registry
            .add_argument("transfer", "amount", "string", "Amount, all or half", true, &[])
            .unwrap();

        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 1);
        let options = &schemas[0].options;
        assert_eq!(options[0].name, "user");
        assert_eq!(options[0].kind, ArgumentKind::User);
        assert_eq!(options[1].name, "amount");
        assert_eq!(options[1].kind, ArgumentKind::Text);
    }

    #[test]
    fn choices_are_limited_to_text_and_integers() {
        let mut registry = registry_with_transfer();

        let err = registry
            .add_argument("transfer", "flag", "boolean", "A flag", false, &[("Yes", "true")])
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ChoicesNotSupported { .. }));

        let err = registry
            .add_argument("transfer", "count", "integer", "A count", false, &[("Many", "lots")])
            .unwrap_err();
        assert_eq!(err, RegistrationError::InvalidChoice("lots".into()));

        registry
            .add_argument("transfer", "count", "integer", "A count", false, &[("Ten", "10")])
            .unwrap();
        let option = &registry.resolve("transfer").unwrap().arguments()[0];
        assert_eq!(option.choices[0].value, ChoiceValue::Integer(10));
    }

    #[test]
    fn required_arguments_cannot_follow_optional_ones() {
        let mut registry = registry_with_transfer();
        registry
            .add_argument("transfer", "note", "string", "A note", false, &[])
            .unwrap();
        let err = registry
            .add_argument("transfer", "amount", "string", "Amount", true, &[])
            .unwrap_err();
        assert_eq!(err, RegistrationError::RequiredAfterOptional("amount".into()));
    }

    #[test]
    fn direct_only_commands_are_left_out_of_the_schema_export() {
        let mut registry = registry_with_transfer();
        registry
            .register(CommandBuilder::new("secret", noop).scope(CommandScope::Direct))
            .unwrap();

        let names: Vec<_> = registry.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["transfer"]);
    }

    #[test]
    fn invocation_splits_command_and_arguments() {
        let invocation = parse_invocation(".transfer <@42>   all ", '.').unwrap();
        assert_eq!(invocation.command, "transfer");
        assert_eq!(invocation.args, ["<@42>", "all"]);
    }

    #[test]
    fn invocation_without_arguments() {
        let invocation = parse_invocation(".ping", '.').unwrap();
        assert_eq!(invocation.command, "ping");
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn non_prefixed_messages_are_not_invocations() {
        assert_eq!(parse_invocation("ping", '.'), None);
        assert_eq!(parse_invocation(".", '.'), None);
        assert_eq!(parse_invocation(". ping", '.'), None);
        assert_eq!(parse_invocation("", '.'), None);
    }
}
