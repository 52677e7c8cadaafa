// Command registry: declared commands, their alias table, and the declarative
// slash-command schema built alongside them.

pub mod arguments;
pub mod registry;
pub mod schema;

pub use registry::{
    parse_invocation, CommandBuilder, CommandDescriptor, CommandRegistry, CommandScope, Invocation,
    RegistrationError,
};
pub use schema::{ArgumentKind, ArgumentSpec, ChoiceValue, CommandSchema, OptionChoice};
