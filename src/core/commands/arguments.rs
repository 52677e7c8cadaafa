// Shared argument coercion.
//
// The registry hands handlers raw positional strings. Handlers turn them into
// typed values through these helpers, one per argument type, so every command
// rejects bad input the same way.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("Missing argument")]
    Missing,

    #[error("`{0}` is not a whole number")]
    NotInteger(String),

    #[error("`{0}` is not a number")]
    NotNumber(String),

    #[error("`{0}` is not true or false")]
    NotBoolean(String),

    #[error("`{0}` is not a user mention")]
    NotUser(String),

    #[error("`{0}` is not a role mention")]
    NotRole(String),

    #[error("`{0}` is not a channel mention")]
    NotChannel(String),
}

/// A user or a role, whichever the mention turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mentionable {
    User(u64),
    Role(u64),
}

fn present(arg: Option<&str>) -> Result<&str, ArgumentError> {
    match arg {
        Some(value) if !value.trim().is_empty() => Ok(value.trim()),
        _ => Err(ArgumentError::Missing),
    }
}

/// Snowflakes are never zero.
fn snowflake(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|id| *id != 0)
}

pub fn text(arg: Option<&str>) -> Result<&str, ArgumentError> {
    present(arg)
}

pub fn integer(arg: Option<&str>) -> Result<i64, ArgumentError> {
    let raw = present(arg)?;
    raw.parse()
        .map_err(|_| ArgumentError::NotInteger(raw.to_string()))
}

pub fn decimal(arg: Option<&str>) -> Result<f64, ArgumentError> {
    let raw = present(arg)?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ArgumentError::NotNumber(raw.to_string()))
}

pub fn boolean(arg: Option<&str>) -> Result<bool, ArgumentError> {
    let raw = present(arg)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ArgumentError::NotBoolean(raw.to_string())),
    }
}

/// `<@id>`, `<@!id>` or a bare id.
pub fn user_id(arg: Option<&str>) -> Result<u64, ArgumentError> {
    let raw = present(arg)?;
    let inner = raw
        .strip_prefix("<@")
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.strip_prefix('!').unwrap_or(s))
        .unwrap_or(raw);
    if inner.starts_with('&') {
        return Err(ArgumentError::NotUser(raw.to_string()));
    }
    snowflake(inner).ok_or_else(|| ArgumentError::NotUser(raw.to_string()))
}

/// `<@&id>` or a bare id.
pub fn role_id(arg: Option<&str>) -> Result<u64, ArgumentError> {
    let raw = present(arg)?;
    let inner = raw
        .strip_prefix("<@&")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);
    snowflake(inner).ok_or_else(|| ArgumentError::NotRole(raw.to_string()))
}

/// `<#id>` or a bare id.
pub fn channel_id(arg: Option<&str>) -> Result<u64, ArgumentError> {
    let raw = present(arg)?;
    let inner = raw
        .strip_prefix("<#")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);
    snowflake(inner).ok_or_else(|| ArgumentError::NotChannel(raw.to_string()))
}

/// A role mention if it looks like one, otherwise a user mention.
pub fn mentionable(arg: Option<&str>) -> Result<Mentionable, ArgumentError> {
    let raw = present(arg)?;
    if raw.starts_with("<@&") {
        role_id(Some(raw)).map(Mentionable::Role)
    } else {
        user_id(Some(raw)).map(Mentionable::User)
    }
}
