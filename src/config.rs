// Startup configuration, read once from the environment (and `.env`).

use crate::core::leveling::XpConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PREFIX: char = '.';
const DEFAULT_STORE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("COMMAND_PREFIX must be a single character, got '{0}'")]
    Prefix(String),
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Guild the slash-command schema is exported to.
    pub guild_id: u64,
    pub prefix: char,
    pub store_url: String,
    pub openweather_key: Option<String>,
    /// Members must outrank this role to use `clear`.
    pub moderator_role: Option<u64>,
    /// Skips balance checks, deductions and the daily rep limit.
    pub exempt_user: Option<u64>,
    pub xp: XpConfig,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DISCORD_TOKEN`
    /// - `DISCORD_GUILD_ID`
    ///
    /// Optional:
    /// - `COMMAND_PREFIX` (default `.`)
    /// - `USER_STORE_URL` (default `http://127.0.0.1:5000`)
    /// - `OPENWEATHERMAP_API_KEY`
    /// - `MODERATOR_ROLE_ID`, `EXEMPT_USER_ID`
    /// - `XP_CHAT_PER_MESSAGE`, `XP_VOICE_PER_TICK`, `XP_ACCRUAL_SECONDS`, `XP_FLUSH_EVERY`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset.
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let guild_id = parse_id("DISCORD_GUILD_ID", get("DISCORD_GUILD_ID"))?
            .ok_or(ConfigError::Missing("DISCORD_GUILD_ID"))?;

        let prefix = match get("COMMAND_PREFIX") {
            None => DEFAULT_PREFIX,
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(ConfigError::Prefix(raw)),
                }
            }
        };

        let defaults = XpConfig::default();
        let xp = XpConfig {
            chat_xp: parse_positive("XP_CHAT_PER_MESSAGE", get("XP_CHAT_PER_MESSAGE"))?
                .unwrap_or(defaults.chat_xp),
            voice_xp: parse_positive("XP_VOICE_PER_TICK", get("XP_VOICE_PER_TICK"))?
                .unwrap_or(defaults.voice_xp),
            accrual_period: parse_positive::<u64>("XP_ACCRUAL_SECONDS", get("XP_ACCRUAL_SECONDS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.accrual_period),
            flush_every: parse_positive("XP_FLUSH_EVERY", get("XP_FLUSH_EVERY"))?
                .unwrap_or(defaults.flush_every),
        };

        Ok(Self {
            discord_token,
            guild_id,
            prefix,
            store_url: get("USER_STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
            openweather_key: get("OPENWEATHERMAP_API_KEY"),
            moderator_role: parse_id("MODERATOR_ROLE_ID", get("MODERATOR_ROLE_ID"))?,
            exempt_user: parse_id("EXEMPT_USER_ID", get("EXEMPT_USER_ID"))?,
            xp,
        })
    }
}

fn parse_id(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    match parse_positive::<u64>(var, raw) {
        Err(ConfigError::Zero(var)) => Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
        }),
        other => other,
    }
}

fn parse_positive<T>(var: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = raw
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { var, value: raw })?;
    if value == T::default() {
        return Err(ConfigError::Zero(var));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|var| env.get(var).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("DISCORD_TOKEN", "token"), ("DISCORD_GUILD_ID", "42")];

    #[test]
    fn defaults_fill_optional_values() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.guild_id, 42);
        assert_eq!(config.prefix, '.');
        assert_eq!(config.store_url, "http://127.0.0.1:5000");
        assert_eq!(config.openweather_key, None);
        assert_eq!(config.moderator_role, None);
        assert_eq!(config.xp.chat_xp, 3);
        assert_eq!(config.xp.voice_xp, 4);
        assert_eq!(config.xp.accrual_period, Duration::from_secs(10));
        assert_eq!(config.xp.flush_every, 10);
    }

    #[test]
    fn required_values_must_be_present() {
        let err = load(&[("DISCORD_GUILD_ID", "42")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCORD_TOKEN")));

        let err = load(&[("DISCORD_TOKEN", "token"), ("DISCORD_GUILD_ID", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCORD_GUILD_ID")));
    }

    #[test]
    fn malformed_values_are_fatal() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("COMMAND_PREFIX", "!!"));
        assert!(matches!(load(&pairs).unwrap_err(), ConfigError::Prefix(_)));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EXEMPT_USER_ID", "someone"));
        assert!(matches!(
            load(&pairs).unwrap_err(),
            ConfigError::Invalid { var: "EXEMPT_USER_ID", .. }
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("XP_ACCRUAL_SECONDS", "0"));
        assert!(matches!(
            load(&pairs).unwrap_err(),
            ConfigError::Zero("XP_ACCRUAL_SECONDS")
        ));
    }

    #[test]
    fn overrides_are_applied() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("COMMAND_PREFIX", "!"),
            ("USER_STORE_URL", "sqlite:data/users.db"),
            ("MODERATOR_ROLE_ID", "7"),
            ("XP_FLUSH_EVERY", "6"),
        ]);
        let config = load(&pairs).unwrap();

        assert_eq!(config.prefix, '!');
        assert_eq!(config.store_url, "sqlite:data/users.db");
        assert_eq!(config.moderator_role, Some(7));
        assert_eq!(config.xp.flush_every, 6);
    }
}
