// Lifestyle lookups: current weather and encyclopedia summaries.
//
// Both are thin ports over third-party content APIs. The infra layer has the
// HTTP clients; this module owns the models and the presentation rules that
// do not depend on any particular provider.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup service is not configured")]
    Unavailable,

    #[error("Lookup request failed: {0}")]
    Request(String),

    #[error("Unexpected lookup response: {0}")]
    Malformed(String),
}

// ============================================================================
// WEATHER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    /// Provider condition code, e.g. 800 for a clear sky.
    pub condition_id: u32,
    pub description: String,
    pub icon_url: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_degrees: u16,
    /// Local wall-clock times at the location, `HH:MM:SS`.
    pub sunrise: String,
    pub sunset: String,
    /// e.g. `UTC+02:00`
    pub utc_offset: String,
}

impl WeatherReport {
    /// Description with its first letter capitalised.
    pub fn condition(&self) -> String {
        let mut chars = self.description.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Emoji for an OpenWeatherMap-style condition code.
pub fn condition_emoji(condition_id: u32) -> &'static str {
    match condition_id {
        801 => "⛅",
        802..=u32::MAX => "☁️",
        800 => "☀️",
        781 => "🌪️",
        700..=799 => "🌫️",
        600..=699 => "🌨️",
        300..=599 => "🌧️",
        200..=299 => "⛈️",
        _ => "🌞",
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// `Ok(None)` when the location is unknown.
    async fn current(&self, location: &str) -> Result<Option<WeatherReport>, LookupError>;
}

// ============================================================================
// ENCYCLOPEDIA
// ============================================================================

/// Longest summary shown before the "read more" link.
pub const SUMMARY_LIMIT: usize = 950;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiArticle {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub image_url: Option<String>,
}

impl WikiArticle {
    /// Summary cut to [`SUMMARY_LIMIT`] characters followed by a link.
    pub fn excerpt(&self) -> String {
        let summary: String = self.summary.chars().take(SUMMARY_LIMIT).collect();
        format!("{} [Read more.]({})", summary, self.url)
    }
}

#[async_trait]
pub trait WikiProvider: Send + Sync {
    /// Best matching article, `Ok(None)` when nothing matches.
    async fn lookup(&self, query: &str) -> Result<Option<WikiArticle>, LookupError>;
}

/// Queries are limited to ASCII letters, digits, spaces and common punctuation.
pub fn is_plain_english(query: &str) -> bool {
    !query.is_empty()
        && query
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || "!@#$%^&*(),.<>/?;:'\"-".contains(c))
}
