use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::core::lifestyle::{LookupError, WeatherProvider, WeatherReport};

/// Current-conditions client for the OpenWeatherMap API, metric units.
pub struct OpenWeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static("NebulaBot/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LookupError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiWeather {
    weather: Vec<ApiCondition>,
    main: ApiMain,
    wind: ApiWind,
    sys: ApiSys,
    /// Shift from UTC in seconds.
    #[serde(default)]
    timezone: i32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    id: u32,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    sunrise: i64,
    sunset: i64,
}

fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{}@4x.png", icon)
}

fn local_time(unix: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|at| at.with_timezone(&offset).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.unsigned_abs();
    format!("UTC{}{:02}:{:02}", sign, seconds / 3600, (seconds % 3600) / 60)
}

/// `cod` is a number on success and a string on errors.
fn status_code(body: &Value) -> Option<u16> {
    match body.get("cod")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Turn a response body into a report. `Ok(None)` for an unknown location.
fn parse_weather(body: &str) -> Result<Option<WeatherReport>, LookupError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    match status_code(&value) {
        Some(200) => {}
        Some(404) => return Ok(None),
        Some(other) => {
            return Err(LookupError::Request(format!(
                "OpenWeatherMap returned {}",
                other
            )))
        }
        None => return Err(LookupError::Malformed("missing status code".to_string())),
    }

    let api: ApiWeather =
        serde_json::from_value(value).map_err(|e| LookupError::Malformed(e.to_string()))?;
    let condition = api
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Malformed("no weather conditions".to_string()))?;
    let offset = FixedOffset::east_opt(api.timezone)
        .ok_or_else(|| LookupError::Malformed(format!("bad timezone {}", api.timezone)))?;

    Ok(Some(WeatherReport {
        location: api.name,
        condition_id: condition.id,
        description: condition.description,
        icon_url: icon_url(&condition.icon),
        temperature_c: api.main.temp,
        feels_like_c: api.main.feels_like,
        humidity: api.main.humidity,
        wind_speed: api.wind.speed,
        wind_degrees: api.wind.deg,
        sunrise: local_time(api.sys.sunrise, offset),
        sunset: local_time(api.sys.sunset, offset),
        utc_offset: format_offset(api.timezone),
    }))
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, location: &str) -> Result<Option<WeatherReport>, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::Unavailable)?;

        let resp = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        // Error bodies still carry `cod`, so the status is read from the body.
        let body = resp
            .text()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;
        parse_weather(&body)
    }
}
