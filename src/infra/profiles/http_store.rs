// HTTP user store.
//
// Talks to the profile service over plain GETs with header-encoded
// parameters:
//
//   GET /fetchUser             UserID: <id>                 -> JSON record or `undefined`
//   GET /addUser               UserID: <id>
//   GET /updateUser            UserID: <id>  Data: {"col": value}
//   GET /updateUserIncrement   UserID: <id>  Data: {"col": delta}
//
// The service splices `Data` values straight into SQL, so text values are sent
// pre-quoted.

use crate::core::profiles::{Counter, ProfileUpdate, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct HttpUserStore {
    client: Client,
    base_url: String,
}

/// Record as the service serializes it. `id` is ignored; the caller already
/// knows which user it asked for.
#[derive(Debug, Deserialize)]
struct WireUser {
    xp: i64,
    rep: i64,
    balance: i64,
    color: String,
    #[serde(rename = "lastRep", default)]
    last_rep: i64,
}

impl HttpUserStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static("NebulaBot/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call(&self, path: &str, user_id: u64, data: Option<Value>) -> Result<String, StoreError> {
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("UserID", user_id.to_string());
        if let Some(data) = data {
            request = request.header("Data", data.to_string());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StoreError::Request(format!(
                "{} returned {}",
                path,
                resp.status()
            )));
        }

        resp.text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))
    }
}

/// Decode a `/fetchUser` body. `Ok(None)` means the user does not exist yet.
fn decode_record(user_id: u64, body: &str) -> Result<Option<UserRecord>, StoreError> {
    if body.trim() == "undefined" {
        return Ok(None);
    }
    let wire: WireUser =
        serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))?;
    Ok(Some(UserRecord {
        id: user_id,
        xp: wire.xp,
        rep: wire.rep,
        balance: wire.balance,
        color: wire.color,
        last_rep: wire.last_rep,
    }))
}

fn update_payload(update: &ProfileUpdate) -> Value {
    let value = match update {
        ProfileUpdate::Color(color) => json!(format!("'{}'", color)),
        ProfileUpdate::LastRep(at) => json!(at.timestamp_millis()),
    };
    json!({ update.column(): value })
}

fn increment_payload(counter: Counter, delta: i64) -> Value {
    json!({ counter.column(): delta })
}

#[async_trait]
impl UserStore for HttpUserStore {
    async fn fetch(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        let body = self.call("/fetchUser", user_id, None).await?;
        match decode_record(user_id, &body)? {
            Some(record) => Ok(record),
            None => {
                self.create(user_id).await?;
                Ok(UserRecord::new(user_id))
            }
        }
    }

    async fn create(&self, user_id: u64) -> Result<(), StoreError> {
        self.call("/addUser", user_id, None).await?;
        tracing::info!(user_id, "Created user record");
        Ok(())
    }

    async fn overwrite(&self, user_id: u64, update: ProfileUpdate) -> Result<(), StoreError> {
        self.call("/updateUser", user_id, Some(update_payload(&update)))
            .await?;
        Ok(())
    }

    async fn increment(
        &self,
        user_id: u64,
        counter: Counter,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.call(
            "/updateUserIncrement",
            user_id,
            Some(increment_payload(counter, delta)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn undefined_body_means_missing_user() {
        assert_eq!(decode_record(5, "undefined").unwrap(), None);
        assert_eq!(decode_record(5, "undefined\n").unwrap(), None);
    }

    #[test]
    fn records_decode_from_service_json() {
        let body = r##"{"id": "5", "xp": 1200, "rep": -2, "balance": 900, "color": "#ff0000", "lastRep": 1700000000000}"##;

        let record = decode_record(5, body).unwrap().unwrap();

        assert_eq!(record.id, 5);
        assert_eq!(record.xp, 1200);
        assert_eq!(record.rep, -2);
        assert_eq!(record.balance, 900);
        assert_eq!(record.color, "#ff0000");
        assert_eq!(record.last_rep, 1_700_000_000_000);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_record(5, "<html>oops</html>"),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn payloads_are_single_column_objects() {
        assert_eq!(
            increment_payload(Counter::Balance, -500).to_string(),
            r#"{"balance":-500}"#
        );
        assert_eq!(
            update_payload(&ProfileUpdate::Color("#112233".into())).to_string(),
            r##"{"color":"'#112233'"}"##
        );
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            update_payload(&ProfileUpdate::LastRep(at)).to_string(),
            r#"{"lastRep":1700000000000}"#
        );
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let store = HttpUserStore::new("http://127.0.0.1:5000/").unwrap();
        assert_eq!(store.base_url, "http://127.0.0.1:5000");
    }
}
