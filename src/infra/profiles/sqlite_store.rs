use crate::core::profiles::{
    Counter, ProfileUpdate, StoreError, UserRecord, UserStore, DEFAULT_COLOR, STARTING_BALANCE,
};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// User records in a local SQLite file, for running without the profile service.
pub struct SqliteUserStore {
    pool: Pool<Sqlite>,
}

impl SqliteUserStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                xp INTEGER NOT NULL DEFAULT 0,
                rep INTEGER NOT NULL DEFAULT 0,
                balance INTEGER NOT NULL,
                color TEXT NOT NULL,
                last_rep INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ensure_user(&self, user_id: u64) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO users (id, balance, color) VALUES (?, ?, ?)")
            .bind(user_id as i64)
            .bind(STARTING_BALANCE)
            .bind(DEFAULT_COLOR)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn fetch(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        self.ensure_user(user_id).await?;

        let row = sqlx::query("SELECT xp, rep, balance, color, last_rep FROM users WHERE id = ?")
            .bind(user_id as i64)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(UserRecord {
            id: user_id,
            xp: row.get("xp"),
            rep: row.get("rep"),
            balance: row.get("balance"),
            color: row.get("color"),
            last_rep: row.get("last_rep"),
        })
    }

    async fn create(&self, user_id: u64) -> Result<(), StoreError> {
        self.ensure_user(user_id).await
    }

    async fn overwrite(&self, user_id: u64, update: ProfileUpdate) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        let query = match &update {
            ProfileUpdate::Color(color) => {
                sqlx::query("UPDATE users SET color = ? WHERE id = ?").bind(color.clone())
            }
            ProfileUpdate::LastRep(at) => {
                sqlx::query("UPDATE users SET last_rep = ? WHERE id = ?").bind(at.timestamp_millis())
            }
        };
        query
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn increment(
        &self,
        user_id: u64,
        counter: Counter,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        // Column names come from a closed enum, never from user input.
        let column = counter.column();
        let sql = format!("UPDATE users SET {column} = {column} + ? WHERE id = ?");
        sqlx::query(&sql)
            .bind(delta)
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    async fn temp_store() -> (SqliteUserStore, std::path::PathBuf) {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_owned();
        drop(tmp);
        let store = SqliteUserStore::new(path.to_str().unwrap()).await.unwrap();
        (store, path)
    }

    #[tokio::test]
    async fn fetch_creates_the_default_record() {
        let (store, _path) = temp_store().await;

        let record = store.fetch(42).await.unwrap();

        assert_eq!(record, UserRecord::new(42));
    }

    #[tokio::test]
    async fn increments_accept_negative_deltas() {
        let (store, _path) = temp_store().await;

        store.increment(1, Counter::Balance, -500).await.unwrap();
        store.increment(1, Counter::Xp, 12).await.unwrap();
        store.increment(1, Counter::Rep, -1).await.unwrap();

        let record = store.fetch(1).await.unwrap();
        assert_eq!(record.balance, STARTING_BALANCE - 500);
        assert_eq!(record.xp, 12);
        assert_eq!(record.rep, -1);
    }

    #[tokio::test]
    async fn overwrites_replace_single_columns() {
        let (store, _path) = temp_store().await;
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        store
            .overwrite(3, ProfileUpdate::Color("#abcdef".into()))
            .await
            .unwrap();
        store.overwrite(3, ProfileUpdate::LastRep(at)).await.unwrap();

        let record = store.fetch(3).await.unwrap();
        assert_eq!(record.color, "#abcdef");
        assert_eq!(record.last_rep_at(), Some(at));
    }

    #[tokio::test]
    async fn records_survive_reopening() {
        let (store, path) = temp_store().await;
        store.increment(9, Counter::Xp, 77).await.unwrap();
        drop(store);

        let reopened = SqliteUserStore::new(path.to_str().unwrap()).await.unwrap();

        assert_eq!(reopened.fetch(9).await.unwrap().xp, 77);
    }
}
