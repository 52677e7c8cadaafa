// User records and the storage port behind them.
//
// The store owns the authoritative profile. The core reads snapshots and sends
// increment/overwrite requests; it never caches a record beyond one invocation.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

/// Balance every new record starts with.
pub const STARTING_BALANCE: i64 = 1_000_000;

/// Profile colour every new record starts with.
pub const DEFAULT_COLOR: &str = "#0099ff";

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// Per-user persisted profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    /// Cumulative XP already committed to the store.
    pub xp: i64,
    pub rep: i64,
    pub balance: i64,
    /// `#rrggbb`
    pub color: String,
    /// Unix milliseconds of the last rep/unrep this user handed out. 0 = never.
    pub last_rep: i64,
}

impl UserRecord {
    /// The record a store creates for a user it has never seen.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            xp: 0,
            rep: 0,
            balance: STARTING_BALANCE,
            color: DEFAULT_COLOR.to_string(),
            last_rep: 0,
        }
    }

    pub fn last_rep_at(&self) -> Option<DateTime<Utc>> {
        if self.last_rep <= 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.last_rep).single()
    }
}

/// Numeric columns that support increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Xp,
    Rep,
    Balance,
}

impl Counter {
    /// Column name on the wire.
    pub fn column(&self) -> &'static str {
        match self {
            Counter::Xp => "xp",
            Counter::Rep => "rep",
            Counter::Balance => "balance",
        }
    }
}

/// Columns that get overwritten rather than incremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Color(String),
    LastRep(DateTime<Utc>),
}

impl ProfileUpdate {
    /// Column name on the wire.
    pub fn column(&self) -> &'static str {
        match self {
            ProfileUpdate::Color(_) => "color",
            ProfileUpdate::LastRep(_) => "lastRep",
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Malformed store response: {0}")]
    Malformed(String),

    #[error("Database error: {0}")]
    Database(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// The user store contract: read one record, create, overwrite one column,
/// increment one column. No transactionality is promised.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Read a user's record, creating the default record when the user is new.
    async fn fetch(&self, user_id: u64) -> Result<UserRecord, StoreError>;

    async fn create(&self, user_id: u64) -> Result<(), StoreError>;

    async fn overwrite(&self, user_id: u64, update: ProfileUpdate) -> Result<(), StoreError>;

    /// Add `delta` (which may be negative) to a numeric column.
    async fn increment(&self, user_id: u64, counter: Counter, delta: i64)
        -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_start_with_the_default_profile() {
        let record = UserRecord::new(9);
        assert_eq!(record.balance, STARTING_BALANCE);
        assert_eq!(record.color, DEFAULT_COLOR);
        assert_eq!(record.xp, 0);
        assert!(record.last_rep_at().is_none());
    }

    #[test]
    fn last_rep_is_read_as_milliseconds() {
        let mut record = UserRecord::new(9);
        record.last_rep = 1_700_000_000_000;
        assert_eq!(record.last_rep_at().unwrap().timestamp(), 1_700_000_000);
    }
}
