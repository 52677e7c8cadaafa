// Test doubles for the core ports. Compiled only for tests.

use crate::core::dispatch::{ChatPlatform, PlatformError, Reply};
use crate::core::lifestyle::{
    LookupError, WeatherProvider, WeatherReport, WikiArticle, WikiProvider,
};
use crate::core::profiles::{Counter, ProfileUpdate, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Fetch(u64),
    Create(u64),
    Overwrite(u64, ProfileUpdate),
    Increment(u64, Counter, i64),
}

/// In-memory user store that logs every call it receives.
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<HashMap<u64, UserRecord>>,
    ops: Mutex<Vec<StoreOp>>,
    failing: Mutex<HashSet<u64>>,
    fail_fetches: AtomicBool,
}

impl RecordingStore {
    pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: UserRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn record(&self, user_id: u64) -> Option<UserRecord> {
        self.records.lock().unwrap().get(&user_id).cloned()
    }

    pub fn operations(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Every call except reads.
    pub fn mutations(&self) -> Vec<StoreOp> {
        self.operations()
            .into_iter()
            .filter(|op| !matches!(op, StoreOp::Fetch(_)))
            .collect()
    }

    pub fn increments(&self) -> Vec<(u64, Counter, i64)> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Increment(user, counter, delta) => Some((user, counter, delta)),
                _ => None,
            })
            .collect()
    }

    pub fn fail_increments_for(&self, user_id: u64) {
        self.failing.lock().unwrap().insert(user_id);
    }

    pub fn heal(&self, user_id: u64) {
        self.failing.lock().unwrap().remove(&user_id);
    }

    pub fn fail_fetches(&self) {
        self.fail_fetches.store(true, Ordering::SeqCst);
    }

    fn log(&self, op: StoreOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl UserStore for RecordingStore {
    async fn fetch(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        self.log(StoreOp::Fetch(user_id));
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Request("store offline".into()));
        }
        let mut records = self.records.lock().unwrap();
        Ok(records
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id))
            .clone())
    }

    async fn create(&self, user_id: u64) -> Result<(), StoreError> {
        self.log(StoreOp::Create(user_id));
        self.records
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id));
        Ok(())
    }

    async fn overwrite(&self, user_id: u64, update: ProfileUpdate) -> Result<(), StoreError> {
        self.log(StoreOp::Overwrite(user_id, update.clone()));
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id));
        match update {
            ProfileUpdate::Color(color) => record.color = color,
            ProfileUpdate::LastRep(at) => record.last_rep = at.timestamp_millis(),
        }
        Ok(())
    }

    async fn increment(
        &self,
        user_id: u64,
        counter: Counter,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.log(StoreOp::Increment(user_id, counter, delta));
        if self.failing.lock().unwrap().contains(&user_id) {
            return Err(StoreError::Request("connection reset".into()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id));
        match counter {
            Counter::Xp => record.xp += delta,
            Counter::Rep => record.rep += delta,
            Counter::Balance => record.balance += delta,
        }
        Ok(())
    }
}

/// Chat platform double that keeps every reply it was asked to send.
pub struct RecordingPlatform {
    sent: Mutex<Vec<(u64, Reply)>>,
    pub latency: Option<Duration>,
    pub outranks: bool,
    pub highest_role: Option<String>,
    fail_sends: AtomicBool,
    deleted: Mutex<Vec<(u64, u8)>>,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            latency: Some(Duration::from_millis(42)),
            outranks: false,
            highest_role: None,
            fail_sends: AtomicBool::new(false),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingPlatform {
    pub fn sent(&self) -> Vec<(u64, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    /// Flattened text of every reply, in order.
    pub fn contents(&self) -> Vec<String> {
        self.sent().iter().map(|(_, reply)| reply.content()).collect()
    }

    pub fn deletions(&self) -> Vec<(u64, u8)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn send(&self, channel_id: u64, reply: Reply) -> Result<(), PlatformError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(PlatformError::Request("missing access".into()));
        }
        self.sent.lock().unwrap().push((channel_id, reply));
        Ok(())
    }

    async fn latency(&self) -> Option<Duration> {
        self.latency
    }

    async fn outranks_role(
        &self,
        _guild_id: u64,
        _user_id: u64,
        _role_id: u64,
    ) -> Result<bool, PlatformError> {
        Ok(self.outranks)
    }

    async fn highest_role_name(
        &self,
        _guild_id: u64,
        _user_id: u64,
    ) -> Result<Option<String>, PlatformError> {
        Ok(self.highest_role.clone())
    }

    async fn delete_recent_messages(
        &self,
        channel_id: u64,
        count: u8,
    ) -> Result<usize, PlatformError> {
        self.deleted.lock().unwrap().push((channel_id, count));
        Ok(usize::from(count))
    }

    fn bot_avatar_url(&self) -> Option<String> {
        None
    }
}

/// Weather provider that answers every query with the same report.
#[derive(Default)]
pub struct StubWeather {
    pub report: Option<WeatherReport>,
    pub unavailable: bool,
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current(&self, _location: &str) -> Result<Option<WeatherReport>, LookupError> {
        if self.unavailable {
            return Err(LookupError::Unavailable);
        }
        Ok(self.report.clone())
    }
}

/// Encyclopedia double that answers every query with the same article.
#[derive(Default)]
pub struct StubWiki {
    pub article: Option<WikiArticle>,
}

#[async_trait]
impl WikiProvider for StubWiki {
    async fn lookup(&self, _query: &str) -> Result<Option<WikiArticle>, LookupError> {
        Ok(self.article.clone())
    }
}
