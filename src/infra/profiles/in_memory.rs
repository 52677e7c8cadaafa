// In-memory implementation of UserStore.
//
// Nothing is persisted. Useful for local runs (`USER_STORE_URL=memory:`) and
// for exercising the bot without the profile service.

use crate::core::profiles::{Counter, ProfileUpdate, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// **DashMap:** concurrent map, so overlapping flushes and command handlers
/// never need a store-wide lock.
pub struct InMemoryUserStore {
    /// Maps user_id -> record
    data: DashMap<u64, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn fetch(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        Ok(self
            .data
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id))
            .clone())
    }

    async fn create(&self, user_id: u64) -> Result<(), StoreError> {
        self.data
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id));
        Ok(())
    }

    async fn overwrite(&self, user_id: u64, update: ProfileUpdate) -> Result<(), StoreError> {
        let mut record = self
            .data
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
        // entry() updates or inserts atomically
        let mut record = self
            .data
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id));
        let field = match counter {
            Counter::Xp => &mut record.xp,
            Counter::Rep => &mut record.rep,
            Counter::Balance => &mut record.balance,
        };
        *field = field.saturating_add(delta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryUserStore::new();

        // New users get the default record
        let record = store.fetch(123).await.unwrap();
        assert_eq!(record, UserRecord::new(123));

        store.increment(123, Counter::Xp, 100).await.unwrap();
        store.increment(123, Counter::Xp, 50).await.unwrap();
        store.increment(123, Counter::Balance, -1).await.unwrap();

        let record = store.fetch(123).await.unwrap();
        assert_eq!(record.xp, 150);
        assert_eq!(record.balance, 999_999);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryUserStore::new());
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.increment(1, Counter::Rep, 1).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.fetch(1).await.unwrap().rep, 50);
    }
}
