// The XP aggregator.
//
// Chat messages and voice presence produce XP far more often than we want to
// hit the user store, so deltas pile up in memory and a flush timer commits
// them in one burst. Nothing here survives a restart.
//
// Flush semantics:
// - The pending map is swapped out for an empty one before any request is
//   issued, so increments that land mid-flush go into the next cycle instead of
//   racing the drain.
// - A failed increment merges its delta back into the pending map. Successful
//   deltas are never sent twice.

use crate::core::profiles::{Counter, UserStore};
use dashmap::DashSet;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpConfig {
    /// XP per guild chat message.
    pub chat_xp: u64,
    /// XP per accrual tick for each active voice user.
    pub voice_xp: u64,
    /// How often voice XP accrues.
    pub accrual_period: Duration,
    /// Flush once every this many accrual periods.
    pub flush_every: u32,
}

impl XpConfig {
    pub fn flush_period(&self) -> Duration {
        self.accrual_period * self.flush_every
    }
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            chat_xp: 3,
            voice_xp: 4,
            accrual_period: Duration::from_secs(10),
            flush_every: 10,
        }
    }
}

/// What one flush cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub flushed: usize,
    pub failed: usize,
}

impl FlushReport {
    pub fn is_noop(&self) -> bool {
        self.flushed == 0 && self.failed == 0
    }
}

struct XpTimers {
    stop: watch::Sender<bool>,
    accrual: JoinHandle<()>,
    flush: JoinHandle<()>,
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct XpManager {
    store: Arc<dyn UserStore>,
    config: XpConfig,
    /// user id -> XP earned since that user's last successful flush
    pending: Mutex<HashMap<u64, u64>>,
    /// Users currently eligible for voice accrual.
    active: DashSet<u64>,
    dirty: AtomicBool,
    timers: Mutex<Option<XpTimers>>,
}

impl XpManager {
    pub fn new(store: Arc<dyn UserStore>, config: XpConfig) -> Self {
        Self {
            store,
            config,
            pending: Mutex::new(HashMap::new()),
            active: DashSet::new(),
            dirty: AtomicBool::new(false),
            timers: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &XpConfig {
        &self.config
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<u64, u64>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_pending(&self, user_id: u64, amount: u64) {
        let mut pending = self.lock_pending();
        let entry = pending.entry(user_id).or_insert(0);
        *entry = entry.saturating_add(amount);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn increase_chat_xp(&self, user_id: u64) {
        self.add_pending(user_id, self.config.chat_xp);
    }

    pub fn increase_voice_xp(&self, user_id: u64) {
        self.add_pending(user_id, self.config.voice_xp);
    }

    /// Unflushed XP for one user.
    pub fn pending_for(&self, user_id: u64) -> u64 {
        self.lock_pending().get(&user_id).copied().unwrap_or(0)
    }

    pub fn pending_users(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Idempotent: activating twice still leaves one entry.
    pub fn set_active(&self, user_id: u64) {
        self.active.insert(user_id);
    }

    pub fn set_inactive(&self, user_id: u64) {
        self.active.remove(&user_id);
    }

    pub fn is_active(&self, user_id: u64) -> bool {
        self.active.contains(&user_id)
    }

    pub fn active_users(&self) -> usize {
        self.active.len()
    }

    /// One accrual tick: every active user earns voice XP.
    pub fn accrue(&self) {
        let active: Vec<u64> = self.active.iter().map(|id| *id).collect();
        for user_id in active {
            self.increase_voice_xp(user_id);
        }
    }

    /// Commit every pending delta to the store.
    ///
    /// A clean aggregate makes no store calls at all. Otherwise all increments
    /// are in flight at once and this waits for every one of them to settle.
    pub async fn flush(&self) -> FlushReport {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return FlushReport::default();
        }

        let snapshot = std::mem::take(&mut *self.lock_pending());
        if snapshot.is_empty() {
            return FlushReport::default();
        }

        // Polled on this task so every result still knows whose delta it was.
        let requests = snapshot.into_iter().map(|(user_id, delta)| {
            let store = Arc::clone(&self.store);
            async move {
                let amount = i64::try_from(delta).unwrap_or(i64::MAX);
                let result = store.increment(user_id, Counter::Xp, amount).await;
                (user_id, delta, result)
            }
        });

        let mut report = FlushReport::default();
        for (user_id, delta, result) in join_all(requests).await {
            match result {
                Ok(()) => report.flushed += 1,
                Err(e) => {
                    tracing::warn!(user_id, delta, "Failed to flush XP, re-queued: {}", e);
                    self.add_pending(user_id, delta);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            flushed = report.flushed,
            failed = report.failed,
            "Updated database XP values"
        );
        report
    }

    // ------------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------------

    /// Spawn the accrual and flush timers. Calling this while they already run
    /// is a no-op, which matters because the gateway can report "ready" again
    /// after a reconnect.
    pub fn start(self: &Arc<Self>) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        if timers.is_some() {
            tracing::debug!("XP timers already running");
            return;
        }

        let (stop, stop_rx) = watch::channel(false);
        let accrual = tokio::spawn(Arc::clone(self).run_accrual(stop_rx.clone()));
        let flush = tokio::spawn(Arc::clone(self).run_flush(stop_rx));
        *timers = Some(XpTimers {
            stop,
            accrual,
            flush,
        });

        tracing::info!(
            accrual_secs = self.config.accrual_period.as_secs(),
            flush_secs = self.config.flush_period().as_secs(),
            "Started voice XP monitor and database XP update timers"
        );
    }

    /// Stop both timers. Pending XP is neither flushed nor cleared, and a flush
    /// that is already running finishes normally.
    pub fn stop(&self) -> bool {
        let timers = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match timers {
            Some(timers) => {
                let _ = timers.stop.send(true);
                drop(timers.accrual);
                drop(timers.flush);
                tracing::info!("Stopped XP timers");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn run_accrual(self: Arc<Self>, mut stop: watch::Receiver<bool>) {
        let period = self.config.accrual_period;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop.changed() => break,
            }
            self.accrue();
        }
    }

    async fn run_flush(self: Arc<Self>, mut stop: watch::Receiver<bool>) {
        let period = self.config.flush_period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop.changed() => break,
            }
            self.flush().await;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::RecordingStore;

    fn manager_with(store: &Arc<RecordingStore>, config: XpConfig) -> Arc<XpManager> {
        Arc::new(XpManager::new(store.clone(), config))
    }

    fn fast_config() -> XpConfig {
        XpConfig {
            chat_xp: 3,
            voice_xp: 4,
            accrual_period: Duration::from_secs(10),
            flush_every: 2,
        }
    }

    #[tokio::test]
    async fn chat_xp_accumulates_per_user() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());

        manager.increase_chat_xp(1);
        manager.increase_chat_xp(1);
        manager.increase_chat_xp(2);

        assert_eq!(manager.pending_for(1), 6);
        assert_eq!(manager.pending_for(2), 3);
        assert_eq!(manager.pending_for(3), 0);
        assert!(manager.is_dirty());
    }

    #[tokio::test]
    async fn pending_equals_sum_of_increments_interleaved_with_ticks() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());
        manager.set_active(1);

        manager.increase_chat_xp(1);
        manager.accrue();
        manager.increase_chat_xp(1);
        manager.accrue();
        manager.accrue();

        assert_eq!(manager.pending_for(1), 3 + 4 + 3 + 4 + 4);
    }

    #[tokio::test]
    async fn activation_is_idempotent_and_removal_complete() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());

        manager.set_active(5);
        manager.set_active(5);
        manager.set_active(5);
        assert_eq!(manager.active_users(), 1);

        manager.accrue();
        assert_eq!(manager.pending_for(5), 4);

        manager.set_inactive(5);
        assert!(!manager.is_active(5));
        manager.accrue();
        assert_eq!(manager.pending_for(5), 4);
    }

    #[tokio::test]
    async fn clean_aggregate_flush_makes_no_store_calls() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());

        let report = manager.flush().await;

        assert!(report.is_noop());
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn flush_drains_every_pending_delta_once() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());
        manager.increase_chat_xp(1);
        manager.increase_chat_xp(2);
        manager.increase_chat_xp(2);

        let report = manager.flush().await;

        assert_eq!(report, FlushReport { flushed: 2, failed: 0 });
        assert_eq!(manager.pending_users(), 0);
        assert!(!manager.is_dirty());
        let mut increments = store.increments();
        increments.sort();
        assert_eq!(increments, [(1, Counter::Xp, 3), (2, Counter::Xp, 6)]);

        // Nothing new happened, so the next cycle is a no-op.
        assert!(manager.flush().await.is_noop());
        assert_eq!(store.increments().len(), 2);
    }

    #[tokio::test]
    async fn failed_increments_are_requeued_for_the_next_cycle() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());
        store.fail_increments_for(7);
        manager.increase_chat_xp(7);
        manager.increase_chat_xp(8);

        let report = manager.flush().await;

        assert_eq!(report, FlushReport { flushed: 1, failed: 1 });
        assert_eq!(manager.pending_for(7), 3);
        assert_eq!(manager.pending_for(8), 0);
        assert!(manager.is_dirty());

        // More XP arrives before the retry; the retry carries both.
        manager.increase_chat_xp(7);
        store.heal(7);
        let report = manager.flush().await;

        assert_eq!(report, FlushReport { flushed: 1, failed: 0 });
        assert_eq!(store.record(7).unwrap().xp, 6);
        assert_eq!(store.record(8).unwrap().xp, 3);
    }

    #[tokio::test]
    async fn every_failed_delta_goes_back_to_its_own_user() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, XpConfig::default());
        for user_id in 1..=6 {
            for _ in 0..user_id {
                manager.increase_chat_xp(user_id);
            }
        }
        store.fail_increments_for(2);
        store.fail_increments_for(5);

        let report = manager.flush().await;

        assert_eq!(report, FlushReport { flushed: 4, failed: 2 });
        assert_eq!(manager.pending_users(), 2);
        assert_eq!(manager.pending_for(2), 6);
        assert_eq!(manager.pending_for(5), 15);
        for user_id in [1, 3, 4, 6] {
            assert_eq!(manager.pending_for(user_id), 0);
            assert_eq!(store.record(user_id).unwrap().xp, 3 * user_id as i64);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timers_accrue_and_flush_on_schedule() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, fast_config());
        manager.set_active(1);
        manager.start();

        // First accrual at t=10s, no flush before t=20s.
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(manager.pending_for(1), 4);
        assert!(store.increments().is_empty());

        // t=20s: second accrual and first flush fire together, in either order.
        tokio::time::sleep(Duration::from_secs(10)).await;
        let stored = store.record(1).map(|r| r.xp).unwrap_or(0) as u64;
        assert_eq!(stored + manager.pending_for(1), 8);
        assert!(stored >= 4);

        assert!(manager.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_cancels_future_ticks_without_flushing() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, fast_config());
        manager.set_active(1);
        manager.start();

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(manager.stop());
        assert!(!manager.is_running());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(manager.pending_for(1), 4);
        assert!(store.increments().is_empty());
        assert!(!manager.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_keeps_a_single_set_of_timers() {
        let store = Arc::new(RecordingStore::default());
        let manager = manager_with(&store, fast_config());
        manager.set_active(1);
        manager.start();
        manager.start();

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(manager.pending_for(1), 4);
        manager.stop();
    }
}
