//! In-memory store implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::{StoreCounts, TaskStore, TtlPolicy};
use crate::clock::Clock;
use crate::domain::{TaskId, TaskRecord, TaskState};

/// Mutable state behind the single lock.
struct MemoryStoreState {
    /// All records (single source of truth).
    records: HashMap<TaskId, TaskRecord>,

    /// Pending ids in insertion order (ids only; state lives in
    /// `records`).
    pending: VecDeque<TaskId>,
}

impl MemoryStoreState {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    fn evict_expired(&mut self, policy: &TtlPolicy, now: DateTime<Utc>) {
        let expired: Vec<TaskId> = self
            .records
            .values()
            .filter(|record| policy.should_evict(record, now))
            .map(|record| record.id)
            .collect();
        for id in expired {
            self.records.remove(&id);
            debug!(%id, "evicted expired task");
        }
    }

    fn counts(&self) -> StoreCounts {
        let mut counts = StoreCounts::default();
        for record in self.records.values() {
            match record.state {
                TaskState::Pending => counts.pending += 1,
                TaskState::Processing => counts.processing += 1,
                TaskState::Completed { .. } => counts.completed += 1,
                TaskState::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }
}

/// In-memory task store.
///
/// One tokio mutex serializes every operation, including the TTL pass
/// inside `insert`; claim is therefore atomic without per-record
/// locking. Nothing here blocks waiting for work - an empty claim
/// returns immediately and workers poll.
pub struct MemoryStore {
    state: Mutex<MemoryStoreState>,
    policy: TtlPolicy,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(policy: TtlPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryStoreState::new()),
            policy,
            clock,
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, record: TaskRecord) {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        state.evict_expired(&self.policy, now);

        let id = record.id;
        let is_pending = matches!(record.state, TaskState::Pending);
        state.records.insert(id, record);
        if is_pending && !state.pending.contains(&id) {
            state.pending.push_back(id);
        }
        debug!(%id, "inserted task");
    }

    async fn get(&self, id: TaskId) -> Option<TaskRecord> {
        self.state.lock().await.records.get(&id).cloned()
    }

    async fn claim_oldest_pending(&self) -> Option<TaskRecord> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        // Stale entries are left behind when a record is overwritten or
        // moves on without being claimed; skip until a live pending one.
        while let Some(id) = state.pending.pop_front() {
            if let Some(record) = state.records.get_mut(&id)
                && matches!(record.state, TaskState::Pending)
            {
                record.claim(now);
                debug!(%id, "claimed task");
                return Some(record.clone());
            }
        }
        None
    }

    async fn complete(&self, id: TaskId, result: String) -> Option<TaskRecord> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let record = state.records.get_mut(&id)?;
        record.complete(result, now);
        debug!(%id, "completed task");
        Some(record.clone())
    }

    async fn delete(&self, id: TaskId) -> Option<TaskRecord> {
        self.state.lock().await.records.remove(&id)
    }

    async fn counts_by_status(&self) -> StoreCounts {
        self.state.lock().await.counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{Domain, Instructions, TaskStatus};
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn store_at(t: DateTime<Utc>) -> (MemoryStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(t));
        let store = MemoryStore::new(TtlPolicy::default(), clock.clone());
        (store, clock)
    }

    fn pending_record(now: DateTime<Utc>) -> TaskRecord {
        TaskRecord::new(
            TaskId::generate(now),
            Domain::Commit,
            None,
            Instructions::new("system", "user"),
            now,
        )
    }

    #[tokio::test]
    async fn insert_then_get_returns_the_record() {
        let (store, _) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;

        store.insert(record.clone()).await;

        assert_eq!(store.get(id).await, Some(record));
        assert_eq!(store.get(TaskId::generate(t0())).await, None);
    }

    #[tokio::test]
    async fn claim_transitions_to_processing() {
        let (store, _) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;
        store.insert(record).await;

        let claimed = store.claim_oldest_pending().await.unwrap();
        assert_eq!(claimed.id, id);
        assert_eq!(claimed.status(), TaskStatus::Processing);

        // The stored record moved too, not just the returned copy.
        assert_eq!(store.get(id).await.unwrap().status(), TaskStatus::Processing);
    }

    #[tokio::test]
    async fn claim_returns_oldest_first() {
        let (store, clock) = store_at(t0());
        let first = pending_record(clock.now());
        clock.advance(Duration::milliseconds(5));
        let second = pending_record(clock.now());

        store.insert(first.clone()).await;
        store.insert(second.clone()).await;

        assert_eq!(store.claim_oldest_pending().await.unwrap().id, first.id);
        assert_eq!(store.claim_oldest_pending().await.unwrap().id, second.id);
    }

    #[tokio::test]
    async fn claim_on_empty_store_is_none() {
        let (store, _) = store_at(t0());
        assert!(store.claim_oldest_pending().await.is_none());
    }

    #[tokio::test]
    async fn claimed_task_cannot_be_claimed_again() {
        let (store, _) = store_at(t0());
        store.insert(pending_record(t0())).await;

        assert!(store.claim_oldest_pending().await.is_some());
        assert!(store.claim_oldest_pending().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_return_distinct_tasks() {
        let clock = Arc::new(FixedClock::new(t0()));
        let store = Arc::new(MemoryStore::new(TtlPolicy::default(), clock.clone()));

        let n = 8;
        for _ in 0..n {
            store.insert(pending_record(clock.now())).await;
            clock.advance(Duration::milliseconds(1));
        }

        let mut handles = Vec::new();
        for _ in 0..n {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(
                async move { store.claim_oldest_pending().await },
            ));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let claimed = handle.await.unwrap().expect("one task per claimer");
            assert!(seen.insert(claimed.id), "task handed out twice");
        }
        assert_eq!(seen.len(), n);
        assert!(store.claim_oldest_pending().await.is_none());
    }

    #[tokio::test]
    async fn complete_sets_result_and_refreshes_timestamp() {
        let (store, clock) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;
        store.insert(record).await;
        store.claim_oldest_pending().await.unwrap();

        clock.advance(Duration::seconds(30));
        let completed = store.complete(id, "feat: done".to_string()).await.unwrap();

        assert_eq!(completed.status(), TaskStatus::Completed);
        assert_eq!(completed.result(), Some("feat: done"));
        assert_eq!(completed.updated_at, t0() + Duration::seconds(30));
    }

    #[tokio::test]
    async fn complete_on_missing_id_is_none() {
        let (store, _) = store_at(t0());
        assert!(store.complete(TaskId::generate(t0()), "x".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let (store, _) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;
        store.insert(record).await;

        assert!(store.delete(id).await.is_some());
        assert!(store.get(id).await.is_none());
        assert!(store.delete(id).await.is_none());
    }

    #[tokio::test]
    async fn overwriting_an_id_requeues_it() {
        let (store, clock) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;
        store.insert(record).await;
        store.claim_oldest_pending().await.unwrap();
        store.complete(id, "phase one".to_string()).await.unwrap();

        // Rewrite in place the way the orchestrator does: same id,
        // pending again.
        let mut rewritten = store.get(id).await.unwrap();
        rewritten.rewrite_pending(
            crate::domain::Phase::Generate,
            Instructions::new("system 2", "user 2"),
            clock.now(),
        );
        store.insert(rewritten).await;

        let reclaimed = store.claim_oldest_pending().await.unwrap();
        assert_eq!(reclaimed.id, id);
        assert_eq!(reclaimed.instructions.system, "system 2");
    }

    #[tokio::test]
    async fn expired_completed_task_is_gone_after_next_insert() {
        let (store, clock) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;
        store.insert(record).await;
        store.claim_oldest_pending().await.unwrap();
        store.complete(id, "done".to_string()).await.unwrap();

        clock.advance(Duration::seconds(601));
        store.insert(pending_record(clock.now())).await;

        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn young_completed_task_survives_the_pass() {
        let (store, clock) = store_at(t0());
        let record = pending_record(t0());
        let id = record.id;
        store.insert(record).await;
        store.claim_oldest_pending().await.unwrap();
        store.complete(id, "done".to_string()).await.unwrap();

        clock.advance(Duration::seconds(599));
        store.insert(pending_record(clock.now())).await;

        assert!(store.get(id).await.is_some());
    }

    #[tokio::test]
    async fn in_flight_and_failed_tasks_never_age_out() {
        let (store, clock) = store_at(t0());

        let stuck = pending_record(t0());
        let stuck_id = stuck.id;
        store.insert(stuck).await;
        store.claim_oldest_pending().await.unwrap(); // Processing forever

        let mut failed = pending_record(t0());
        let failed_id = failed.id;
        failed.fail("boom".to_string(), t0());
        store.insert(failed).await;

        let waiting = pending_record(t0());
        let waiting_id = waiting.id;
        store.insert(waiting).await;

        clock.advance(Duration::days(30));
        store.insert(pending_record(clock.now())).await;

        assert!(store.get(stuck_id).await.is_some());
        assert!(store.get(failed_id).await.is_some());
        assert!(store.get(waiting_id).await.is_some());
    }

    #[tokio::test]
    async fn counts_follow_the_lifecycle() {
        let (store, _) = store_at(t0());
        store.insert(pending_record(t0())).await;
        store.insert(pending_record(t0())).await;
        let claimed = store.claim_oldest_pending().await.unwrap();
        store.complete(claimed.id, "done".to_string()).await.unwrap();

        let counts = store.counts_by_status().await;
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.processing, 0);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.failed, 0);
    }
}
