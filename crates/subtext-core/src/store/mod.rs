//! Task store: the shared map with queue-like claim semantics.

mod gc;
mod memory;

pub use gc::TtlPolicy;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::domain::{TaskId, TaskRecord};

/// Store port.
///
/// All operations are mutually exclusive with respect to each other;
/// in particular `claim_oldest_pending` is atomic, so two concurrent
/// claims can never hand out the same task.
///
/// "Not found" and "no pending work" are `None` - expected outcomes,
/// not errors. The in-memory implementation is the only one today;
/// the trait is the seam for swapping it later.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Add or overwrite a record. The TTL pass runs first, so expiry
    /// is evaluated against the time of insertion rather than a timer.
    ///
    /// Overwriting an existing id is deliberate: the orchestrator
    /// rewrites a task in place when it flips phases or retries.
    async fn insert(&self, record: TaskRecord);

    /// Read without mutation.
    async fn get(&self, id: TaskId) -> Option<TaskRecord>;

    /// Claim the oldest pending task for a worker, transitioning it to
    /// processing. `None` means no work is available right now.
    async fn claim_oldest_pending(&self) -> Option<TaskRecord>;

    /// Store a worker result, refreshing the record's timestamp. The
    /// store does not interpret the result.
    async fn complete(&self, id: TaskId, result: String) -> Option<TaskRecord>;

    /// Remove a record.
    async fn delete(&self, id: TaskId) -> Option<TaskRecord>;

    /// Observability hook: record counts by status.
    async fn counts_by_status(&self) -> StoreCounts;
}

/// Snapshot of how many records sit in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}
