//! Time-based eviction of finished tasks.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{TaskRecord, TaskState};

/// Eviction policy for completed tasks.
///
/// Only completed records age out: pending and processing work is in
/// flight, and a failed record holds an error the client may not have
/// seen yet. Age is measured from the last relevant transition
/// (`updated_at`), so a task that was rewritten or completed late
/// still gets its full TTL.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    pub ttl: Duration,
}

impl TtlPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn should_evict(&self, record: &TaskRecord, now: DateTime<Utc>) -> bool {
        matches!(record.state, TaskState::Completed { .. })
            && now.signed_duration_since(record.updated_at) > self.ttl
    }
}

impl Default for TtlPolicy {
    /// Keep completed tasks for ten minutes, then delete.
    fn default() -> Self {
        Self::new(Duration::seconds(600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, Instructions, TaskId};
    use chrono::TimeZone;
    use rstest::rstest;

    fn record_with_state(state: TaskState, updated_at: DateTime<Utc>) -> TaskRecord {
        let mut rec = TaskRecord::new(
            TaskId::generate(updated_at),
            Domain::Commit,
            None,
            Instructions::new("s", "u"),
            updated_at,
        );
        rec.state = state;
        rec
    }

    #[test]
    fn completed_past_ttl_is_evicted() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let policy = TtlPolicy::default();
        let rec = record_with_state(
            TaskState::Completed {
                result: "done".to_string(),
            },
            t0,
        );
        assert!(policy.should_evict(&rec, t0 + Duration::seconds(601)));
    }

    #[test]
    fn completed_within_ttl_survives() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let policy = TtlPolicy::default();
        let rec = record_with_state(
            TaskState::Completed {
                result: "done".to_string(),
            },
            t0,
        );
        assert!(!policy.should_evict(&rec, t0 + Duration::seconds(599)));
    }

    #[rstest]
    #[case(TaskState::Pending)]
    #[case(TaskState::Processing)]
    #[case(TaskState::Failed { error: "boom".to_string() })]
    fn non_completed_records_never_age_out(#[case] state: TaskState) {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let policy = TtlPolicy::default();
        let rec = record_with_state(state, t0);
        assert!(!policy.should_evict(&rec, t0 + Duration::days(30)));
    }
}
