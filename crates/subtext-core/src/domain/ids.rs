//! Strongly-typed task identifier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of a task (one unit of queued generation work).
///
/// ULID-based: the timestamp sits in the high bits, so ids sort by
/// creation time and stay greppable in logs. The random tail keeps
/// ids minted within the same millisecond distinct.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Ulid);

impl TaskId {
    /// Mint a fresh id from the given instant plus random entropy.
    ///
    /// Taking the instant as an argument keeps id generation on the
    /// same clock seam as everything else, so a fixed clock yields
    /// deterministic timestamp bits in tests.
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(Ulid::from_parts(
            now.timestamp_millis() as u64,
            rand::random(),
        ))
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}
