//! Task record and lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::payload::Instructions;

/// Generation domain. A closed set: dispatch happens by matching on
/// this enum, never by comparing strings at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Commit,
    Readme,
}

/// Sub-stage of a two-phase request. Both stages run under the same
/// task id; single-phase domains carry no phase at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Analyze,
    Generate,
}

/// Task state.
///
/// The terminal variants carry their payloads, so a completed task
/// without a result (or a failed one without an error) cannot be
/// constructed.
///
/// Transitions:
/// - Pending -> Processing -> Completed | Failed
/// - Completed -> Pending, only through the orchestrator's phase
///   rewrite or its single grounding retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Processing,
    Completed { result: String },
    Failed { error: String },
}

impl TaskState {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Processing => TaskStatus::Processing,
            TaskState::Completed { .. } => TaskStatus::Completed,
            TaskState::Failed { .. } => TaskStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed { .. } | TaskState::Failed { .. })
    }
}

/// Status discriminant: the client-visible view of [`TaskState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Metadata + instructions for one unit of queued work.
///
/// Design:
/// - This is the single source of truth for task state; queue
///   structures hold `TaskId` only.
/// - All state transitions happen through the methods below.
/// - `updated_at` is the TTL clock: it marks the last relevant
///   transition, not creation, so a completed record ages from the
///   moment its result became available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub domain: Domain,
    pub phase: Option<Phase>,
    pub state: TaskState,
    pub instructions: Instructions,

    /// Whether the one allowed post-completion retry has been spent.
    pub retried: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(
        id: TaskId,
        domain: Domain,
        phase: Option<Phase>,
        instructions: Instructions,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            domain,
            phase,
            state: TaskState::Pending,
            instructions,
            retried: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Exclusive claim by a worker.
    pub fn claim(&mut self, now: DateTime<Utc>) {
        self.state = TaskState::Processing;
        self.updated_at = now;
    }

    /// Store a worker result.
    pub fn complete(&mut self, result: String, now: DateTime<Utc>) {
        self.state = TaskState::Completed { result };
        self.updated_at = now;
    }

    /// Terminal failure with a description for the client.
    pub fn fail(&mut self, error: String, now: DateTime<Utc>) {
        self.state = TaskState::Failed { error };
        self.updated_at = now;
    }

    /// Reset to pending under the same id with fresh instructions.
    /// Used for the analyze -> generate flip and the grounding retry;
    /// the previous result is discarded and the TTL clock restarts.
    pub fn rewrite_pending(&mut self, phase: Phase, instructions: Instructions, now: DateTime<Utc>) {
        self.phase = Some(phase);
        self.instructions = instructions;
        self.state = TaskState::Pending;
        self.updated_at = now;
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    pub fn result(&self) -> Option<&str> {
        match &self.state {
            TaskState::Completed { result } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            TaskState::Failed { error } => Some(error),
            _ => None,
        }
    }
}
