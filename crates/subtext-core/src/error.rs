use thiserror::Error;

use crate::domain::TaskId;

/// Errors surfaced at the orchestrator boundary.
///
/// "No pending work" is not here on purpose: workers polling an empty
/// store get `None`, not an error. Grounding failures after the one
/// allowed retry surface as a `Failed` task state, not as `Err`.
#[derive(Debug, Error)]
pub enum SubtextError {
    /// The id was never created, or the record already aged out.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The inbound request was rejected before a task was created.
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A stored instructions payload or worker result could not be
    /// parsed back into structured data during a rewrite.
    #[error("malformed stored payload: {0}")]
    MalformedPayload(String),
}
