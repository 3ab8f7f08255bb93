//! Task lifecycle orchestration.
//!
//! The client sees one task id end to end. Internally a two-phase
//! request passes the Pending -> Processing -> Completed cycle twice
//! under that id: the analyze result is parsed and rewritten in place
//! into a generate-phase task, and an ungrounded generation result
//! earns exactly one re-queue before failing. Both rewrites happen on
//! the client's poll, before the response is formed.

mod rewrite;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::domain::{
    Domain, GenerationRequest, Phase, TaskId, TaskRecord, TaskState, TaskStatus,
};
use crate::error::SubtextError;
use crate::prompts::PromptBuilder;
use crate::store::TaskStore;
use rewrite::GroundingVerdict;

/// Client-visible poll answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollResponse {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PollResponse {
    fn from_record(record: &TaskRecord) -> Self {
        Self {
            id: record.id,
            status: record.status(),
            result: record.result().map(str::to_string),
            error: record.error().map(str::to_string),
        }
    }

    /// The view handed back while a rewrite keeps the task in flight;
    /// the client never learns a rewrite occurred.
    fn pending(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// Drives tasks through the store on behalf of clients and workers.
pub struct Orchestrator {
    store: Arc<dyn TaskStore>,
    prompts: Arc<dyn PromptBuilder>,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn TaskStore>,
        prompts: Arc<dyn PromptBuilder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            prompts,
            clock,
        }
    }

    /// Validate and enqueue a new request. The returned id is the one
    /// handle the client polls for the rest of the lifecycle.
    pub async fn enqueue(&self, request: GenerationRequest) -> Result<TaskId, SubtextError> {
        let problems = request.validate();
        if !problems.is_empty() {
            return Err(SubtextError::Validation(problems));
        }

        let (domain, phase) = match &request {
            GenerationRequest::Commit(_) => (Domain::Commit, None),
            GenerationRequest::Readme(_) => (Domain::Readme, Some(Phase::Analyze)),
        };
        let instructions = self.prompts.initial(&request)?;

        let now = self.clock.now();
        let id = TaskId::generate(now);
        let record = TaskRecord::new(id, domain, phase, instructions, now);
        self.store.insert(record).await;
        info!(%id, ?domain, "enqueued task");
        Ok(id)
    }

    /// Worker pull. `None` means no work is available; workers poll.
    pub async fn claim_next(&self) -> Option<TaskRecord> {
        self.store.claim_oldest_pending().await
    }

    /// Worker push. The result is stored verbatim; interpretation
    /// waits for the client's next poll.
    pub async fn report_result(&self, id: TaskId, result: String) -> Result<(), SubtextError> {
        match self.store.complete(id, result).await {
            Some(_) => Ok(()),
            None => Err(SubtextError::NotFound(id)),
        }
    }

    /// Client read path. Phase rewrite and the grounding check run
    /// here, as side effects, before the response is formed.
    pub async fn poll(&self, id: TaskId) -> Result<PollResponse, SubtextError> {
        let record = self
            .store
            .get(id)
            .await
            .ok_or(SubtextError::NotFound(id))?;

        match (&record.phase, &record.state) {
            (Some(Phase::Analyze), TaskState::Completed { result }) => {
                let result = result.clone();
                self.rewrite_to_generation(record, result).await
            }
            (Some(Phase::Generate), TaskState::Completed { result }) => {
                let result = result.clone();
                self.finish_generation(record, result).await
            }
            _ => Ok(PollResponse::from_record(&record)),
        }
    }

    /// Mark the task failed and persist it; the error travels to the
    /// client in this and every later poll.
    async fn fail_task(
        &self,
        mut record: TaskRecord,
        error: String,
    ) -> Result<PollResponse, SubtextError> {
        warn!(id = %record.id, %error, "task failed");
        record.fail(error, self.clock.now());
        let response = PollResponse::from_record(&record);
        self.store.insert(record).await;
        Ok(response)
    }

    /// A completed analyze task: turn the worker's facts into a
    /// generate-phase task under the same id. Any malformed stored
    /// payload found on the way is a terminal failure, never a silent
    /// pass-through.
    async fn rewrite_to_generation(
        &self,
        mut record: TaskRecord,
        result: String,
    ) -> Result<PollResponse, SubtextError> {
        let facts = match rewrite::parse_facts(&result) {
            Ok(facts) => facts,
            Err(e) => {
                return self
                    .fail_task(record, format!("analysis result unreadable: {e}"))
                    .await;
            }
        };
        let payload = match rewrite::parse_payload(&record.instructions.user) {
            Ok(payload) => payload,
            Err(e) => {
                return self
                    .fail_task(record, format!("stored payload unreadable: {e}"))
                    .await;
            }
        };
        let problems = facts.validate();
        if !problems.is_empty() {
            return self
                .fail_task(record, format!("analysis facts rejected: {}", problems.join("; ")))
                .await;
        }

        let instructions = self.prompts.generation(&payload.request, &facts, false)?;
        record.rewrite_pending(Phase::Generate, instructions, self.clock.now());
        info!(id = %record.id, "analysis accepted; task rewritten for generation");
        self.store.insert(record.clone()).await;
        Ok(PollResponse::pending(record.id))
    }

    /// A completed generate task: report it only if every anchor from
    /// the stored facts appears in the output. One re-queue is allowed,
    /// ever; after that a miss is terminal.
    async fn finish_generation(
        &self,
        mut record: TaskRecord,
        result: String,
    ) -> Result<PollResponse, SubtextError> {
        let payload = match rewrite::parse_payload(&record.instructions.user) {
            Ok(payload) => payload,
            Err(e) => {
                return self
                    .fail_task(record, format!("stored payload unreadable: {e}"))
                    .await;
            }
        };
        let Some(facts) = payload.facts else {
            return self
                .fail_task(record, "generation payload carries no facts".to_string())
                .await;
        };

        let anchors = facts.anchors();
        match rewrite::evaluate_grounding(&result, &anchors, record.retried) {
            GroundingVerdict::Grounded => Ok(PollResponse::from_record(&record)),
            GroundingVerdict::Retry { missing } => {
                warn!(
                    id = %record.id,
                    missing = ?missing,
                    "output not grounded; re-queueing once with strict instructions"
                );
                let instructions = self.prompts.generation(&payload.request, &facts, true)?;
                record.retried = true;
                record.rewrite_pending(Phase::Generate, instructions, self.clock.now());
                self.store.insert(record.clone()).await;
                Ok(PollResponse::pending(record.id))
            }
            GroundingVerdict::Fail { missing } => {
                self.fail_task(
                    record,
                    format!(
                        "generated output still missing required content after retry: {}",
                        missing.join(", ")
                    ),
                )
                .await
            }
        }
    }
}
