//! Phase rewrite parsing and grounding evaluation.
//!
//! Pure functions: given a stored record's payload and a worker result,
//! decide what should happen next. Side effects (persisting the
//! rewritten record) stay in the orchestrator.

use crate::domain::{ReadmePayload, RepoFacts};

/// Parse the analyze-phase worker result as repository facts.
pub(super) fn parse_facts(result: &str) -> Result<RepoFacts, String> {
    serde_json::from_str(result).map_err(|e| e.to_string())
}

/// Re-parse the envelope stored as a task's user message.
pub(super) fn parse_payload(user: &str) -> Result<ReadmePayload, String> {
    ReadmePayload::decode(user).map_err(|e| e.to_string())
}

/// Anchors absent from the generated text, in anchor order.
pub(super) fn missing_anchors(result: &str, anchors: &[String]) -> Vec<String> {
    anchors
        .iter()
        .filter(|anchor| !result.contains(anchor.as_str()))
        .cloned()
        .collect()
}

/// Next action for a completed generate-phase result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum GroundingVerdict {
    /// Every anchor is present; report the result as-is.
    Grounded,
    /// Anchors are missing and the one retry is still available.
    Retry { missing: Vec<String> },
    /// Anchors are missing and the retry was already spent.
    Fail { missing: Vec<String> },
}

pub(super) fn evaluate_grounding(
    result: &str,
    anchors: &[String],
    retried: bool,
) -> GroundingVerdict {
    let missing = missing_anchors(result, anchors);
    if missing.is_empty() {
        GroundingVerdict::Grounded
    } else if retried {
        GroundingVerdict::Fail { missing }
    } else {
        GroundingVerdict::Retry { missing }
    }
}
