//! Worker-facing instructions and the stored payload envelope.

use serde::{Deserialize, Serialize};

use super::facts::RepoFacts;
use super::request::ReadmeRequest;

/// The opaque blob handed to a worker: a system instruction plus the
/// user message it applies to. The store never interprets either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    pub system: String,
    pub user: String,
}

impl Instructions {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// JSON envelope stored as the user message of readme tasks.
///
/// The original request rides inside so the phase rewrite can
/// reconstruct it after the analyze result arrives; without this the
/// schema-agnostic store would have nowhere to keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadmePayload {
    pub request: ReadmeRequest,

    /// Present from the generate phase on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<RepoFacts>,

    /// Set once the grounding retry has reinforced the constraint.
    #[serde(default)]
    pub strict: bool,
}

impl ReadmePayload {
    /// Envelope for the analyze phase: just the request.
    pub fn analysis(request: ReadmeRequest) -> Self {
        Self {
            request,
            facts: None,
            strict: false,
        }
    }

    /// Envelope for the generate phase: request plus distilled facts.
    pub fn generation(request: ReadmeRequest, facts: RepoFacts, strict: bool) -> Self {
        Self {
            request,
            facts: Some(facts),
            strict,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(user: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(user)
    }
}
