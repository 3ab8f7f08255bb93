//! Repository facts: the structured output of the analyze phase.
//!
//! The generate phase is only allowed to state what these facts state;
//! the grounding check enforces that by demanding the anchor substrings
//! below appear literally in the generated text.

use serde::{Deserialize, Serialize};

/// Repository types the system accepts; anything else is rejected
/// during the phase rewrite.
pub const ALLOWED_REPOSITORY_TYPES: &[&str] = &[
    "web", "backend", "frontend", "mobile", "cli", "library", "desktop", "service", "api", "tool",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendRuntime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundler: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRuntime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

/// Runtime can be partially present (frontend, backend, or both).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend: Option<FrontendRuntime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendRuntime>,
}

/// Common package scripts (each nullable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

/// Facts distilled from repository context by the analyze phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFacts {
    pub repository: RepositoryInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<ScriptsInfo>,
}

impl RepoFacts {
    /// Validate beyond shape: required fields and the closed type set.
    /// Collects every problem; empty means acceptable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.repository.name.trim().is_empty() {
            problems.push("repository.name is required".to_string());
        }
        if self.repository.kind.trim().is_empty() {
            problems.push("repository.type is required".to_string());
        } else if !ALLOWED_REPOSITORY_TYPES.contains(&self.repository.kind.as_str()) {
            problems.push(format!(
                "repository.type must be one of {ALLOWED_REPOSITORY_TYPES:?}"
            ));
        }
        problems
    }

    /// Literal substrings a grounded generation result must contain:
    /// the repository name and type, plus every script command present.
    pub fn anchors(&self) -> Vec<String> {
        let mut anchors = vec![self.repository.name.clone(), self.repository.kind.clone()];
        if let Some(scripts) = &self.scripts {
            for command in [&scripts.dev, &scripts.build, &scripts.start]
                .into_iter()
                .flatten()
            {
                anchors.push(command.clone());
            }
        }
        anchors
    }
}
