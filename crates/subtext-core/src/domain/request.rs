//! Inbound generation requests and their validation.
//!
//! Validation happens before a task is ever created: a request that
//! fails here is rejected immediately and never reaches the store.

use serde::{Deserialize, Serialize};

/// One inbound request, dispatched by domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum GenerationRequest {
    Commit(CommitRequest),
    Readme(ReadmeRequest),
}

impl GenerationRequest {
    /// Collect every problem with the request; empty means acceptable.
    pub fn validate(&self) -> Vec<String> {
        match self {
            GenerationRequest::Commit(req) => req.validate(),
            GenerationRequest::Readme(req) => req.validate(),
        }
    }
}

/// Commit message conventions the prompt templates know how to follow.
pub const ALLOWED_CONVENTIONS: &[&str] = &["conventional", "gitmoji", "angular"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitStyle {
    pub convention: String,
    pub use_emojis: bool,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitConfig {
    pub project_description: String,
    pub style: CommitStyle,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Request for a commit message generated from a diff. Single-phase:
/// the worker's first result is the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub diff: String,
    pub config: CommitConfig,
    #[serde(default)]
    pub history: Vec<String>,
}

impl CommitRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.diff.trim().is_empty() {
            problems.push("diff is required".to_string());
        }
        let style = &self.config.style;
        if !ALLOWED_CONVENTIONS.contains(&style.convention.as_str()) {
            problems.push(format!(
                "style.convention must be one of {ALLOWED_CONVENTIONS:?}"
            ));
        }
        if style.language.trim().is_empty() {
            problems.push("style.language is required".to_string());
        }
        problems
    }
}

/// Audience the README is written for; selects the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocTarget {
    Developer,
    Designer,
    General,
    Extension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Draft,
    Final,
}

/// Request for a README. Two-phase: the analyze stage distills the raw
/// context into repository facts, the generate stage writes the README
/// from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadmeRequest {
    /// Raw repository evidence (manifest excerpts, file listing, ...).
    pub context: String,
    pub doc_target: DocTarget,
    pub mode: Mode,
}

impl ReadmeRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.context.trim().is_empty() {
            problems.push("context is required".to_string());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_request() -> CommitRequest {
        CommitRequest {
            diff: "diff --git a/main.rs b/main.rs".to_string(),
            config: CommitConfig {
                project_description: "a demo".to_string(),
                style: CommitStyle {
                    convention: "conventional".to_string(),
                    use_emojis: false,
                    language: "en".to_string(),
                },
                rules: vec![],
            },
            history: vec![],
        }
    }

    #[test]
    fn valid_commit_request_passes() {
        assert!(commit_request().validate().is_empty());
    }

    #[test]
    fn commit_validation_collects_every_problem() {
        let mut req = commit_request();
        req.diff = "   ".to_string();
        req.config.style.convention = "freestyle".to_string();
        req.config.style.language = "".to_string();

        let problems = req.validate();
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("diff"));
        assert!(problems[1].contains("convention"));
        assert!(problems[2].contains("language"));
    }

    #[test]
    fn readme_requires_context() {
        let req = ReadmeRequest {
            context: "".to_string(),
            doc_target: DocTarget::Developer,
            mode: Mode::Final,
        };
        let problems = req.validate();
        assert_eq!(problems, vec!["context is required".to_string()]);
    }

    #[test]
    fn request_enum_is_tagged_by_domain() {
        let req = GenerationRequest::Commit(commit_request());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["domain"], "commit");
    }
}
