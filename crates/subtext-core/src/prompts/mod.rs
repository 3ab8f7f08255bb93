//! Prompt building for each domain and phase.

mod templates;

pub use templates::{render_readme_skeleton, select_template};

use crate::domain::{
    CommitRequest, GenerationRequest, Instructions, Mode, ReadmePayload, ReadmeRequest, RepoFacts,
};
use crate::error::SubtextError;

/// Builds worker instructions from request parameters.
///
/// A trait seam so prompt wording can evolve, or be replaced by a
/// canned builder in tests, without touching lifecycle logic.
pub trait PromptBuilder: Send + Sync {
    /// Instructions for a brand-new request (the analyze phase for
    /// two-phase domains).
    fn initial(&self, request: &GenerationRequest) -> Result<Instructions, SubtextError>;

    /// Generate-phase instructions, built during the phase rewrite and
    /// rebuilt in strict form for the grounding retry.
    fn generation(
        &self,
        request: &ReadmeRequest,
        facts: &RepoFacts,
        strict: bool,
    ) -> Result<Instructions, SubtextError>;
}

const COMMIT_SYSTEM: &str = "You write git commit messages. Produce exactly one commit message \
for the supplied diff, following the style guide and every rule verbatim. Output only the \
message text.";

const ANALYSIS_SYSTEM: &str = "You analyze repositories. The user message is a JSON envelope \
whose \"request.context\" field holds raw repository evidence. Answer with a single JSON \
object of repository facts: {\"repository\":{\"name\":...,\"type\":...},\"runtime\":{...},\
\"scripts\":{...}}. Use only information present in the context. Output JSON only.";

/// Default template-driven prompt builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePrompts;

impl TemplatePrompts {
    fn commit(&self, request: &CommitRequest) -> Instructions {
        let style = &request.config.style;
        let mut user = format!(
            "Project: {}\nStyle: {}\nEmojis: {}\nLanguage: {}\n",
            request.config.project_description, style.convention, style.use_emojis, style.language
        );
        if !request.config.rules.is_empty() {
            user.push_str("Rules:\n");
            for rule in &request.config.rules {
                user.push_str("- ");
                user.push_str(rule);
                user.push('\n');
            }
        }
        if !request.history.is_empty() {
            user.push_str("Recent commits:\n");
            for entry in &request.history {
                user.push_str("- ");
                user.push_str(entry);
                user.push('\n');
            }
        }
        user.push_str("\nDiff:\n");
        user.push_str(&request.diff);
        Instructions::new(COMMIT_SYSTEM, user)
    }

    fn readme_analysis(&self, request: &ReadmeRequest) -> Result<Instructions, SubtextError> {
        let user = ReadmePayload::analysis(request.clone())
            .encode()
            .map_err(|e| SubtextError::MalformedPayload(e.to_string()))?;
        Ok(Instructions::new(ANALYSIS_SYSTEM, user))
    }
}

impl PromptBuilder for TemplatePrompts {
    fn initial(&self, request: &GenerationRequest) -> Result<Instructions, SubtextError> {
        match request {
            GenerationRequest::Commit(req) => Ok(self.commit(req)),
            GenerationRequest::Readme(req) => self.readme_analysis(req),
        }
    }

    fn generation(
        &self,
        request: &ReadmeRequest,
        facts: &RepoFacts,
        strict: bool,
    ) -> Result<Instructions, SubtextError> {
        let (template_name, _) = select_template(request.doc_target);
        let skeleton = render_readme_skeleton(facts, request.doc_target);

        let mut system = format!(
            "Generate README content strictly from the provided repository facts. Follow this \
             template ({template_name}) exactly, polishing wording without adding or removing \
             information:\n\n{skeleton}"
        );
        if matches!(request.mode, Mode::Draft) {
            system.push_str("\nThis is a draft pass; keep every section brief.");
        }
        if strict {
            system.push_str(
                "\nThe previous attempt dropped required details. The output MUST contain, \
                 verbatim, each of the following:",
            );
            for anchor in facts.anchors() {
                system.push_str("\n- ");
                system.push_str(&anchor);
            }
        }

        let user = ReadmePayload::generation(request.clone(), facts.clone(), strict)
            .encode()
            .map_err(|e| SubtextError::MalformedPayload(e.to_string()))?;
        Ok(Instructions::new(system, user))
    }
}
