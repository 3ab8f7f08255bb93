//! Fixed README templates and their rendering.
//!
//! Content must not deviate from these structures; the generate-phase
//! worker receives the rendered skeleton and polishes wording without
//! adding or removing information.

use crate::domain::{BackendRuntime, DocTarget, FrontendRuntime, RepoFacts, ScriptsInfo};

pub const TEMPLATE_DEVELOPER_V1: &str = r#"# {name}

## Overview
{overview}

## Repository
- Name: {name}
- Type: {repo_type}

## Runtime
- Frontend: {frontend_summary}
- Backend: {backend_summary}

## Scripts
- Dev: {script_dev}
- Build: {script_build}
- Start: {script_start}
"#;

pub const TEMPLATE_DESIGNER_V1: &str = r#"# {name}

## Summary
{overview}

## Tech Snapshot
- Frontend: {frontend_summary}
- Backend: {backend_summary}

## Scripts
- Dev: {script_dev}
- Build: {script_build}
- Start: {script_start}
"#;

pub const TEMPLATE_GENERAL_V1: &str = r#"# {name}

## Overview
{overview}

## Runtime
- Frontend: {frontend_summary}
- Backend: {backend_summary}

## How to Run
- Dev: {script_dev}
- Build: {script_build}
- Start: {script_start}
"#;

pub const TEMPLATE_EXTENSION_V1: &str = r#"# {name}

## Overview
{overview}

## Runtime
- Frontend: {frontend_summary}
- Backend: {backend_summary}

## Scripts
- Dev: {script_dev}
- Build: {script_build}
- Start: {script_start}
"#;

/// Pick a fixed template by target audience. Returns (name, body).
pub fn select_template(target: DocTarget) -> (&'static str, &'static str) {
    match target {
        DocTarget::Developer => ("readme_developer_v1", TEMPLATE_DEVELOPER_V1),
        DocTarget::Designer => ("readme_designer_v1", TEMPLATE_DESIGNER_V1),
        DocTarget::General => ("readme_general_v1", TEMPLATE_GENERAL_V1),
        DocTarget::Extension => ("readme_extension_v1", TEMPLATE_EXTENSION_V1),
    }
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Not specified")
}

fn frontend_summary(frontend: &FrontendRuntime) -> String {
    format!(
        "Framework: {}; Bundler: {}",
        optional(&frontend.framework),
        optional(&frontend.bundler)
    )
}

fn backend_summary(backend: &BackendRuntime) -> String {
    format!(
        "Framework: {}; Language: {}; Runtime: {}",
        optional(&backend.framework),
        optional(&backend.language),
        optional(&backend.runtime)
    )
}

fn script(scripts: Option<&ScriptsInfo>, pick: fn(&ScriptsInfo) -> &Option<String>) -> String {
    match scripts {
        None => "Not present".to_string(),
        Some(scripts) => optional(pick(scripts)).to_string(),
    }
}

/// Deterministically render the template skeleton from facts.
pub fn render_readme_skeleton(facts: &RepoFacts, target: DocTarget) -> String {
    let (_, template) = select_template(target);

    let overview = format!(
        "Repository \"{}\" is a \"{}\" project.",
        facts.repository.name, facts.repository.kind
    );

    let frontend = facts
        .runtime
        .as_ref()
        .and_then(|runtime| runtime.frontend.as_ref())
        .map(frontend_summary)
        .unwrap_or_else(|| "Not present".to_string());
    let backend = facts
        .runtime
        .as_ref()
        .and_then(|runtime| runtime.backend.as_ref())
        .map(backend_summary)
        .unwrap_or_else(|| "Not present".to_string());

    let scripts = facts.scripts.as_ref();
    template
        .replace("{name}", &facts.repository.name)
        .replace("{repo_type}", &facts.repository.kind)
        .replace("{overview}", &overview)
        .replace("{frontend_summary}", &frontend)
        .replace("{backend_summary}", &backend)
        .replace("{script_dev}", &script(scripts, |s| &s.dev))
        .replace("{script_build}", &script(scripts, |s| &s.build))
        .replace("{script_start}", &script(scripts, |s| &s.start))
}
