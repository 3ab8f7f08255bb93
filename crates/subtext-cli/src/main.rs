//! Demo wiring: an in-memory broker, one mock worker, two requests.
//!
//! The mock worker stands in for the external inference worker: it
//! claims tasks and fabricates plausible results (facts JSON for the
//! analyze phase, a rendered README for the generate phase, a commit
//! message otherwise).

use std::sync::Arc;

use tokio::time::{Duration, sleep};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use subtext_core::clock::{Clock, SystemClock};
use subtext_core::domain::{
    CommitConfig, CommitRequest, CommitStyle, DocTarget, GenerationRequest, Mode, Phase,
    ReadmePayload, ReadmeRequest, TaskRecord, TaskStatus,
};
use subtext_core::orchestrator::Orchestrator;
use subtext_core::prompts::{TemplatePrompts, render_readme_skeleton};
use subtext_core::store::{MemoryStore, TaskStore, TtlPolicy};

fn fabricate_result(task: &TaskRecord) -> String {
    match task.phase {
        Some(Phase::Analyze) => serde_json::json!({
            "repository": { "name": "subtext", "type": "backend" },
            "runtime": { "backend": { "language": "Rust" } },
            "scripts": { "dev": "cargo run" }
        })
        .to_string(),
        Some(Phase::Generate) => match ReadmePayload::decode(&task.instructions.user) {
            Ok(payload) => match payload.facts {
                Some(facts) => render_readme_skeleton(&facts, payload.request.doc_target),
                None => "# README".to_string(),
            },
            Err(_) => "# README".to_string(),
        },
        None => "feat: wire the broker demo".to_string(),
    }
}

async fn worker_loop(orchestrator: Arc<Orchestrator>) {
    loop {
        let Some(task) = orchestrator.claim_next().await else {
            sleep(Duration::from_millis(20)).await;
            continue;
        };

        let result = fabricate_result(&task);
        if let Err(e) = orchestrator.report_result(task.id, result).await {
            warn!(id = %task.id, error = %e, "result report failed");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(MemoryStore::new(TtlPolicy::default(), clock.clone()));
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        Arc::new(TemplatePrompts),
        clock,
    ));

    let worker = tokio::spawn(worker_loop(orchestrator.clone()));

    let commit_id = orchestrator
        .enqueue(GenerationRequest::Commit(CommitRequest {
            diff: "diff --git a/src/main.rs b/src/main.rs".to_string(),
            config: CommitConfig {
                project_description: "A pull-based generation broker".to_string(),
                style: CommitStyle {
                    convention: "conventional".to_string(),
                    use_emojis: false,
                    language: "en".to_string(),
                },
                rules: vec!["Keep it short".to_string()],
            },
            history: vec![],
        }))
        .await
        .expect("commit request is valid");

    let readme_id = orchestrator
        .enqueue(GenerationRequest::Readme(ReadmeRequest {
            context: "Cargo.toml: [package] name = \"subtext\"".to_string(),
            doc_target: DocTarget::Developer,
            mode: Mode::Final,
        }))
        .await
        .expect("readme request is valid");

    for id in [commit_id, readme_id] {
        loop {
            let response = orchestrator.poll(id).await.expect("task exists");
            match response.status {
                TaskStatus::Completed => {
                    info!(%id, "task completed");
                    println!("--- {id} ---\n{}", response.result.unwrap_or_default());
                    break;
                }
                TaskStatus::Failed => {
                    warn!(%id, error = ?response.error, "task failed");
                    break;
                }
                _ => sleep(Duration::from_millis(25)).await,
            }
        }
    }

    info!(counts = ?store.counts_by_status().await, "final store counts");
    worker.abort();
}
