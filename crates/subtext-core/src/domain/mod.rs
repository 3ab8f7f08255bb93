//! Domain model: identifiers, task records, requests, facts, payloads.

pub mod facts;
pub mod ids;
pub mod payload;
pub mod request;
pub mod task;

pub use facts::{
    ALLOWED_REPOSITORY_TYPES, BackendRuntime, FrontendRuntime, RepoFacts, RepositoryInfo,
    RuntimeInfo, ScriptsInfo,
};
pub use ids::TaskId;
pub use payload::{Instructions, ReadmePayload};
pub use request::{
    ALLOWED_CONVENTIONS, CommitConfig, CommitRequest, CommitStyle, DocTarget, GenerationRequest,
    Mode, ReadmeRequest,
};
pub use task::{Domain, Phase, TaskRecord, TaskState, TaskStatus};
