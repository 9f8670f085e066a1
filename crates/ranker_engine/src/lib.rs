//! Ranker engine: remote job service client, poll scheduler and the
//! orchestrator actor that executes core effects.
mod client;
mod engine;
mod scheduler;
mod types;

pub use client::{
    normalize_base_url, CredentialSource, JobService, ReqwestJobService, ServiceSettings,
    StaticCredentials,
};
pub use engine::{Orchestrator, OrchestratorSettings};
pub use scheduler::PollScheduler;
pub use types::RankedPayload;
