//! Ranker core: pure two-stage orchestration state machine and view-model helpers.
mod effect;
mod error;
mod item;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, PollPlan};
pub use error::{OrchestratorError, ServiceError, ServiceErrorKind};
pub use item::{clamp_score, PageInfo, RankedItem, RankingAnalysis, ResultsPage};
pub use msg::{BatchStatusReport, Msg, RequirementStatusReport, UploadFile};
pub use state::{
    Banner, JobHandle, JobId, OrchestratorState, StageKind, StageStatus, Ticket,
    DEFAULT_JOB_TITLE,
};
pub use update::update;
pub use view_model::{DashboardView, ResultCardView, StageView};
