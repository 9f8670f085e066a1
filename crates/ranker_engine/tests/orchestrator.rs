use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use ranker_core::{
    Banner, BatchStatusReport, JobId, RankedItem, RequirementStatusReport, ResultsPage,
    ServiceError, StageStatus, UploadFile,
};
use ranker_engine::{JobService, Orchestrator, OrchestratorSettings};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    SubmitRequirement(String),
    RequirementStatus(JobId),
    SubmitBatch(JobId, String),
    BatchStatus(JobId),
    RankedResults(JobId, u32),
}

/// In-memory job service answering from scripted queues.
#[derive(Default)]
struct ScriptedService {
    calls: Mutex<Vec<Call>>,
    requirement_ids: Mutex<VecDeque<JobId>>,
    requirement_statuses: Mutex<VecDeque<Result<RequirementStatusReport, ServiceError>>>,
    batch_statuses: Mutex<VecDeque<Result<BatchStatusReport, ServiceError>>>,
    status_delay: Option<Duration>,
}

impl ScriptedService {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_requirement_ids(self, ids: &[JobId]) -> Self {
        *self.requirement_ids.lock().unwrap() = ids.iter().copied().collect();
        self
    }

    fn with_requirement_statuses(self, statuses: Vec<Result<RequirementStatusReport, ServiceError>>) -> Self {
        *self.requirement_statuses.lock().unwrap() = statuses.into();
        self
    }

    fn with_batch_statuses(self, statuses: Vec<Result<BatchStatusReport, ServiceError>>) -> Self {
        *self.batch_statuses.lock().unwrap() = statuses.into();
        self
    }
}

fn requirement(status: &str, title: Option<&str>) -> Result<RequirementStatusReport, ServiceError> {
    Ok(RequirementStatusReport {
        status: status.to_string(),
        title: title.map(str::to_string),
    })
}

fn batch(status: &str) -> Result<BatchStatusReport, ServiceError> {
    Ok(BatchStatusReport {
        status: status.to_string(),
    })
}

fn ranked(id: u64, name: &str, score: u8) -> RankedItem {
    serde_json::from_value(json!({
        "id": id,
        "file_name": format!("{}_resume.pdf", name.to_lowercase()),
        "compatibility_score": score,
        "candidate_name": name,
        "ranking_analysis": { "Strengths": ["Python"] }
    }))
    .unwrap()
}

#[async_trait::async_trait]
impl JobService for ScriptedService {
    async fn submit_requirement(&self, file: &UploadFile) -> Result<JobId, ServiceError> {
        self.record(Call::SubmitRequirement(file.name.clone()));
        Ok(self.requirement_ids.lock().unwrap().pop_front().unwrap_or(101))
    }

    async fn requirement_status(&self, id: JobId) -> Result<RequirementStatusReport, ServiceError> {
        self.record(Call::RequirementStatus(id));
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        self.requirement_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| requirement("processing_jd", None))
    }

    async fn submit_batch(
        &self,
        requirement_id: JobId,
        file: &UploadFile,
    ) -> Result<JobId, ServiceError> {
        self.record(Call::SubmitBatch(requirement_id, file.name.clone()));
        Ok(202)
    }

    async fn batch_status(&self, id: JobId) -> Result<BatchStatusReport, ServiceError> {
        self.record(Call::BatchStatus(id));
        self.batch_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| batch("processing"))
    }

    async fn ranked_results(
        &self,
        batch_id: JobId,
        page: u32,
    ) -> Result<ResultsPage, ServiceError> {
        self.record(Call::RankedResults(batch_id, page));
        Ok(ResultsPage {
            items: vec![ranked(1, "Alice", 96), ranked(2, "Bob", 89)],
            info: Default::default(),
        })
    }
}

fn pdf() -> UploadFile {
    UploadFile::new("role.pdf", b"%PDF".to_vec())
}

fn zip() -> UploadFile {
    UploadFile::new("resumes.zip", b"PK".to_vec())
}

#[tokio::test(start_paused = true)]
async fn full_pipeline_reaches_ranked_results() {
    ranker_logging::initialize_for_tests();
    let service = Arc::new(
        ScriptedService::default()
            .with_requirement_statuses(vec![
                requirement("processing_jd", None),
                requirement("processed_jd", Some("Mock Senior Software Engineer")),
            ])
            .with_batch_statuses(vec![batch("processing"), batch("completed")]),
    );
    let orchestrator = Orchestrator::spawn(service.clone(), OrchestratorSettings::default());

    orchestrator.submit_requirement(pdf());
    let view = orchestrator
        .wait_until(|view| view.requirement.status.is_terminal())
        .await;
    assert_eq!(view.requirement.status, StageStatus::Ready);
    assert_eq!(view.requirement.job_id, Some(101));
    assert_eq!(view.title.as_deref(), Some("Mock Senior Software Engineer"));
    assert!(view.can_submit_batch);

    orchestrator.submit_batch(zip());
    let view = orchestrator.wait_until(|view| !view.results.is_empty()).await;
    assert_eq!(view.batch.status, StageStatus::Ready);
    let names: Vec<&str> = view.results.iter().map(|card| card.candidate_name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    assert_eq!(
        view.banner,
        Some(Banner::Notice("Ranked results loaded.".to_string()))
    );

    let view = orchestrator.wait_until(|view| !view.scheduler_armed).await;
    assert!(view.is_settled());

    assert_eq!(
        service.calls(),
        vec![
            Call::SubmitRequirement("role.pdf".to_string()),
            Call::RequirementStatus(101),
            Call::RequirementStatus(101),
            Call::SubmitBatch(101, "resumes.zip".to_string()),
            Call::BatchStatus(202),
            Call::BatchStatus(202),
            Call::RankedResults(202, 1),
        ]
    );

    orchestrator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn poll_transport_failure_fails_session_and_stops_polling() {
    let service = Arc::new(ScriptedService::default().with_requirement_statuses(vec![Err(
        ServiceError::transport("connection refused"),
    )]));
    let orchestrator = Orchestrator::spawn(service.clone(), OrchestratorSettings::default());

    orchestrator.submit_requirement(pdf());
    let view = orchestrator
        .wait_until(|view| view.requirement.status == StageStatus::Failed)
        .await;
    assert_eq!(
        view.banner,
        Some(Banner::Error("Polling error: connection refused".to_string()))
    );
    assert_eq!(view.batch.status, StageStatus::Idle);

    orchestrator.wait_until(|view| !view.scheduler_armed).await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    let polls = service
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::RequirementStatus(_)))
        .count();
    assert_eq!(polls, 1);

    orchestrator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn batch_before_requirement_is_refused_without_request() {
    let service = Arc::new(ScriptedService::default());
    let orchestrator = Orchestrator::spawn(service.clone(), OrchestratorSettings::default());

    orchestrator.submit_batch(zip());
    let view = orchestrator.wait_until(|view| view.banner.is_some()).await;
    assert_eq!(
        view.banner,
        Some(Banner::Notice(
            "Please submit the requirement document first.".to_string()
        ))
    );
    assert_eq!(view.batch.status, StageStatus::Idle);
    assert!(service.calls().is_empty());

    orchestrator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn status_answer_after_reset_is_ignored() {
    let service = Arc::new(ScriptedService {
        status_delay: Some(Duration::from_secs(10)),
        ..ScriptedService::default()
    }
    .with_requirement_ids(&[101, 102])
    .with_requirement_statuses(vec![requirement("processed_jd", Some("Stale Title"))]));
    let orchestrator = Orchestrator::spawn(service.clone(), OrchestratorSettings::default());

    orchestrator.submit_requirement(pdf());
    orchestrator
        .wait_until(|view| view.requirement.status == StageStatus::Polling)
        .await;

    // Let the first status request go out, then reset while it hangs.
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(
        service.calls().last(),
        Some(&Call::RequirementStatus(101))
    );
    orchestrator.reset();
    let view = orchestrator
        .wait_until(|view| view.requirement.status == StageStatus::Idle)
        .await;
    assert!(!view.scheduler_armed);

    tokio::time::sleep(Duration::from_secs(20)).await;
    let view = orchestrator.view();
    assert_eq!(view.requirement.status, StageStatus::Idle);
    assert_eq!(view.title, None);

    orchestrator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn reset_allows_a_fresh_session() {
    let service = Arc::new(
        ScriptedService::default()
            .with_requirement_ids(&[101, 102])
            .with_requirement_statuses(vec![
                requirement("failed_jd", None),
                requirement("processed_jd", Some("Second Try")),
            ]),
    );
    let orchestrator = Orchestrator::spawn(service.clone(), OrchestratorSettings::default());

    orchestrator.submit_requirement(pdf());
    let view = orchestrator
        .wait_until(|view| view.requirement.status == StageStatus::Failed)
        .await;
    assert_eq!(
        view.banner,
        Some(Banner::Error(
            "Failed to process the requirement document.".to_string()
        ))
    );

    orchestrator.reset();
    orchestrator.submit_requirement(pdf());
    let view = orchestrator
        .wait_until(|view| view.requirement.status == StageStatus::Ready)
        .await;
    assert_eq!(view.requirement.job_id, Some(102));
    assert_eq!(view.title.as_deref(), Some("Second Try"));

    orchestrator.shutdown().await;
}
