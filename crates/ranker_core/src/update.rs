use crate::{
    BatchStatusReport, Effect, JobId, Msg, OrchestratorError, OrchestratorState, PollPlan,
    RequirementStatusReport, ResultsPage, ServiceError, StageKind, StageStatus, Ticket,
    UploadFile, DEFAULT_JOB_TITLE,
};

const NOTICE_REQUIREMENT_FIRST: &str = "Please submit the requirement document first.";
const NOTICE_RESET_REQUIREMENT: &str = "Reset before submitting a new requirement document.";
const NOTICE_RESET_BATCH: &str = "Reset before scoring another batch.";
const NOTICE_RESULTS_NOT_READY: &str = "Ranked results are available once batch scoring completes.";
const NOTICE_PAGE_START: &str = "Page numbers start at 1.";
const NOTICE_RESULTS_LOADED: &str = "Ranked results loaded.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: OrchestratorState, msg: Msg) -> (OrchestratorState, Vec<Effect>) {
    let effects = match msg {
        Msg::RequirementChosen(file) => submit_requirement(&mut state, file),
        Msg::BatchChosen(file) => submit_batch(&mut state, file),
        Msg::PageRequested(page) => request_page(&mut state, page),
        Msg::ResetClicked => {
            let was_armed = state.disarm_scheduler();
            state.reset();
            if was_armed {
                vec![Effect::DisarmScheduler]
            } else {
                Vec::new()
            }
        }
        Msg::Tick => tick(&mut state),
        Msg::RequirementUploaded { ticket, result } => {
            upload_answered(&mut state, StageKind::Requirement, ticket, result)
        }
        Msg::BatchUploaded { ticket, result } => {
            upload_answered(&mut state, StageKind::Batch, ticket, result)
        }
        Msg::RequirementPolled { job_id, result } => requirement_polled(&mut state, job_id, result),
        Msg::BatchPolled { job_id, result } => batch_polled(&mut state, job_id, result),
        Msg::ResultsFetched {
            batch_id,
            page,
            result,
        } => results_fetched(&mut state, batch_id, page, result),
    };

    (state, effects)
}

fn submit_requirement(state: &mut OrchestratorState, file: UploadFile) -> Vec<Effect> {
    match state.stage_status(StageKind::Requirement) {
        StageStatus::Submitting | StageStatus::Polling => Vec::new(),
        StageStatus::Ready => {
            reject(state, NOTICE_RESET_REQUIREMENT);
            Vec::new()
        }
        StageStatus::Idle | StageStatus::Failed => {
            let ticket = state.issue_ticket();
            state.begin_submission(StageKind::Requirement, ticket, file.name.clone());
            vec![Effect::UploadRequirement { ticket, file }]
        }
    }
}

fn submit_batch(state: &mut OrchestratorState, file: UploadFile) -> Vec<Effect> {
    let requirement_id = match (
        state.stage_status(StageKind::Requirement),
        state.job_handle(StageKind::Requirement).id(),
    ) {
        (StageStatus::Ready, Some(id)) => id,
        _ => {
            reject(state, NOTICE_REQUIREMENT_FIRST);
            return Vec::new();
        }
    };

    match state.stage_status(StageKind::Batch) {
        // Repeated picks while an upload is running are dropped.
        StageStatus::Submitting | StageStatus::Polling => Vec::new(),
        StageStatus::Ready => {
            reject(state, NOTICE_RESET_BATCH);
            Vec::new()
        }
        StageStatus::Idle | StageStatus::Failed => {
            let ticket = state.issue_ticket();
            state.begin_submission(StageKind::Batch, ticket, file.name.clone());
            vec![Effect::UploadBatch {
                ticket,
                requirement_id,
                file,
            }]
        }
    }
}

fn upload_answered(
    state: &mut OrchestratorState,
    stage: StageKind,
    ticket: Ticket,
    result: Result<JobId, ServiceError>,
) -> Vec<Effect> {
    let current = state.stage(stage);
    if current.status != StageStatus::Submitting || current.ticket != Some(ticket) {
        return Vec::new();
    }

    match result {
        Ok(job_id) => {
            state.submission_accepted(stage, job_id);
            if state.arm_scheduler() {
                vec![Effect::ArmScheduler]
            } else {
                Vec::new()
            }
        }
        Err(err) => {
            state.mark_failed(stage);
            state.set_error(&OrchestratorError::from(err));
            Vec::new()
        }
    }
}

fn tick(state: &mut OrchestratorState) -> Vec<Effect> {
    if !state.any_polling() {
        return if state.disarm_scheduler() {
            vec![Effect::DisarmScheduler]
        } else {
            Vec::new()
        };
    }

    let (requirement, batch) = state.take_poll_targets();
    let plan = PollPlan { requirement, batch };
    if plan.is_empty() {
        Vec::new()
    } else {
        vec![Effect::Poll(plan)]
    }
}

/// True when a poll answer belongs to the job this stage is currently polling.
fn poll_is_current(state: &OrchestratorState, stage: StageKind, job_id: JobId) -> bool {
    let current = state.stage(stage);
    current.status == StageStatus::Polling && current.handle.matches(job_id)
}

fn requirement_polled(
    state: &mut OrchestratorState,
    job_id: JobId,
    result: Result<RequirementStatusReport, ServiceError>,
) -> Vec<Effect> {
    if !poll_is_current(state, StageKind::Requirement, job_id) {
        return Vec::new();
    }
    state.poll_answered(StageKind::Requirement);

    match result {
        Ok(report) => match report.status.as_str() {
            "success" | "processed_jd" => {
                state.mark_ready(StageKind::Requirement);
                let title = report
                    .title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string());
                state.set_title(title);
            }
            "failed_jd" => {
                state.mark_failed(StageKind::Requirement);
                state.set_error(&OrchestratorError::JobFailed {
                    stage: StageKind::Requirement,
                });
            }
            _ => {}
        },
        Err(err) => fail_session(state, err),
    }
    Vec::new()
}

fn batch_polled(
    state: &mut OrchestratorState,
    job_id: JobId,
    result: Result<BatchStatusReport, ServiceError>,
) -> Vec<Effect> {
    if !poll_is_current(state, StageKind::Batch, job_id) {
        return Vec::new();
    }
    state.poll_answered(StageKind::Batch);

    match result {
        Ok(report) => match report.status.as_str() {
            "completed" => {
                state.mark_ready(StageKind::Batch);
                state.request_page(1);
                return vec![Effect::FetchResults {
                    batch_id: job_id,
                    page: 1,
                }];
            }
            "failed" => {
                state.mark_failed(StageKind::Batch);
                state.set_error(&OrchestratorError::JobFailed {
                    stage: StageKind::Batch,
                });
            }
            _ => {}
        },
        Err(err) => fail_session(state, err),
    }
    Vec::new()
}

/// A failed status check ends the whole session: every stage that has left
/// `Idle` is forced to `Failed`. The scheduler disarms on the next tick.
fn fail_session(state: &mut OrchestratorState, err: ServiceError) {
    for stage in [StageKind::Requirement, StageKind::Batch] {
        if state.stage_status(stage) != StageStatus::Idle {
            state.mark_failed(stage);
        }
    }
    state.set_error(&OrchestratorError::Transport(format!(
        "Polling error: {}",
        err.message
    )));
}

fn request_page(state: &mut OrchestratorState, page: u32) -> Vec<Effect> {
    let batch_id = match (
        state.stage_status(StageKind::Batch),
        state.job_handle(StageKind::Batch).id(),
    ) {
        (StageStatus::Ready, Some(id)) => id,
        _ => {
            reject(state, NOTICE_RESULTS_NOT_READY);
            return Vec::new();
        }
    };
    if page == 0 {
        reject(state, NOTICE_PAGE_START);
        return Vec::new();
    }

    state.request_page(page);
    vec![Effect::FetchResults { batch_id, page }]
}

fn results_fetched(
    state: &mut OrchestratorState,
    batch_id: JobId,
    page: u32,
    result: Result<ResultsPage, ServiceError>,
) -> Vec<Effect> {
    let current = state.stage(StageKind::Batch);
    if current.status != StageStatus::Ready
        || !current.handle.matches(batch_id)
        || state.pending_page() != Some(page)
    {
        return Vec::new();
    }

    match result {
        Ok(results) => {
            state.apply_page(page, results);
            state.set_notice(NOTICE_RESULTS_LOADED);
        }
        Err(err) => {
            // Keep whatever page is already on screen.
            state.page_failed();
            state.set_error(&OrchestratorError::from(err));
        }
    }
    Vec::new()
}

/// Out-of-sequence command: surfaced as a notice, state otherwise untouched.
fn reject(state: &mut OrchestratorState, message: &str) {
    state.set_notice(OrchestratorError::precondition(message).to_string());
}
