use crate::view_model::{DashboardView, ResultCardView, StageView};
use crate::{OrchestratorError, PageInfo, RankedItem, ResultsPage};

pub type JobId = u64;

/// Title shown when the service parsed the requirement but returned no title.
pub const DEFAULT_JOB_TITLE: &str = "Job Title Extracted";

/// Monotonic submission counter. Upload responses echo it back so a response
/// issued before a reset can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageStatus {
    #[default]
    Idle,
    Submitting,
    Polling,
    Ready,
    Failed,
}

impl StageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StageStatus::Ready | StageStatus::Failed)
    }

    pub fn is_busy(self) -> bool {
        matches!(self, StageStatus::Submitting | StageStatus::Polling)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Requirement,
    Batch,
}

impl StageKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            StageKind::Requirement => "Failed to process the requirement document.",
            StageKind::Batch => "Failed to rank the candidate batch.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobHandle {
    id: Option<JobId>,
}

impl JobHandle {
    pub fn id(&self) -> Option<JobId> {
        self.id
    }

    pub fn matches(&self, job_id: JobId) -> bool {
        self.id == Some(job_id)
    }
}

/// Error or notice. Only one is ever shown; the latest write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Error(String),
    Notice(String),
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Error(message) | Banner::Notice(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct StageState {
    pub(crate) status: StageStatus,
    pub(crate) handle: JobHandle,
    pub(crate) ticket: Option<Ticket>,
    pub(crate) poll_in_flight: bool,
    pub(crate) file_name: Option<String>,
}

impl StageState {
    fn view(&self) -> StageView {
        StageView {
            status: self.status,
            job_id: self.handle.id,
            file_name: self.file_name.clone(),
        }
    }

    /// True when a tick should issue a status check for this stage.
    fn wants_poll(&self) -> Option<JobId> {
        if self.status == StageStatus::Polling && !self.poll_in_flight {
            self.handle.id
        } else {
            None
        }
    }
}

/// Aggregate state of both stages, the result cache and the banner.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorState {
    requirement: StageState,
    batch: StageState,
    title: Option<String>,
    results: Vec<RankedItem>,
    page_info: PageInfo,
    current_page: u32,
    pending_page: Option<u32>,
    banner: Option<Banner>,
    scheduler_armed: bool,
    next_ticket: u64,
    dirty: bool,
}

impl Default for OrchestratorState {
    fn default() -> Self {
        Self {
            requirement: StageState::default(),
            batch: StageState::default(),
            title: None,
            results: Vec::new(),
            page_info: PageInfo::default(),
            current_page: 1,
            pending_page: None,
            banner: None,
            scheduler_armed: false,
            next_ticket: 0,
            dirty: false,
        }
    }
}

impl OrchestratorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            requirement: self.requirement.view(),
            batch: self.batch.view(),
            title: self.title.clone(),
            can_submit_batch: self.requirement.status == StageStatus::Ready
                && matches!(self.batch.status, StageStatus::Idle | StageStatus::Failed),
            results: self.results.iter().map(ResultCardView::from_item).collect(),
            current_page: self.current_page,
            page_info: self.page_info,
            banner: self.banner.clone(),
            scheduler_armed: self.scheduler_armed,
        }
    }

    pub fn stage_status(&self, stage: StageKind) -> StageStatus {
        self.stage(stage).status
    }

    pub fn job_handle(&self, stage: StageKind) -> JobHandle {
        self.stage(stage).handle
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn results(&self) -> &[RankedItem] {
        &self.results
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn is_scheduler_armed(&self) -> bool {
        self.scheduler_armed
    }

    pub fn any_polling(&self) -> bool {
        self.requirement.status == StageStatus::Polling || self.batch.status == StageStatus::Polling
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn stage(&self, stage: StageKind) -> &StageState {
        match stage {
            StageKind::Requirement => &self.requirement,
            StageKind::Batch => &self.batch,
        }
    }

    fn stage_mut(&mut self, stage: StageKind) -> &mut StageState {
        self.dirty = true;
        match stage {
            StageKind::Requirement => &mut self.requirement,
            StageKind::Batch => &mut self.batch,
        }
    }

    pub(crate) fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    pub(crate) fn begin_submission(&mut self, stage: StageKind, ticket: Ticket, file_name: String) {
        let state = self.stage_mut(stage);
        state.status = StageStatus::Submitting;
        state.handle = JobHandle::default();
        state.ticket = Some(ticket);
        state.poll_in_flight = false;
        state.file_name = Some(file_name);
        self.banner = None;
    }

    pub(crate) fn submission_accepted(&mut self, stage: StageKind, job_id: JobId) {
        let state = self.stage_mut(stage);
        state.status = StageStatus::Polling;
        state.handle = JobHandle { id: Some(job_id) };
        state.ticket = None;
    }

    pub(crate) fn mark_ready(&mut self, stage: StageKind) {
        let state = self.stage_mut(stage);
        state.status = StageStatus::Ready;
        state.poll_in_flight = false;
    }

    pub(crate) fn mark_failed(&mut self, stage: StageKind) {
        let state = self.stage_mut(stage);
        let was_ready = state.status == StageStatus::Ready;
        state.status = StageStatus::Failed;
        state.ticket = None;
        state.poll_in_flight = false;
        if stage == StageKind::Batch && was_ready {
            self.clear_results();
        }
    }

    pub(crate) fn poll_answered(&mut self, stage: StageKind) {
        self.stage_mut(stage).poll_in_flight = false;
    }

    /// Marks the stages due for a status check as in flight and returns their ids.
    pub(crate) fn take_poll_targets(&mut self) -> (Option<JobId>, Option<JobId>) {
        let requirement = self.requirement.wants_poll();
        let batch = self.batch.wants_poll();
        if requirement.is_some() {
            self.stage_mut(StageKind::Requirement).poll_in_flight = true;
        }
        if batch.is_some() {
            self.stage_mut(StageKind::Batch).poll_in_flight = true;
        }
        (requirement, batch)
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, err: &OrchestratorError) {
        self.banner = Some(Banner::Error(err.to_string()));
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, message: impl Into<String>) {
        self.banner = Some(Banner::Notice(message.into()));
        self.dirty = true;
    }

    /// Arms the scheduler; returns false when it was already armed.
    pub(crate) fn arm_scheduler(&mut self) -> bool {
        let newly_armed = !self.scheduler_armed;
        self.scheduler_armed = true;
        newly_armed
    }

    /// Disarms the scheduler; returns false when it was not armed.
    pub(crate) fn disarm_scheduler(&mut self) -> bool {
        let was_armed = self.scheduler_armed;
        self.scheduler_armed = false;
        if was_armed {
            self.dirty = true;
        }
        was_armed
    }

    pub(crate) fn pending_page(&self) -> Option<u32> {
        self.pending_page
    }

    pub(crate) fn request_page(&mut self, page: u32) {
        self.pending_page = Some(page);
    }

    pub(crate) fn apply_page(&mut self, page: u32, results: ResultsPage) {
        self.results = results.items;
        self.page_info = results.info;
        self.current_page = page;
        self.pending_page = None;
        self.dirty = true;
    }

    pub(crate) fn page_failed(&mut self) {
        self.pending_page = None;
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.page_info = PageInfo::default();
        self.current_page = 1;
        self.pending_page = None;
    }

    /// Back to the initial state. The ticket counter survives so responses
    /// to pre-reset uploads stay recognizably stale.
    pub(crate) fn reset(&mut self) {
        let next_ticket = self.next_ticket;
        *self = Self {
            next_ticket,
            dirty: true,
            ..Self::default()
        };
    }
}
