use crate::{JobId, Ticket, UploadFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadRequirement {
        ticket: Ticket,
        file: UploadFile,
    },
    UploadBatch {
        ticket: Ticket,
        requirement_id: JobId,
        file: UploadFile,
    },
    /// Status checks for one tick, Stage A first.
    Poll(PollPlan),
    FetchResults {
        batch_id: JobId,
        page: u32,
    },
    ArmScheduler,
    DisarmScheduler,
}

/// Which stages to poll on a tick. At most one request per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollPlan {
    pub requirement: Option<JobId>,
    pub batch: Option<JobId>,
}

impl PollPlan {
    pub fn is_empty(&self) -> bool {
        self.requirement.is_none() && self.batch.is_none()
    }
}
