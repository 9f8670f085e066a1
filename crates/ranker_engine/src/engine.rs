use std::sync::Arc;
use std::time::Duration;

use ranker_core::{update, DashboardView, Effect, Msg, OrchestratorState, PollPlan, UploadFile};
use ranker_logging::{ranker_debug, ranker_info, ranker_warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{JobService, PollScheduler};

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub poll_interval: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
        }
    }
}

/// Façade over the orchestration actor.
///
/// Commands are queued into the actor's mailbox; the latest state snapshot is
/// published on a watch channel. Dropping the façade stops the actor and
/// releases the poll timer.
pub struct Orchestrator {
    msg_tx: mpsc::UnboundedSender<Msg>,
    view_rx: watch::Receiver<DashboardView>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Orchestrator {
    /// Starts the actor on the current tokio runtime.
    pub fn spawn(service: Arc<dyn JobService>, settings: OrchestratorSettings) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let state = OrchestratorState::new();
        let (view_tx, view_rx) = watch::channel(state.view());
        let shutdown = CancellationToken::new();

        let actor = Actor {
            state,
            service,
            mailbox: msg_tx.clone(),
            scheduler: PollScheduler::new(settings.poll_interval),
            view_tx,
        };
        let task = tokio::spawn(actor.run(msg_rx, shutdown.clone()));

        Self {
            msg_tx,
            view_rx,
            shutdown,
            task: Some(task),
        }
    }

    pub fn submit_requirement(&self, file: UploadFile) {
        self.dispatch(Msg::RequirementChosen(file));
    }

    pub fn submit_batch(&self, file: UploadFile) {
        self.dispatch(Msg::BatchChosen(file));
    }

    pub fn request_page(&self, page: u32) {
        self.dispatch(Msg::PageRequested(page));
    }

    pub fn reset(&self) {
        self.dispatch(Msg::ResetClicked);
    }

    /// Latest published snapshot.
    pub fn view(&self) -> DashboardView {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view_rx.clone()
    }

    /// Waits for the first snapshot satisfying `predicate`.
    pub async fn wait_until<F>(&self, mut predicate: F) -> DashboardView
    where
        F: FnMut(&DashboardView) -> bool,
    {
        let mut rx = self.view_rx.clone();
        let view = match rx.wait_for(|view| predicate(view)).await {
            Ok(view) => view.clone(),
            Err(_) => self.view(),
        };
        view
    }

    /// Stops the actor and waits for it to release its resources.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                ranker_warn!("orchestrator task ended abnormally: {}", err);
            }
        }
    }

    fn dispatch(&self, msg: Msg) {
        if self.msg_tx.send(msg).is_err() {
            ranker_warn!("orchestrator mailbox closed; command dropped");
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Owns the state; the only place `update` runs.
struct Actor {
    state: OrchestratorState,
    service: Arc<dyn JobService>,
    mailbox: mpsc::UnboundedSender<Msg>,
    scheduler: PollScheduler,
    view_tx: watch::Sender<DashboardView>,
}

impl Actor {
    async fn run(mut self, mut msg_rx: mpsc::UnboundedReceiver<Msg>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = msg_rx.recv() => match msg {
                    Some(msg) => self.handle(msg),
                    None => break,
                },
            }
        }
        self.scheduler.disarm();
        ranker_debug!("orchestrator stopped");
    }

    fn handle(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.view_tx.send_replace(state.view());
        }
        self.state = state;

        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::UploadRequirement { ticket, file } => {
                ranker_info!("uploading requirement {} ({} bytes)", file.name, file.bytes.len());
                let service = self.service.clone();
                let mailbox = self.mailbox.clone();
                tokio::spawn(async move {
                    let result = service.submit_requirement(&file).await;
                    deliver(&mailbox, Msg::RequirementUploaded { ticket, result });
                });
            }
            Effect::UploadBatch {
                ticket,
                requirement_id,
                file,
            } => {
                ranker_info!(
                    "uploading batch {} ({} bytes) for requirement {}",
                    file.name,
                    file.bytes.len(),
                    requirement_id
                );
                let service = self.service.clone();
                let mailbox = self.mailbox.clone();
                tokio::spawn(async move {
                    let result = service.submit_batch(requirement_id, &file).await;
                    deliver(&mailbox, Msg::BatchUploaded { ticket, result });
                });
            }
            Effect::Poll(plan) => {
                let service = self.service.clone();
                let mailbox = self.mailbox.clone();
                tokio::spawn(poll(service, mailbox, plan));
            }
            Effect::FetchResults { batch_id, page } => {
                ranker_info!("fetching ranked results for batch {} page {}", batch_id, page);
                let service = self.service.clone();
                let mailbox = self.mailbox.clone();
                tokio::spawn(async move {
                    let result = service.ranked_results(batch_id, page).await;
                    deliver(
                        &mailbox,
                        Msg::ResultsFetched {
                            batch_id,
                            page,
                            result,
                        },
                    );
                });
            }
            Effect::ArmScheduler => self.scheduler.arm(self.mailbox.clone()),
            Effect::DisarmScheduler => self.scheduler.disarm(),
        }
    }
}

/// One tick's status checks: Stage A's answer is queued before Stage B's
/// request goes out, so the reducer always sees them in that order.
async fn poll(service: Arc<dyn JobService>, mailbox: mpsc::UnboundedSender<Msg>, plan: PollPlan) {
    if let Some(job_id) = plan.requirement {
        let result = service.requirement_status(job_id).await;
        match &result {
            Ok(report) => ranker_debug!("requirement {} status {}", job_id, report.status),
            Err(err) => ranker_warn!("requirement {} poll failed: {}", job_id, err),
        }
        deliver(&mailbox, Msg::RequirementPolled { job_id, result });
    }
    if let Some(job_id) = plan.batch {
        let result = service.batch_status(job_id).await;
        match &result {
            Ok(report) => ranker_debug!("batch {} status {}", job_id, report.status),
            Err(err) => ranker_warn!("batch {} poll failed: {}", job_id, err),
        }
        deliver(&mailbox, Msg::BatchPolled { job_id, result });
    }
}

fn deliver(mailbox: &mpsc::UnboundedSender<Msg>, msg: Msg) {
    // Receiver gone means the orchestrator shut down; the answer is moot.
    let _ = mailbox.send(msg);
}
