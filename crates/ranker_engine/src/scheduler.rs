use std::time::Duration;

use ranker_core::Msg;
use ranker_logging::{ranker_debug, set_poll_tick};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// The single recurring poll timer of one orchestrator.
///
/// Arming spawns an interval task that feeds `Msg::Tick` into the mailbox;
/// disarming (or dropping the scheduler) aborts it.
pub struct PollScheduler {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl PollScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            task: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Starts ticking. No-op when already armed.
    pub fn arm(&mut self, mailbox: UnboundedSender<Msg>) {
        if self.task.is_some() {
            return;
        }
        let period = self.period;
        ranker_debug!("poll scheduler armed, period {:?}", period);
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick = 0u64;
            loop {
                interval.tick().await;
                tick += 1;
                set_poll_tick(tick);
                if mailbox.send(Msg::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            ranker_debug!("poll scheduler disarmed");
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
