//! Status polling with explicit cancellation.
//!
//! One poller is active per job at most. Each query is scheduled a fixed
//! delay after the previous query's result was delivered, so a slow query
//! never overlaps the next one. A terminal status or a query error stops
//! the loop; `stop` cancels both an in-flight query and a pending delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use tcoder_client::{ClientResult, TranscodeService};
use tcoder_models::{Job, JobId};

/// Delay between a status query's completion and the next query.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// One status query result, tagged so the session can reject updates from a
/// superseded job.
#[derive(Debug)]
pub struct PollUpdate {
    /// Session generation the poller was started under
    pub generation: u64,
    /// Job the query was issued for
    pub job_id: JobId,
    /// Query outcome
    pub result: ClientResult<Job>,
}

struct PollerHandle {
    job_id: JobId,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Cancellable poll loop over a single job.
pub struct StatusPoller {
    interval: Duration,
    handle: Option<PollerHandle>,
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Whether a poll task is currently running.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// The job being polled, if any.
    pub fn active_job(&self) -> Option<&JobId> {
        self.handle.as_ref().map(|h| &h.job_id)
    }

    /// Start polling `job_id`, stopping any previous poll task first.
    ///
    /// Updates are delivered through `tx`. The task stops on its own after
    /// forwarding a terminal status or a query error, and never sends
    /// anything once stopped.
    pub fn start(
        &mut self,
        service: Arc<dyn TranscodeService>,
        job_id: JobId,
        generation: u64,
        tx: mpsc::UnboundedSender<PollUpdate>,
    ) {
        self.stop();

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.interval;
        let poll_job = job_id.clone();

        debug!(job_id = %job_id, generation, "Starting status poller");

        let task = tokio::spawn(async move {
            loop {
                let result = tokio::select! {
                    _ = stop_rx.changed() => break,
                    result = service.get_status(&poll_job) => result,
                };

                let terminal = match &result {
                    Ok(job) => job.is_terminal(),
                    Err(_) => true,
                };

                let update = PollUpdate {
                    generation,
                    job_id: poll_job.clone(),
                    result,
                };
                if tx.send(update).is_err() {
                    break;
                }
                if terminal {
                    debug!(job_id = %poll_job, "Poller reached terminal result, stopping");
                    break;
                }

                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });

        self.handle = Some(PollerHandle {
            job_id,
            stop_tx,
            task,
        });
    }

    /// Stop polling. Cancels a pending delay and discards an in-flight
    /// query; no update is delivered after this returns. Safe to call when
    /// nothing is running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.stop_tx.send(true);
            handle.task.abort();
            debug!(job_id = %handle.job_id, "Stopped status poller");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
