//! Submit, bounded poll and result fetch for a single run.

use core::time::Duration;
use std::sync::Arc;

use actor_structs::{DatasetItem, Record, Run, RunRequestOptions, RunStatus};
use async_trait::async_trait;
use config::Config;
use platform_client::ActorPlatform;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::BridgeError;

/// Caller-driven stop signal; sending `true` stops the poll loop.
pub type CancelSignal = watch::Receiver<bool>;

/// Creates a stop signal and the sender that triggers it.
#[must_use]
pub fn cancel_signal() -> (watch::Sender<bool>, CancelSignal) {
    watch::channel(false)
}

/// Resolves once `true` is sent; never resolves if the sender is gone.
async fn cancellation(signal: &mut CancelSignal) {
    let requested = signal.wait_for(|cancelled| *cancelled).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}

/// Time source for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed polling cadence and wall-clock bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            ceiling: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for PollPolicy {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.poll_interval,
            ceiling: config.poll_ceiling,
        }
    }
}

/// Why the poll loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PollOutcome {
    /// The run reached a terminal status
    Completed,
    /// The ceiling elapsed while the run was still going
    CeilingReached,
    /// The caller cancelled before the run finished
    Cancelled,
}

/// Final state of an execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Last observed run, possibly non-terminal
    pub run: Run,

    /// Dataset items, only for succeeded runs whose dataset could be fetched
    pub results: Option<Vec<DatasetItem>>,

    pub outcome: PollOutcome,
}

/// Runs an actor and waits a bounded time for its results.
pub struct RunExecutor {
    platform: Arc<dyn ActorPlatform>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl RunExecutor {
    #[must_use]
    pub fn new(
        platform: Arc<dyn ActorPlatform>,
        clock: Arc<dyn Clock>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            platform,
            clock,
            policy,
        }
    }

    /// Submits a run and polls it until it finishes, the ceiling elapses or
    /// `cancel` turns `true`.
    ///
    /// Reaching the ceiling is not an error: the last observed run is
    /// returned with [`PollOutcome::CeilingReached`]. Cancelling stops the
    /// polling only; the remote run keeps going.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ExecutionSubmitFailure`] if the run cannot be
    /// created.
    pub async fn execute(
        &self,
        actor_id: &str,
        input: &Record,
        options: &RunRequestOptions,
        cancel: &CancelSignal,
    ) -> Result<Execution, BridgeError> {
        let mut run = self
            .platform
            .start_run(actor_id, input, options)
            .await
            .map_err(|source| BridgeError::ExecutionSubmitFailure {
                actor_id: actor_id.to_owned(),
                status: source.status(),
                source,
            })?;

        let mut cancel = cancel.clone();
        let started = self.clock.now();
        let mut polls = 0_u32;

        let outcome = loop {
            if run.status.is_terminal() {
                break PollOutcome::Completed;
            }
            if *cancel.borrow() {
                break PollOutcome::Cancelled;
            }
            if self.clock.now().duration_since(started) >= self.policy.ceiling {
                break PollOutcome::CeilingReached;
            }

            let cancelled = tokio::select! {
                () = cancellation(&mut cancel) => true,
                () = self.clock.sleep(self.policy.interval) => false,
            };
            if cancelled {
                break PollOutcome::Cancelled;
            }

            polls += 1;
            match self.platform.get_run(&run.id).await {
                Ok(observed) if run.status.may_advance_to(observed.status) => {
                    debug!(run_id = %run.id, status = %observed.status, polls, "Polled run");
                    run = observed;
                }
                Ok(observed) => {
                    warn!(
                        run_id = %run.id,
                        from = %run.status,
                        to = %observed.status,
                        "Ignoring status regression"
                    );
                }
                Err(error) => {
                    warn!(run_id = %run.id, polls, "Run status poll failed: {error}");
                }
            }
        };

        info!(
            actor_id,
            run_id = %run.id,
            status = %run.status,
            outcome = %outcome,
            polls,
            "Stopped polling run"
        );

        let results = if run.status == RunStatus::Succeeded {
            match self.platform.dataset_items(&run.id).await {
                Ok(items) => Some(items),
                Err(error) => {
                    warn!(run_id = %run.id, "Failed to fetch run results: {error}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Execution {
            run,
            results,
            outcome,
        })
    }
}
