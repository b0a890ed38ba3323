//! Task scheduling on the tokio runtime
//!
//! A thin layer over `tokio::spawn` that gives broadcast groups and the
//! supervisor cancellable handles for repeating and delayed work.
//!
//! # Timing
//!
//! Repeating tasks first fire one full period after they are scheduled and
//! then once per period. Missed ticks are delayed rather than bunched, so a
//! task's body never runs concurrently with itself.
//!
//! # Cancellation
//!
//! [`ScheduledTask::cancel`] aborts the underlying tokio task. Abort only
//! takes effect at an `.await` point, so a tick whose body does not await
//! always runs to completion. Dropping a [`ScheduledTask`] cancels it.

pub mod error;

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub use error::{SchedulerError, SchedulerResult};

/// Spawns periodic and delayed tasks onto a tokio runtime
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    /// Create a scheduler bound to a runtime handle
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler bound to the runtime of the calling context
    pub fn current() -> SchedulerResult<Self> {
        Ok(Self::new(Handle::try_current()?))
    }

    /// Run `tick` every `period`, starting one period from now
    pub fn schedule_repeating<F, Fut>(
        &self,
        period: Duration,
        mut tick: F,
    ) -> SchedulerResult<ScheduledTask>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(SchedulerError::invalid_period(period));
        }

        let handle = self.handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });

        Ok(ScheduledTask::new(handle))
    }

    /// Run `task` once after `delay`
    pub fn schedule_delayed<Fut>(&self, delay: Duration, task: Fut) -> ScheduledTask
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        ScheduledTask::new(handle)
    }
}

/// Handle to a scheduled task
///
/// Cancels the task when dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Stop future runs of the task
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// True once the task has completed or been cancelled and unwound
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
