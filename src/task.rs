//! Background task execution
//!
//! Jobs run either on their own tokio task (parallel) or, one at a time, on a
//! shared worker (serial). Fetches additionally go through a [`TaskSlot`] so
//! that at most one of each kind is in flight.

use crate::error::{CatalogError, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// How a background job is scheduled relative to other background jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// Queue behind other serial jobs
    Serial,
    /// Start immediately alongside everything else
    #[default]
    Parallel,
}

/// Lifecycle of a [`TaskSlot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    /// Ready to run
    #[default]
    Idle,
    /// Submitted and not yet finished
    Running,
    /// Finished; the next submission resets the slot first
    Completed,
}

/// Completion handle for a submitted job.
#[derive(Debug)]
pub struct TaskHandle {
    done: oneshot::Receiver<()>,
}

impl TaskHandle {
    /// Wait until the job has finished (or was dropped by a panic).
    pub async fn join(self) {
        let _ = self.done.await;
    }
}

/// Runs background jobs on a tokio runtime.
#[derive(Clone)]
pub struct TaskExecutor {
    runtime: Handle,
    serial: mpsc::UnboundedSender<Job>,
}

impl TaskExecutor {
    /// Executor bound to the runtime of the calling context.
    pub fn current() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CatalogError::NoRuntime)?;
        Ok(Self::new(runtime))
    }

    pub fn new(runtime: Handle) -> Self {
        let (serial, mut queue) = mpsc::unbounded_channel::<Job>();
        runtime.spawn(async move {
            while let Some(job) = queue.recv().await {
                job.await;
            }
        });
        Self { runtime, serial }
    }

    pub fn submit<F>(&self, scheduling: Scheduling, job: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (done_tx, done) = oneshot::channel();
        let job: Job = Box::pin(async move {
            job.await;
            let _ = done_tx.send(());
        });

        match scheduling {
            Scheduling::Parallel => {
                self.runtime.spawn(job);
            }
            Scheduling::Serial => {
                if let Err(rejected) = self.serial.send(job) {
                    warn!("serial worker is gone, running job in parallel");
                    self.runtime.spawn(rejected.0);
                }
            }
        }

        TaskHandle { done }
    }
}

/// Single-occupancy guard for a recurring background job.
pub struct TaskSlot {
    name: &'static str,
    status: Arc<Mutex<TaskStatus>>,
}

/// Marks its slot completed when dropped.
pub struct SlotGuard {
    status: Arc<Mutex<TaskStatus>>,
}

fn lock(status: &Mutex<TaskStatus>) -> MutexGuard<'_, TaskStatus> {
    status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TaskSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: Arc::new(Mutex::new(TaskStatus::Idle)),
        }
    }

    pub fn status(&self) -> TaskStatus {
        *lock(&self.status)
    }

    /// Claim the slot, or `None` if its job is still running.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        let mut status = lock(&self.status);
        match *status {
            TaskStatus::Running => {
                debug!(task = self.name, "task is already running");
                return None;
            }
            TaskStatus::Completed => {
                debug!(task = self.name, "task finished without being reset, resetting");
                *status = TaskStatus::Idle;
            }
            TaskStatus::Idle => {}
        }

        *status = TaskStatus::Running;
        Some(SlotGuard {
            status: Arc::clone(&self.status),
        })
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        *lock(&self.status) = TaskStatus::Completed;
    }
}
