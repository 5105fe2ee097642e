//! Process-wide recurring-job runner.
//!
//! Named jobs are bound to cron expressions and fired on a shared UTC
//! clock, so schedules mean the same thing regardless of host timezone.
//! Every due firing is spawned on its own tokio task: firings may overlap
//! a still-running previous invocation, and a job that fails or panics is
//! logged without stopping the scheduler or the other jobs. There is no
//! retry; the next scheduled tick is the only recovery.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dutybot_core::errors::{DutyError, DutyResult};
use tokio::sync::watch;
use uuid::Uuid;

pub type JobFuture = Pin<Box<dyn Future<Output = eyre::Result<()>> + Send>>;
/// A zero-argument job callback. Must be safe to run concurrently with a
/// still-running previous invocation.
pub type Job = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// How often registered tasks are evaluated for due firings. Tasks added
/// after `start()` take effect on the next tick.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Opaque task identity, kept for potential future cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(Uuid);

struct ScheduledTask {
    name: String,
    schedule: cron::Schedule,
    next_run: Option<DateTime<Utc>>,
    job: Job,
}

pub struct TaskScheduler {
    tasks: Arc<Mutex<Vec<ScheduledTask>>>,
    shutdown: watch::Sender<bool>,
    started: AtomicBool,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            tasks: Arc::new(Mutex::new(Vec::new())),
            shutdown,
            started: AtomicBool::new(false),
        }
    }

    /// Register a named job. Legal both before and after `start()`.
    pub fn add_task(&self, expression: &str, name: &str, job: Job) -> DutyResult<TaskHandle> {
        let schedule = parse_schedule(expression)?;
        let id = Uuid::new_v4();

        tracing::debug!(task = name, %expression, "Registering task");
        lock_tasks(&self.tasks).push(ScheduledTask {
            name: name.to_string(),
            schedule,
            next_run: None,
            job,
        });

        Ok(TaskHandle(id))
    }

    /// Begin firing jobs, asynchronously relative to the caller. Calling
    /// `start` more than once is a no-op.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let tasks = Arc::clone(&self.tasks);
        let mut shutdown = self.shutdown.subscribe();

        tokio::spawn(async move {
            loop {
                let due = collect_due(&tasks, Utc::now());
                for (name, job) in due {
                    tokio::spawn(run_job(name, job));
                }

                tokio::select! {
                    _ = tokio::time::sleep(TICK_INTERVAL) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("Task scheduler stopped");
        });
    }

    /// Halt all future firings. A job already in progress is not
    /// interrupted.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

fn lock_tasks(
    tasks: &Mutex<Vec<ScheduledTask>>,
) -> std::sync::MutexGuard<'_, Vec<ScheduledTask>> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

fn collect_due(
    tasks: &Mutex<Vec<ScheduledTask>>,
    now: DateTime<Utc>,
) -> Vec<(String, Job)> {
    let mut guard = lock_tasks(tasks);
    let mut due = Vec::new();

    for task in guard.iter_mut() {
        if task.next_run.is_none() {
            task.next_run = task.schedule.after(&now).next();
        }
        if task.next_run.is_some_and(|at| at <= now) {
            due.push((task.name.clone(), Arc::clone(&task.job)));
            task.next_run = task.schedule.after(&now).next();
        }
    }
    due
}

async fn run_job(name: String, job: Job) {
    tracing::debug!(task = %name, "Firing task");
    // The extra spawn confines a panicking job to its own task.
    match tokio::spawn(job()).await {
        Ok(Ok(())) => tracing::debug!(task = %name, "Task finished"),
        Ok(Err(err)) => tracing::error!(task = %name, error = %err, "Task failed"),
        Err(err) => tracing::error!(task = %name, error = %err, "Task panicked"),
    }
}

/// The `cron` crate wants 6-field (second-granularity) expressions;
/// standard 5-field minute-granularity input gets a leading "0".
fn normalize_schedule(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let normalized = fields.join(" ");
    if fields.len() == 5 {
        format!("0 {normalized}")
    } else {
        normalized
    }
}

fn parse_schedule(expression: &str) -> DutyResult<cron::Schedule> {
    let normalized = normalize_schedule(expression);
    cron::Schedule::from_str(&normalized)
        .map_err(|err| DutyError::InvalidSchedule(format!("{expression}: {err}")))
}
