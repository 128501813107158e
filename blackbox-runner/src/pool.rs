//! Bounded task pool
//!
//! Runs a fixed batch of generation tasks with at most `concurrency_limit`
//! calls in flight and one absolute deadline for the whole batch. Workers
//! report outcomes over a channel; the aggregator counts arrivals into one
//! slot per task and returns only once every slot is filled.
//!
//! A task still running (or still waiting for a permit) when the deadline
//! passes is recorded as [`ErrorKind::Timeout`] and its call is dropped, so
//! `run` never outlives the deadline by more than scheduling latency.

use blackbox_client::{GenerationClient, GenerationOptions};
use blackbox_core::domain::error::ErrorKind;
use blackbox_core::domain::task::{Phase, PhaseResult, Task, TaskOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{PoolError, generation_error};

/// Turns a raw completion into the text recorded for the task
pub type PostProcess = fn(&str) -> Result<String, ErrorKind>;

/// Executes batches of generation tasks under a concurrency ceiling
pub struct TaskPool {
    client: Arc<dyn GenerationClient>,
    concurrency_limit: usize,
    options: GenerationOptions,
    post_process: Option<PostProcess>,
}

impl TaskPool {
    /// Creates a pool admitting at most `concurrency_limit` concurrent calls
    pub fn new(
        client: Arc<dyn GenerationClient>,
        concurrency_limit: usize,
    ) -> Result<Self, PoolError> {
        if concurrency_limit == 0 {
            return Err(PoolError::InvalidConcurrency);
        }

        Ok(Self {
            client,
            concurrency_limit,
            options: GenerationOptions::default(),
            post_process: None,
        })
    }

    /// Sampling options used for every call of a batch
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Applied to each completion inside the worker; an `Err` fails the task
    pub fn with_post_process(mut self, post_process: PostProcess) -> Self {
        self.post_process = Some(post_process);
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Runs `tasks` with a deadline of `timeout` from now
    pub async fn run(&self, tasks: Vec<Task>, timeout: Duration) -> Result<PhaseResult, PoolError> {
        self.run_until(tasks, Instant::now() + timeout).await
    }

    /// Runs `tasks` until every task has an outcome or `deadline` passes
    ///
    /// Returns exactly one outcome per task, ordered by task index. Dropping
    /// the returned future aborts every outstanding call.
    pub async fn run_until(
        &self,
        tasks: Vec<Task>,
        deadline: Instant,
    ) -> Result<PhaseResult, PoolError> {
        let phase = validate_batch(&tasks)?;
        let total = tasks.len();
        let indices: Vec<usize> = tasks.iter().map(|t| t.index).collect();
        let started = Instant::now();

        info!(
            "Running {} {} task(s) with concurrency limit {}",
            total, phase, self.concurrency_limit
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let (tx, mut rx) = mpsc::channel::<(usize, TaskOutcome)>(total);
        let mut workers = JoinSet::new();

        for (slot, task) in tasks.into_iter().enumerate() {
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            let options = self.options;
            let post_process = self.post_process;

            workers.spawn(async move {
                let outcome =
                    execute_task(client, semaphore, task, options, post_process, deadline).await;
                // Fails only if the run was dropped, in which case nobody is waiting
                let _ = tx.send((slot, outcome)).await;
            });
        }

        // Workers hold the only senders left, so the channel closes once all have exited
        drop(tx);

        let mut slots: Vec<Option<TaskOutcome>> = vec![None; total];
        let mut received = 0;

        while received < total {
            match rx.recv().await {
                Some((slot, outcome)) => {
                    slots[slot] = Some(outcome);
                    received += 1;
                }
                None => break,
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!("Generation worker panicked: {}", e);
            }
        }

        let outcomes: Vec<TaskOutcome> = slots
            .into_iter()
            .zip(indices)
            .map(|(slot, index)| {
                slot.unwrap_or_else(|| {
                    TaskOutcome::failed(
                        index,
                        ErrorKind::upstream("worker terminated without reporting"),
                    )
                })
            })
            .collect();

        let result = PhaseResult::new(phase, outcomes);

        info!(
            "Finished {} {} task(s) in {:.2}s ({} failed)",
            total,
            phase,
            started.elapsed().as_secs_f64(),
            result.failures
        );

        Ok(result)
    }
}

/// Checks the batch and returns its phase
fn validate_batch(tasks: &[Task]) -> Result<Phase, PoolError> {
    let first = tasks.first().ok_or(PoolError::EmptyBatch)?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.phase != first.phase {
            return Err(PoolError::MixedPhases);
        }
        if !seen.insert(task.index) {
            return Err(PoolError::DuplicateIndex(task.index));
        }
    }

    Ok(first.phase)
}

/// Runs one task, bounded by `deadline` from permit wait to post-processing
async fn execute_task(
    client: Arc<dyn GenerationClient>,
    semaphore: Arc<Semaphore>,
    task: Task,
    options: GenerationOptions,
    post_process: Option<PostProcess>,
    deadline: Instant,
) -> TaskOutcome {
    let index = task.index;
    let phase = task.phase;
    let attempt = attempt_task(client, semaphore, task, options, post_process);

    match tokio::time::timeout_at(deadline, attempt).await {
        Ok(Ok(text)) => {
            debug!("{} task {} completed", phase, index);
            TaskOutcome::completed(index, text)
        }
        Ok(Err(error)) => {
            warn!("{} task {} failed: {}", phase, index, error);
            TaskOutcome::failed(index, error)
        }
        Err(_) => {
            warn!("{} task {} timed out", phase, index);
            TaskOutcome::failed(index, ErrorKind::Timeout)
        }
    }
}

async fn attempt_task(
    client: Arc<dyn GenerationClient>,
    semaphore: Arc<Semaphore>,
    task: Task,
    options: GenerationOptions,
    post_process: Option<PostProcess>,
) -> Result<String, ErrorKind> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| ErrorKind::upstream("task pool closed"))?;

    debug!("Starting {} task {}", task.phase, task.index);

    let text = client
        .generate(&task.prompt, options)
        .await
        .map_err(generation_error)?;

    match post_process {
        Some(process) => process(&text),
        None => Ok(text),
    }
}
