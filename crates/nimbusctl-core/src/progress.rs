//! Progress tracking and task polling for async operations
//!
//! Asynchronous API mutations return task IDs which must be polled until
//! completion. This module provides utilities for that polling with optional
//! progress callbacks for UI updates, and a wait helper that drives a whole
//! task set to its terminal states.

use crate::error::{CoreError, Result};
use nimbus_cloud::tasks::{CreatedResources, Task};
use nimbus_cloud::{CloudClient, TaskHandler, TaskState};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Progress events emitted during async operations
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling for a task is starting
    Started { task_id: String },
    /// Polling iteration with the last observed state
    Polling {
        task_id: String,
        state: TaskState,
        elapsed: Duration,
    },
    /// Task finished successfully
    Completed {
        task_id: String,
        created_resources: Option<CreatedResources>,
    },
    /// Task failed
    Failed { task_id: String, error: String },
}

/// Callback type for progress updates
///
/// CLI can use this to update spinners/progress bars.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll a task until it reaches a terminal state
///
/// # Arguments
///
/// * `client` - The API client
/// * `task_id` - The task ID to poll
/// * `timeout` - Maximum time to wait for completion
/// * `interval` - Time between polling attempts
/// * `on_progress` - Optional callback for progress updates
///
/// # Returns
///
/// The finished task, or an error if the task failed or timed out. The
/// server-reported failure text is carried verbatim in
/// [`CoreError::TaskFailed`].
///
/// # Example
///
/// ```rust,ignore
/// use nimbusctl_core::{poll_task, ProgressEvent};
/// use std::time::Duration;
///
/// // Upload an image (returns a task envelope)
/// let results = handler.upload(&request).await?;
///
/// let completed = poll_task(
///     &client,
///     &results.tasks[0],
///     Duration::from_secs(600),
///     Duration::from_secs(5),
///     None,
/// ).await?;
/// println!("created: {:?}", completed.created_resources);
/// ```
pub async fn poll_task(
    client: &CloudClient,
    task_id: &str,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<&ProgressCallback>,
) -> Result<Task> {
    let start = Instant::now();
    let handler = TaskHandler::new(client.clone());

    emit(
        on_progress,
        ProgressEvent::Started {
            task_id: task_id.to_string(),
        },
    );

    loop {
        let elapsed = start.elapsed();
        if elapsed > timeout {
            return Err(CoreError::TaskTimeout(timeout));
        }

        let task = handler.get(task_id).await?;

        emit(
            on_progress,
            ProgressEvent::Polling {
                task_id: task_id.to_string(),
                state: task.state,
                elapsed,
            },
        );

        match task.state {
            TaskState::Finished => {
                debug!(task_id, elapsed = ?elapsed, "task finished");
                emit(
                    on_progress,
                    ProgressEvent::Completed {
                        task_id: task_id.to_string(),
                        created_resources: task.created_resources.clone(),
                    },
                );
                return Ok(task);
            }
            TaskState::Error => {
                let error = task
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("Task {task_id} failed"));
                warn!(task_id, error = %error, "task failed");

                emit(
                    on_progress,
                    ProgressEvent::Failed {
                        task_id: task_id.to_string(),
                        error: error.clone(),
                    },
                );
                return Err(CoreError::TaskFailed(error));
            }
            // NEW, RUNNING, and states this crate does not know about:
            // still in flight, wait and try again
            _ => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Wait for every task in a set and extract a value from each finished task
///
/// Tasks are polled sequentially, in order, and `timeout` bounds the whole
/// invocation: each task is given whatever remains of the budget. An empty
/// set succeeds immediately without touching the network.
///
/// `extract` runs exactly once per finished task, whether or not
/// `show_result` is set; `show_result` only controls whether the extracted
/// values are returned (`Some(values)`) or discarded (`None`).
///
/// The first task to fail stops the wait: remaining tasks are not polled and
/// the server-reported failure text is returned verbatim.
///
/// # Example
///
/// ```rust,ignore
/// let results = images.upload(&request).await?;
/// let shown = wait_for_tasks(
///     &client,
///     &results.tasks,
///     Duration::from_secs(600),
///     Duration::from_secs(5),
///     None,
///     true,
///     |task| Ok(task.id.clone()),
/// ).await?;
/// ```
pub async fn wait_for_tasks<T, F>(
    client: &CloudClient,
    task_ids: &[String],
    timeout: Duration,
    interval: Duration,
    on_progress: Option<ProgressCallback>,
    show_result: bool,
    mut extract: F,
) -> Result<Option<Vec<T>>>
where
    F: FnMut(&Task) -> Result<T>,
{
    // Nothing submitted means nothing to wait for
    if task_ids.is_empty() {
        return Ok(if show_result { Some(Vec::new()) } else { None });
    }

    let start = Instant::now();
    let mut extracted = Vec::with_capacity(task_ids.len());

    for task_id in task_ids {
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Err(CoreError::TaskTimeout(timeout));
        }

        let task = match poll_task(client, task_id, remaining, interval, on_progress.as_ref()).await
        {
            Ok(task) => task,
            // Report the configured budget, not the per-task remainder
            Err(CoreError::TaskTimeout(_)) => return Err(CoreError::TaskTimeout(timeout)),
            Err(e) => return Err(e),
        };

        extracted.push(extract(&task)?);
    }

    Ok(if show_result {
        Some(extracted)
    } else {
        None
    })
}

/// Helper to emit progress events
fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
