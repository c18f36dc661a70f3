//! Task tracking endpoints
//!
//! Every asynchronous mutation in the API answers with a [`TaskResults`]
//! envelope instead of the resource itself. Callers poll each task by ID
//! until it reaches a terminal state, then read `created_resources` off the
//! finished task to find what the operation produced.

use crate::client::CloudClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle state of an asynchronous task.
///
/// The wire format is UPPERCASE. States this crate does not know about
/// deserialize to [`TaskState::Unknown`] and count as non-terminal, so new
/// intermediate states on the server side keep old clients polling instead
/// of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    New,
    Running,
    Finished,
    Error,
    #[serde(other)]
    Unknown,
}

impl TaskState {
    /// Whether the task has stopped, successfully or not
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Finished | TaskState::Error)
    }

    /// Whether the task finished successfully
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskState::Finished)
    }

    /// Whether the task failed
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, TaskState::Error)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::New => "NEW",
            TaskState::Running => "RUNNING",
            TaskState::Finished => "FINISHED",
            TaskState::Error => "ERROR",
            TaskState::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// An asynchronous task as reported by `GET /v1/tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
    /// Server-reported failure text, present when `state` is `ERROR`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_resources: Option<CreatedResources>,
}

/// IDs of resources a finished task produced, keyed by resource family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub floating_ips: Vec<String>,
    /// Families this crate has no dedicated field for
    #[serde(flatten)]
    pub other: BTreeMap<String, Vec<String>>,
}

/// Envelope returned by asynchronous mutations: `{"tasks": ["id", ...]}`.
///
/// Order is meaningful and an empty list is a valid answer (nothing to wait
/// for).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResults {
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl TaskResults {
    /// Envelope holding a single task ID
    #[must_use]
    pub fn single(task_id: impl Into<String>) -> Self {
        Self {
            tasks: vec![task_id.into()],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Handler for task endpoints. Tasks are global, not project/region scoped.
pub struct TaskHandler {
    client: CloudClient,
}

impl TaskHandler {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    /// Get the current state of a task
    pub async fn get(&self, task_id: &str) -> Result<Task> {
        self.client.get(&format!("v1/tasks/{task_id}")).await
    }
}
