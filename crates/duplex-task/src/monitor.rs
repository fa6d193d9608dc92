//! The wait loop for asynchronous control-plane tasks.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use duplex_client::{ClientError, TaskApi};
use duplex_model::{ActionAccepted, TaskId, TaskState};

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Polling behavior for [`wait_for_task`].
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Sleep between status checks.
    pub interval: Duration,
    /// Upper bound on the total wait. `None` polls until the task reaches
    /// a terminal state, however long that takes.
    pub deadline: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// Errors from waiting on a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The accepted-action record carried no task id; the action never
    /// properly started and there is nothing to poll.
    #[error("action '{name}' was not accepted: response carried no task id")]
    NotAccepted { name: String },

    /// The accepted-action record carried no resource id, so a successful
    /// wait would have nothing to return.
    #[error("action '{name}' was not accepted: response carried no resource id")]
    NoResource { name: String },

    /// The task reached terminal `Failure`.
    #[error("task '{name}' ({task}) failed:\n{message}")]
    Failed {
        name: String,
        task: TaskId,
        message: String,
    },

    /// The configured deadline elapsed before a terminal state.
    #[error("task '{name}' ({task}) still running after {deadline:?}")]
    DeadlineExceeded {
        name: String,
        task: TaskId,
        deadline: Duration,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Wait for an accepted action to reach a terminal state.
///
/// On `Success`, returns the resource id captured from the submission
/// record. It is deliberately not re-fetched: by the time the task
/// completes, the resource may already have mutated further, and the
/// caller wants the id of what *this* action produced.
///
/// On `Failure`, the detailed failure record is fetched and every
/// per-subtask error string is joined into one message; a generic message
/// stands in when no detail is available.
///
/// Any other status counts as still running: progress is logged and the
/// flow suspends for `opts.interval`. The calling flow is fully blocked
/// until a terminal state or the optional deadline.
pub async fn wait_for_task<C>(
    client: &C,
    accepted: &ActionAccepted,
    friendly_name: &str,
    opts: &PollOptions,
) -> Result<String, TaskError>
where
    C: TaskApi + ?Sized,
{
    // Both ids are validated before the first poll. A submission the
    // control plane did not accept must fail here, not after a poll cycle.
    let task_id = accepted.task_uuid.clone().ok_or_else(|| TaskError::NotAccepted {
        name: friendly_name.to_string(),
    })?;
    let resource_id = accepted.resource_uuid.clone().ok_or_else(|| TaskError::NoResource {
        name: friendly_name.to_string(),
    })?;

    let started = Instant::now();
    debug!(task = %task_id, name = friendly_name, "waiting for task");

    loop {
        let status = client.task_status(&task_id).await?;

        match status.status {
            TaskState::Success => {
                info!(task = %task_id, name = friendly_name, "task finished successfully");
                return Ok(resource_id);
            }
            TaskState::Failure => {
                let message = failure_message(client, &task_id).await;
                return Err(TaskError::Failed {
                    name: friendly_name.to_string(),
                    task: task_id,
                    message,
                });
            }
            TaskState::Running | TaskState::Other(_) => {
                let percent = status.percent.unwrap_or(0.0);
                info!(task = %task_id, name = friendly_name, percent, "waiting for task");

                if let Some(deadline) = opts.deadline {
                    if started.elapsed() >= deadline {
                        return Err(TaskError::DeadlineExceeded {
                            name: friendly_name.to_string(),
                            task: task_id,
                            deadline,
                        });
                    }
                }
                tokio::time::sleep(opts.interval).await;
            }
        }
    }
}

/// Aggregate the failure record into a single message.
async fn failure_message<C>(client: &C, task: &TaskId) -> String
where
    C: TaskApi + ?Sized,
{
    match client.task_failure(task).await {
        Ok(detail) if !detail.failed_sub_tasks.is_empty() => detail
            .failed_sub_tasks
            .iter()
            .map(|sub| sub.error_string.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        Ok(_) => "task failed, but no failure details were reported".to_string(),
        Err(e) => format!("task failed, and fetching failure details also failed: {e}"),
    }
}
