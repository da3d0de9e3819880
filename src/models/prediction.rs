use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::domain::{ModelId, Payload, TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PredictionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task {task_id} is already {status}")]
    AlreadyTerminal {
        task_id: TaskId,
        status: PredictionStatus,
    },
}

/// One prediction request and its eventual outcome.
///
/// The task only records what happened; the work itself is done by whoever
/// holds the task. `complete` and `fail` are unguarded and overwrite a prior
/// outcome, `try_complete` and `try_fail` refuse to leave a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionTask {
    task_id: TaskId,
    model_id: ModelId,
    input_data: Payload,
    status: PredictionStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<Payload>,
    error: Option<String>,
    submitted_by: Option<UserId>,
}

impl PredictionTask {
    /// Creates a pending task. The payload is moved in, so the caller keeps
    /// no handle on the stored copy.
    #[must_use]
    pub fn new(task_id: impl Into<TaskId>, model_id: impl Into<ModelId>, input_data: Payload) -> Self {
        Self {
            task_id: task_id.into(),
            model_id: model_id.into(),
            input_data,
            status: PredictionStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
            error: None,
            submitted_by: None,
        }
    }

    /// Attributes the task to the user who submitted it.
    #[must_use]
    pub fn with_submitter(mut self, user_id: impl Into<UserId>) -> Self {
        self.submitted_by = Some(user_id.into());
        self
    }

    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    #[must_use]
    pub const fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    /// Fresh copy of the input payload.
    #[must_use]
    pub fn input_data(&self) -> Payload {
        self.input_data.clone()
    }

    #[must_use]
    pub const fn status(&self) -> PredictionStatus {
        self.status
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub const fn result(&self) -> Option<&Payload> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn submitted_by(&self) -> Option<&UserId> {
        self.submitted_by.as_ref()
    }

    pub fn complete(&mut self, result: Payload) {
        self.warn_if_terminal("complete");
        self.result = Some(result);
        self.status = PredictionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.warn_if_terminal("fail");
        self.error = Some(error.into());
        self.status = PredictionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Completes a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AlreadyTerminal`] if the task already has an outcome.
    pub fn try_complete(&mut self, result: Payload) -> Result<(), TaskError> {
        self.ensure_pending()?;
        self.complete(result);
        Ok(())
    }

    /// Fails a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AlreadyTerminal`] if the task already has an outcome.
    pub fn try_fail(&mut self, error: impl Into<String>) -> Result<(), TaskError> {
        self.ensure_pending()?;
        self.fail(error);
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), TaskError> {
        if self.is_terminal() {
            return Err(TaskError::AlreadyTerminal {
                task_id: self.task_id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn warn_if_terminal(&self, transition: &str) {
        if self.is_terminal() {
            warn!(
                task_id = %self.task_id,
                status = %self.status,
                transition,
                "Overwriting outcome of a finished task"
            );
        }
    }
}

impl fmt::Display for PredictionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {} for model {} ({})",
            self.task_id, self.model_id, self.status
        )
    }
}
