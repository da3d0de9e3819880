//! Domain events for the prediction back-office.
//!
//! Events are published on the service event bus whenever a model or a
//! prediction task changes state.

use serde::Serialize;

use super::{ModelId, TaskId};

/// Notifications broadcast to subscribers such as the log listener.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    ModelRegistered {
        model_id: ModelId,
        name: String,
    },
    ModelActivated {
        model_id: ModelId,
    },
    ModelDeactivated {
        model_id: ModelId,
    },

    TaskSubmitted {
        task_id: TaskId,
        model_id: ModelId,
    },
    TaskCompleted {
        task_id: TaskId,
        model_id: ModelId,
    },
    TaskFailed {
        task_id: TaskId,
        model_id: ModelId,
        error: String,
    },
}

impl NotificationEvent {
    /// Short name of the event variant, used as the `event` log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ModelRegistered { .. } => "ModelRegistered",
            Self::ModelActivated { .. } => "ModelActivated",
            Self::ModelDeactivated { .. } => "ModelDeactivated",
            Self::TaskSubmitted { .. } => "TaskSubmitted",
            Self::TaskCompleted { .. } => "TaskCompleted",
            Self::TaskFailed { .. } => "TaskFailed",
        }
    }
}
