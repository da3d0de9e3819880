//! Domain service for submitting predictions and querying their history.
//!
//! Owns the model registry and the prediction log. Authorization is the
//! caller's concern: check [`User::can_perform_action`] before calling in.
//!
//! Tasks reach a terminal state in one of two ways: [`PredictionService::submit`]
//! runs the model inline, while [`PredictionService::enqueue`] leaves the task
//! pending for an external worker that reports back through
//! [`PredictionService::complete_task`] or [`PredictionService::fail_task`].
//!
//! [`User::can_perform_action`]: crate::models::User::can_perform_action

use thiserror::Error;

use crate::domain::{ModelId, Payload, TaskId, UserId};
use crate::models::{HistoryError, Model, PredictionTask};

/// Errors specific to prediction operations.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model not found: {0}")]
    ModelNotFound(ModelId),

    #[error("Model already registered: {0}")]
    DuplicateModel(ModelId),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Domain service trait for the prediction back-office.
#[async_trait::async_trait]
pub trait PredictionService: Send + Sync {
    /// Adds a model to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::DuplicateModel`] if the id is taken.
    async fn register_model(&self, model: Model) -> Result<(), PredictionError>;

    /// Returns a snapshot of a registered model.
    async fn model(&self, model_id: &ModelId) -> Option<Model>;

    /// # Errors
    ///
    /// Returns [`PredictionError::ModelNotFound`] for unknown ids.
    async fn activate_model(&self, model_id: &ModelId) -> Result<(), PredictionError>;

    /// # Errors
    ///
    /// Returns [`PredictionError::ModelNotFound`] for unknown ids.
    async fn deactivate_model(&self, model_id: &ModelId) -> Result<(), PredictionError>;

    /// # Errors
    ///
    /// Returns [`PredictionError::ModelNotFound`] for unknown ids.
    async fn update_model_metadata(
        &self,
        model_id: &ModelId,
        key: &str,
        value: &str,
    ) -> Result<(), PredictionError>;

    /// Removing a key that is not present is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ModelNotFound`] for unknown ids.
    async fn remove_model_metadata(&self, model_id: &ModelId, key: &str)
    -> Result<(), PredictionError>;

    /// Records a new task, runs it against the model and records the outcome.
    ///
    /// A model that is not active produces a `Failed` task, which is kept in
    /// the history and returned as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ModelNotFound`] if the model is not
    /// registered. Nothing is recorded in that case.
    async fn submit(
        &self,
        model_id: &ModelId,
        input_data: Payload,
        submitted_by: Option<UserId>,
    ) -> Result<PredictionTask, PredictionError>;

    /// Records a new pending task without running it.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ModelNotFound`] if the model is not
    /// registered.
    async fn enqueue(
        &self,
        model_id: &ModelId,
        input_data: Payload,
        submitted_by: Option<UserId>,
    ) -> Result<PredictionTask, PredictionError>;

    /// Completes a pending task and returns its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::History`] if the task does not exist or
    /// already has an outcome.
    async fn complete_task(
        &self,
        task_id: &TaskId,
        result: Payload,
    ) -> Result<PredictionTask, PredictionError>;

    /// Fails a pending task and returns its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::History`] if the task does not exist or
    /// already has an outcome.
    async fn fail_task(&self, task_id: &TaskId, error: String)
    -> Result<PredictionTask, PredictionError>;

    /// Snapshot of the first task with `task_id`.
    async fn task(&self, task_id: &TaskId) -> Option<PredictionTask>;

    /// Tasks run against `model_id`, oldest first.
    async fn model_history(&self, model_id: &ModelId) -> Vec<PredictionTask>;

    /// Tasks visible to `user_id` under the configured history mode.
    async fn user_history(&self, user_id: &UserId) -> Vec<PredictionTask>;
}
