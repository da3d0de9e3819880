//! In-memory implementation of the `PredictionService` trait.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::events::NotificationEvent;
use crate::domain::{ModelId, Payload, TaskId, UserId};
use crate::models::{
    HistoryError, Model, PredictionHistory, PredictionStatus, PredictionTask, UserHistoryMode,
};
use crate::services::prediction_service::{PredictionError, PredictionService};

/// Keeps models and the prediction log in process memory.
///
/// Both collections sit behind `RwLock`s so one instance can be shared
/// across tasks. Cloning the service shares the same state.
#[derive(Clone)]
pub struct InMemoryPredictionService {
    models: Arc<RwLock<HashMap<ModelId, Model>>>,
    history: Arc<RwLock<PredictionHistory>>,
    event_bus: broadcast::Sender<NotificationEvent>,
    metrics_enabled: bool,
}

impl InMemoryPredictionService {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(
            event_bus,
            config.history.user_history_mode,
            config.observability.metrics_enabled,
        )
    }

    #[must_use]
    pub fn with_event_bus(
        event_bus: broadcast::Sender<NotificationEvent>,
        mode: UserHistoryMode,
        metrics_enabled: bool,
    ) -> Self {
        Self {
            models: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(PredictionHistory::with_mode(mode))),
            event_bus,
            metrics_enabled,
        }
    }

    #[must_use]
    pub fn event_bus(&self) -> broadcast::Sender<NotificationEvent> {
        self.event_bus.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.event_bus.subscribe()
    }

    fn publish(&self, event: NotificationEvent) {
        let _ = self.event_bus.send(event);
    }

    async fn with_model<F>(&self, model_id: &ModelId, f: F) -> Result<(), PredictionError>
    where
        F: FnOnce(&mut Model) + Send,
    {
        let mut models = self.models.write().await;
        let model = models
            .get_mut(model_id)
            .ok_or_else(|| PredictionError::ModelNotFound(model_id.clone()))?;
        f(model);
        Ok(())
    }

    async fn registered_model(&self, model_id: &ModelId) -> Result<Model, PredictionError> {
        self.model(model_id)
            .await
            .ok_or_else(|| PredictionError::ModelNotFound(model_id.clone()))
    }

    /// Appends a pending task to the history and announces it.
    async fn record_submission(
        &self,
        model_id: &ModelId,
        input_data: Payload,
        submitted_by: Option<UserId>,
    ) -> PredictionTask {
        let mut task = PredictionTask::new(TaskId::generate(), model_id.clone(), input_data);
        if let Some(user_id) = submitted_by {
            task = task.with_submitter(user_id);
        }

        self.history.write().await.add_task(task.clone());
        debug!(task_id = %task.task_id(), model_id = %model_id, "Task submitted");
        self.publish(NotificationEvent::TaskSubmitted {
            task_id: task.task_id().clone(),
            model_id: model_id.clone(),
        });

        task
    }

    /// Moves a pending task to its terminal state, then logs, counts and
    /// announces the outcome.
    async fn record_outcome(
        &self,
        task_id: &TaskId,
        outcome: Result<Payload, String>,
    ) -> Result<PredictionTask, PredictionError> {
        let snapshot = {
            let mut history = self.history.write().await;
            match outcome {
                Ok(result) => history.complete_task(task_id, result)?,
                Err(error) => history.fail_task(task_id, error)?,
            }
            history
                .get_task_by_id(task_id)
                .cloned()
                .ok_or_else(|| HistoryError::TaskNotFound(task_id.clone()))?
        };

        self.record_metrics(&snapshot);

        let model_id = snapshot.model_id().clone();
        match snapshot.error() {
            None => {
                info!(task_id = %task_id, model_id = %model_id, "Task completed");
                self.publish(NotificationEvent::TaskCompleted {
                    task_id: task_id.clone(),
                    model_id,
                });
            }
            Some(error) => {
                warn!(task_id = %task_id, model_id = %model_id, error = %error, "Task failed");
                self.publish(NotificationEvent::TaskFailed {
                    task_id: task_id.clone(),
                    model_id,
                    error: error.to_string(),
                });
            }
        }

        Ok(snapshot)
    }

    fn record_metrics(&self, task: &PredictionTask) {
        if !self.metrics_enabled || task.status() == PredictionStatus::Pending {
            return;
        }

        let elapsed = task
            .completed_at()
            .and_then(|done| (done - task.created_at()).to_std().ok())
            .map_or(0.0, |d| d.as_secs_f64());

        metrics::counter!("prediction_tasks_total", "outcome" => task.status().as_str())
            .increment(1);
        metrics::histogram!("prediction_task_duration_seconds").record(elapsed);
    }
}

#[async_trait]
impl PredictionService for InMemoryPredictionService {
    async fn register_model(&self, model: Model) -> Result<(), PredictionError> {
        let model_id = model.id().clone();
        let name = model.name().to_string();

        match self.models.write().await.entry(model_id.clone()) {
            Entry::Occupied(_) => return Err(PredictionError::DuplicateModel(model_id)),
            Entry::Vacant(slot) => {
                slot.insert(model);
            }
        }

        info!(model_id = %model_id, name = %name, "Registered model");
        self.publish(NotificationEvent::ModelRegistered { model_id, name });
        Ok(())
    }

    async fn model(&self, model_id: &ModelId) -> Option<Model> {
        self.models.read().await.get(model_id).cloned()
    }

    async fn activate_model(&self, model_id: &ModelId) -> Result<(), PredictionError> {
        self.with_model(model_id, Model::activate).await?;
        info!(model_id = %model_id, "Model activated");
        self.publish(NotificationEvent::ModelActivated {
            model_id: model_id.clone(),
        });
        Ok(())
    }

    async fn deactivate_model(&self, model_id: &ModelId) -> Result<(), PredictionError> {
        self.with_model(model_id, Model::deactivate).await?;
        info!(model_id = %model_id, "Model deactivated");
        self.publish(NotificationEvent::ModelDeactivated {
            model_id: model_id.clone(),
        });
        Ok(())
    }

    async fn update_model_metadata(
        &self,
        model_id: &ModelId,
        key: &str,
        value: &str,
    ) -> Result<(), PredictionError> {
        self.with_model(model_id, |m| m.update_metadata(key, value))
            .await
    }

    async fn remove_model_metadata(
        &self,
        model_id: &ModelId,
        key: &str,
    ) -> Result<(), PredictionError> {
        self.with_model(model_id, |m| m.remove_metadata(key)).await
    }

    async fn submit(
        &self,
        model_id: &ModelId,
        input_data: Payload,
        submitted_by: Option<UserId>,
    ) -> Result<PredictionTask, PredictionError> {
        let model = self.registered_model(model_id).await?;
        let task = self
            .record_submission(model_id, input_data, submitted_by)
            .await;

        let outcome = model
            .predict(&task.input_data())
            .map_err(|e| e.to_string());

        self.record_outcome(task.task_id(), outcome).await
    }

    async fn enqueue(
        &self,
        model_id: &ModelId,
        input_data: Payload,
        submitted_by: Option<UserId>,
    ) -> Result<PredictionTask, PredictionError> {
        self.registered_model(model_id).await?;
        Ok(self
            .record_submission(model_id, input_data, submitted_by)
            .await)
    }

    async fn complete_task(
        &self,
        task_id: &TaskId,
        result: Payload,
    ) -> Result<PredictionTask, PredictionError> {
        self.record_outcome(task_id, Ok(result)).await
    }

    async fn fail_task(
        &self,
        task_id: &TaskId,
        error: String,
    ) -> Result<PredictionTask, PredictionError> {
        self.record_outcome(task_id, Err(error)).await
    }

    async fn task(&self, task_id: &TaskId) -> Option<PredictionTask> {
        self.history.read().await.get_task_by_id(task_id).cloned()
    }

    async fn model_history(&self, model_id: &ModelId) -> Vec<PredictionTask> {
        self.history
            .read()
            .await
            .get_model_history(model_id)
            .into_iter()
            .cloned()
            .collect()
    }

    async fn user_history(&self, user_id: &UserId) -> Vec<PredictionTask> {
        self.history
            .read()
            .await
            .get_user_history(user_id)
            .into_iter()
            .cloned()
            .collect()
    }
}
