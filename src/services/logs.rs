use crate::domain::events::NotificationEvent;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Turns bus events into structured log lines.
pub struct LogService {
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl LogService {
    #[must_use]
    pub const fn new(event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { event_bus }
    }

    /// Spawns the listener. It stops once every sender is dropped.
    pub fn start_listener(&self) -> JoinHandle<()> {
        let mut rx = self.event_bus.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => Self::handle_event(&event),
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        error!(count, "Log listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Log listener event bus closed");
                        break;
                    }
                }
            }
        })
    }

    fn handle_event(event: &NotificationEvent) {
        let kind = event.kind();
        match event {
            NotificationEvent::ModelRegistered { model_id, name } => {
                info!(event = kind, model_id = %model_id, name = %name, "Model registered");
            }
            NotificationEvent::ModelActivated { model_id }
            | NotificationEvent::ModelDeactivated { model_id } => {
                info!(event = kind, model_id = %model_id, "Model status changed");
            }
            NotificationEvent::TaskSubmitted { task_id, model_id } => {
                info!(event = kind, task_id = %task_id, model_id = %model_id, "Prediction submitted");
            }
            NotificationEvent::TaskCompleted { task_id, model_id } => {
                info!(event = kind, task_id = %task_id, model_id = %model_id, "Prediction completed");
            }
            NotificationEvent::TaskFailed {
                task_id,
                model_id,
                error,
            } => {
                warn!(
                    event = kind,
                    task_id = %task_id,
                    model_id = %model_id,
                    error = %error,
                    "Prediction failed"
                );
            }
        }
    }
}
