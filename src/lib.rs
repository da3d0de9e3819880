pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod services;

pub use config::Config;
pub use domain::{ModelId, Payload, TaskId, UserId};
pub use models::{
    Action, Model, ModelStatus, PredictionHistory, PredictionStatus, PredictionTask, User, UserRole,
};
pub use services::{InMemoryPredictionService, LogService, PredictionError, PredictionService};

use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `general.log_level`. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}

/// Validates `config`, builds the prediction service and starts the log
/// listener on its event bus. Must be called inside a Tokio runtime.
pub fn start(config: &Config) -> anyhow::Result<(InMemoryPredictionService, JoinHandle<()>)> {
    config.validate()?;

    let service = InMemoryPredictionService::new(config);
    let listener = LogService::new(service.event_bus()).start_listener();

    info!(
        user_history_mode = ?config.history.user_history_mode,
        metrics_enabled = config.observability.metrics_enabled,
        "Prediction service started"
    );

    Ok((service, listener))
}
