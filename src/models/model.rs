use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::constants::prediction::{STUB_PREDICTION_KEY, STUB_PREDICTION_VALUE};
use crate::domain::{ModelId, Payload, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Training,
    Active,
    #[default]
    Inactive,
    Error,
}

impl ModelStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Model {model_id} is not active (status: {status})")]
    NotActive {
        model_id: ModelId,
        status: ModelStatus,
    },
}

/// Inference backend behind a model handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    /// Placeholder TensorFlow backend. Nothing is actually loaded; inference
    /// returns a fixed result.
    TensorFlow { model_path: PathBuf },
}

impl ModelKind {
    fn load(&self, name: &str) {
        match self {
            Self::TensorFlow { model_path } => {
                info!(model = %name, path = %model_path.display(), "Loading TensorFlow model");
            }
        }
    }

    fn infer(&self, name: &str, _input: &Payload) -> Payload {
        match self {
            Self::TensorFlow { .. } => {
                info!(model = %name, "Making prediction with TensorFlow model");
                let mut out = Payload::new();
                out.insert(
                    STUB_PREDICTION_KEY.to_string(),
                    serde_json::Value::String(STUB_PREDICTION_VALUE.to_string()),
                );
                out
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    id: ModelId,
    name: String,
    owner_id: UserId,
    status: ModelStatus,
    created_at: DateTime<Utc>,
    metadata: HashMap<String, String>,
    kind: ModelKind,
}

impl Model {
    /// Creates an inactive model and loads its backend.
    #[must_use]
    pub fn new(
        id: impl Into<ModelId>,
        name: impl Into<String>,
        owner_id: impl Into<UserId>,
        kind: ModelKind,
    ) -> Self {
        let name = name.into();
        kind.load(&name);
        Self {
            id: id.into(),
            name,
            owner_id: owner_id.into(),
            status: ModelStatus::default(),
            created_at: Utc::now(),
            metadata: HashMap::new(),
            kind,
        }
    }

    #[must_use]
    pub fn tensorflow(
        id: impl Into<ModelId>,
        name: impl Into<String>,
        owner_id: impl Into<UserId>,
        model_path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(
            id,
            name,
            owner_id,
            ModelKind::TensorFlow {
                model_path: model_path.into(),
            },
        )
    }

    #[must_use]
    pub const fn id(&self) -> &ModelId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    #[must_use]
    pub const fn status(&self) -> ModelStatus {
        self.status
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn kind(&self) -> &ModelKind {
        &self.kind
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, ModelStatus::Active)
    }

    /// Snapshot of the metadata map. Mutating it does not touch the model.
    #[must_use]
    pub fn metadata(&self) -> HashMap<String, String> {
        self.metadata.clone()
    }

    pub fn update_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Removes `key`. Missing keys are ignored.
    pub fn remove_metadata(&mut self, key: &str) {
        self.metadata.remove(key);
    }

    pub fn activate(&mut self) {
        self.status = ModelStatus::Active;
    }

    pub fn deactivate(&mut self) {
        self.status = ModelStatus::Inactive;
    }

    /// Sets any status directly, e.g. `Training` while an external pipeline
    /// retrains the model. No transition rules apply.
    pub fn set_status(&mut self, status: ModelStatus) {
        self.status = status;
    }

    /// Runs inference on `input_data`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotActive`] unless the model status is `Active`.
    pub fn predict(&self, input_data: &Payload) -> Result<Payload, ModelError> {
        if !self.is_active() {
            return Err(ModelError::NotActive {
                model_id: self.id.clone(),
                status: self.status,
            });
        }

        Ok(self.kind.infer(&self.name, input_data))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ML Model {} ({})", self.name, self.status)
    }
}
