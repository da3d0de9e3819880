pub mod history;
pub mod model;
pub mod prediction;
pub mod user;

pub use history::{HistoryError, PredictionHistory, UserHistoryMode};
pub use model::{Model, ModelError, ModelKind, ModelStatus};
pub use prediction::{PredictionStatus, PredictionTask, TaskError};
pub use user::{Action, UnknownAction, User, UserRole};
