pub mod logs;
pub use logs::LogService;

pub mod prediction_service;
pub mod prediction_service_impl;
pub use prediction_service::{PredictionError, PredictionService};
pub use prediction_service_impl::InMemoryPredictionService;
