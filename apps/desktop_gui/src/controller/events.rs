//! Backend-to-UI events for the desktop GUI controller.

use shared::{
    error::ApiError,
    protocol::{ModelInfo, PredictionEnvelope, ServerStatus},
};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    ServerStatus(ServerStatus),
    ModelInfoLoaded(ModelInfo),
    ModelInfoUnavailable(ApiError),
    PredictionSucceeded(PredictionEnvelope),
    PredictionFailed(ApiError),
    /// The worker could not start; no command will ever be answered.
    Error(UiError),
}

/// Failure that takes the whole backend bridge down, shown in the startup banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn startup(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
