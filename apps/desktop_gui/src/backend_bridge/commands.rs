//! Backend commands queued from UI to backend worker.

use shared::domain::PropertyDraft;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    CheckHealth,
    FetchModelInfo,
    Predict { draft: PropertyDraft },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::CheckHealth => "check_health",
            BackendCommand::FetchModelInfo => "fetch_model_info",
            BackendCommand::Predict { .. } => "predict",
        }
    }
}
