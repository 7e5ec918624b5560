//! Shell state and the transitions applied for each backend event.

use std::time::{Duration, Instant};

use shared::protocol::{ModelInfo, PredictionEnvelope, ServerStatus};

use crate::controller::{
    events::{UiError, UiEvent},
    form::FormController,
};

/// Lets the result region render before it is scrolled into view.
pub const SCROLL_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum ModelInfoState {
    Loading,
    Loaded(ModelInfo),
    /// The fetch failed; the panel renders nothing.
    Unavailable,
}

#[derive(Debug)]
pub struct ShellState {
    pub status: String,
    server_status: Option<ServerStatus>,
    model_info: ModelInfoState,
    current_result: Option<PredictionEnvelope>,
    failure_notice: Option<String>,
    startup_error: Option<UiError>,
    scroll_deadline: Option<Instant>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            status: "Starting".to_string(),
            server_status: None,
            model_info: ModelInfoState::Loading,
            current_result: None,
            failure_notice: None,
            startup_error: None,
            scroll_deadline: None,
        }
    }
}

impl ShellState {
    pub fn server_status(&self) -> Option<&ServerStatus> {
        self.server_status.as_ref()
    }

    pub fn model_info(&self) -> &ModelInfoState {
        &self.model_info
    }

    pub fn current_result(&self) -> Option<&PredictionEnvelope> {
        self.current_result.as_ref()
    }

    pub fn failure_notice(&self) -> Option<&str> {
        self.failure_notice.as_deref()
    }

    pub fn dismiss_failure_notice(&mut self) {
        self.failure_notice = None;
    }

    pub fn startup_error(&self) -> Option<&UiError> {
        self.startup_error.as_ref()
    }

    pub fn dismiss_startup_error(&mut self) {
        self.startup_error = None;
    }

    /// Settles the mount effects that can no longer be answered: health
    /// becomes offline and a pending model-info fetch renders nothing.
    /// Results that already arrived are kept.
    pub fn mark_backend_unavailable(&mut self, error: &str) {
        if self.server_status.is_none() {
            self.server_status = Some(ServerStatus::Offline {
                error: error.to_string(),
            });
        }
        if self.model_info == ModelInfoState::Loading {
            self.model_info = ModelInfoState::Unavailable;
        }
    }

    /// Replaces the current result unconditionally and schedules the scroll.
    fn accept_prediction(&mut self, envelope: PredictionEnvelope, now: Instant) {
        self.current_result = Some(envelope);
        self.scroll_deadline = Some(now + SCROLL_DELAY);
        self.status = "Prediction complete".to_string();
    }

    /// True exactly once, on the first frame at or after the scroll deadline.
    pub fn take_due_scroll(&mut self, now: Instant) -> bool {
        match self.scroll_deadline {
            Some(deadline) if now >= deadline => {
                self.scroll_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until a pending scroll is due, for scheduling a repaint.
    pub fn scroll_wait(&self, now: Instant) -> Option<Duration> {
        self.scroll_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

pub fn reduce(shell: &mut ShellState, form: &mut FormController, event: UiEvent, now: Instant) {
    match event {
        UiEvent::Info(message) => {
            shell.status = message;
        }
        UiEvent::ServerStatus(status) => {
            if let Some(error) = status.error() {
                tracing::info!(%error, "prediction service is offline");
            }
            shell.server_status = Some(status);
        }
        UiEvent::ModelInfoLoaded(info) => {
            shell.model_info = ModelInfoState::Loaded(info);
        }
        UiEvent::ModelInfoUnavailable(err) => {
            tracing::warn!(
                status = err.status,
                details = %err.details,
                "error fetching model info: {}",
                err.message
            );
            shell.model_info = ModelInfoState::Unavailable;
        }
        UiEvent::PredictionSucceeded(envelope) => {
            let settled = form.settle(Ok(envelope), |envelope| {
                shell.accept_prediction(envelope, now)
            });
            debug_assert!(settled.is_ok());
        }
        UiEvent::PredictionFailed(err) => {
            if let Err(err) = form.settle(Err(err), |_| {}) {
                tracing::warn!(
                    kind = ?err.kind,
                    status = err.status,
                    details = %err.details,
                    "prediction failed: {}",
                    err.message
                );
                shell.failure_notice = Some(format!("Prediction failed: {}", err.message));
                shell.status = "Prediction failed".to_string();
            }
        }
        UiEvent::Error(ui_error) => {
            tracing::error!("{}", ui_error.message());
            shell.status = ui_error.message().to_string();
            shell.mark_backend_unavailable(ui_error.message());
            shell.startup_error = Some(ui_error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::{
        error::ApiError,
        protocol::{Envelope, FeaturesUsed, HealthReport, PredictionResponse},
    };

    fn envelope(price: f64) -> PredictionEnvelope {
        Envelope {
            success: true,
            data: PredictionResponse {
                predicted_price: price,
                confidence_score: 0.873,
                model_name: "Random Forest".to_string(),
                features_used: FeaturesUsed::default(),
            },
            history_id: Some(1),
            count: None,
        }
    }

    fn busy_form() -> FormController {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let mut form = FormController::new();
        let mut status = String::new();
        assert!(form.submit(&cmd_tx, &mut status));
        form
    }

    #[test]
    fn successful_prediction_fills_slot_and_schedules_scroll() {
        let mut shell = ShellState::default();
        let mut form = busy_form();
        let now = Instant::now();

        reduce(
            &mut shell,
            &mut form,
            UiEvent::PredictionSucceeded(envelope(452000.0)),
            now,
        );

        assert!(!form.is_busy());
        assert_eq!(
            shell.current_result().map(|e| e.data.predicted_price),
            Some(452000.0)
        );
        assert_eq!(shell.scroll_wait(now), Some(SCROLL_DELAY));
        assert!(!shell.take_due_scroll(now + Duration::from_millis(50)));
        assert!(shell.take_due_scroll(now + SCROLL_DELAY));
        assert!(!shell.take_due_scroll(now + Duration::from_secs(1)));
        assert_eq!(shell.scroll_wait(now), None);
    }

    #[test]
    fn newer_success_replaces_previous_result() {
        let mut shell = ShellState::default();
        let now = Instant::now();

        let mut form = busy_form();
        reduce(&mut shell, &mut form, UiEvent::PredictionSucceeded(envelope(1.0)), now);
        let mut form = busy_form();
        reduce(&mut shell, &mut form, UiEvent::PredictionSucceeded(envelope(2.0)), now);

        assert_eq!(shell.current_result().map(|e| e.data.predicted_price), Some(2.0));
    }

    #[test]
    fn failed_prediction_keeps_previous_result_and_raises_notice() {
        let mut shell = ShellState::default();
        let now = Instant::now();
        let mut form = busy_form();
        reduce(&mut shell, &mut form, UiEvent::PredictionSucceeded(envelope(7.0)), now);
        shell.take_due_scroll(now + SCROLL_DELAY);

        let mut form = busy_form();
        reduce(
            &mut shell,
            &mut form,
            UiEvent::PredictionFailed(ApiError::connection()),
            now,
        );

        assert!(!form.is_busy());
        assert_eq!(shell.current_result().map(|e| e.data.predicted_price), Some(7.0));
        assert_eq!(
            shell.failure_notice(),
            Some("Prediction failed: No response from server. Please check if the backend is running.")
        );
        assert_eq!(shell.scroll_wait(now), None);

        shell.dismiss_failure_notice();
        assert_eq!(shell.failure_notice(), None);
    }

    #[test]
    fn offline_health_is_ordinary_state() {
        let mut shell = ShellState::default();
        let mut form = FormController::new();

        reduce(
            &mut shell,
            &mut form,
            UiEvent::ServerStatus(ServerStatus::Offline {
                error: "No response from server. Please check if the backend is running."
                    .to_string(),
            }),
            Instant::now(),
        );
        assert_eq!(shell.server_status().map(ServerStatus::label), Some("Offline"));
        assert!(shell.failure_notice().is_none());
        assert!(shell.startup_error().is_none());

        reduce(
            &mut shell,
            &mut form,
            UiEvent::ServerStatus(ServerStatus::Online(HealthReport {
                status: "healthy".to_string(),
                service: None,
                model_loaded: Some(true),
            })),
            Instant::now(),
        );
        assert_eq!(shell.server_status().map(ServerStatus::label), Some("Connected"));
    }

    #[test]
    fn model_info_failure_degrades_to_nothing() {
        let mut shell = ShellState::default();
        let mut form = FormController::new();
        assert_eq!(shell.model_info(), &ModelInfoState::Loading);

        reduce(
            &mut shell,
            &mut form,
            UiEvent::ModelInfoUnavailable(ApiError::server(500, None, None)),
            Instant::now(),
        );

        assert_eq!(shell.model_info(), &ModelInfoState::Unavailable);
        assert!(shell.failure_notice().is_none());
        assert!(shell.startup_error().is_none());
    }

    #[test]
    fn startup_errors_are_kept_for_the_banner() {
        let mut shell = ShellState::default();
        let mut form = FormController::new();

        reduce(
            &mut shell,
            &mut form,
            UiEvent::Error(UiError::startup("backend worker startup failure: no runtime")),
            Instant::now(),
        );

        assert_eq!(
            shell.startup_error().map(UiError::message),
            Some("backend worker startup failure: no runtime")
        );
        assert_eq!(
            shell.server_status(),
            Some(&ServerStatus::Offline {
                error: "backend worker startup failure: no runtime".to_string()
            })
        );
        assert_eq!(shell.model_info(), &ModelInfoState::Unavailable);

        shell.dismiss_startup_error();
        assert!(shell.startup_error().is_none());
        assert_eq!(shell.server_status().map(ServerStatus::label), Some("Offline"));
    }

    #[test]
    fn unavailable_backend_keeps_mount_results_that_already_arrived() {
        let mut shell = ShellState::default();
        let mut form = FormController::new();
        reduce(
            &mut shell,
            &mut form,
            UiEvent::ServerStatus(ServerStatus::Online(HealthReport {
                status: "healthy".to_string(),
                service: None,
                model_loaded: Some(true),
            })),
            Instant::now(),
        );

        shell.mark_backend_unavailable("UI command queue is full; please retry");

        assert_eq!(shell.server_status().map(ServerStatus::label), Some("Connected"));
        assert_eq!(shell.model_info(), &ModelInfoState::Unavailable);
    }
}
