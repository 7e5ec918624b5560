//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, PredictionApi, PredictorClient};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};

/// Starts the backend worker against the configured prediction service.
pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let client = match PredictorClient::from_settings(&settings) {
        Ok(client) => client,
        Err(err) => {
            send_event(
                &ui_tx,
                UiEvent::Error(UiError::startup(format!(
                    "backend worker startup failure: {}: {}",
                    err.message, err.details
                ))),
            );
            tracing::error!("failed to build prediction client: {}", err.details);
            return;
        }
    };
    tracing::info!(api_base_url = %client.base_url(), "prediction client configured");
    spawn_worker(Arc::new(client), cmd_rx, ui_tx);
}

/// Runs the command loop on its own thread with a dedicated tokio runtime.
/// The loop ends once every command sender has been dropped.
pub fn spawn_worker(
    api: Arc<dyn PredictionApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                send_event(
                    &ui_tx,
                    UiEvent::Error(UiError::startup(format!(
                        "backend worker startup failure: failed to build runtime: {err}"
                    ))),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        send_event(&ui_tx, UiEvent::Info("Backend worker ready".to_string()));
        while let Ok(cmd) = cmd_rx.recv() {
            tracing::debug!(command = cmd.name(), "backend worker received command");
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let event = run_command(api.as_ref(), cmd).await;
                deliver_event(&ui_tx, event);
            });
        }
        tracing::debug!("ui command queue closed; backend worker stopping");
        runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    })
}

/// Each command is an independent one-shot task; nothing orders them.
async fn run_command(api: &dyn PredictionApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::CheckHealth => UiEvent::ServerStatus(api.health_check().await),
        BackendCommand::FetchModelInfo => match api.get_model_info().await {
            Ok(envelope) => UiEvent::ModelInfoLoaded(envelope.data),
            Err(err) => UiEvent::ModelInfoUnavailable(err),
        },
        BackendCommand::Predict { draft } => match api.predict_price(&draft).await {
            Ok(envelope) => UiEvent::PredictionSucceeded(envelope),
            Err(err) => UiEvent::PredictionFailed(err),
        },
    }
}

fn send_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.try_send(event).is_err() {
        tracing::warn!("backend->ui event queue is full or closed; dropping event");
    }
}

/// Command results settle UI state (the form's busy flag among it), so they
/// wait for queue space instead of being dropped. Only a closed UI loses them.
fn deliver_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if tokio::task::block_in_place(|| ui_tx.send(event)).is_err() {
        tracing::debug!("ui event queue closed; discarding command result");
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
