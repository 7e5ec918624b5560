//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns `false` (and explains why
/// in `status`) when the command could not be queued.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend worker disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn reports_full_queue_in_status() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();

        assert!(dispatch_backend_command(&cmd_tx, BackendCommand::CheckHealth, &mut status));
        assert!(status.is_empty());
        assert!(!dispatch_backend_command(&cmd_tx, BackendCommand::FetchModelInfo, &mut status));
        assert_eq!(status, "UI command queue is full; please retry");
    }

    #[test]
    fn reports_disconnected_worker_in_status() {
        let (cmd_tx, cmd_rx) = bounded(4);
        drop(cmd_rx);
        let mut status = String::new();

        assert!(!dispatch_backend_command(&cmd_tx, BackendCommand::CheckHealth, &mut status));
        assert!(status.starts_with("Backend worker disconnected"));
    }
}
