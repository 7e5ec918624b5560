//! Application shell: owns the shell state and form, drains backend events,
//! and lays out the panels each frame.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    form::FormController,
    orchestration::dispatch_backend_command,
    reducer::{reduce, ModelInfoState, ShellState},
};
use crate::ui::panels;

const IDLE_REPAINT: Duration = Duration::from_millis(100);

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    shell: ShellState,
    form: FormController,
}

impl DesktopGuiApp {
    /// Builds the shell and fires the two mount-time requests. Neither waits
    /// on the other and neither blocks the first frame. A request that cannot
    /// be queued settles its panel right away instead of loading forever.
    pub fn bootstrap(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            shell: ShellState::default(),
            form: FormController::new(),
        };
        for cmd in [BackendCommand::CheckHealth, BackendCommand::FetchModelInfo] {
            if !dispatch_backend_command(&app.cmd_tx, cmd, &mut app.shell.status) {
                let error = app.shell.status.clone();
                app.shell.mark_backend_unavailable(&error);
            }
        }
        app
    }

    fn process_ui_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.ui_rx.try_recv() {
            reduce(&mut self.shell, &mut self.form, event, now);
        }
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("House Price Predictor");
                ui.label(egui::RichText::new("AI-Powered Valuation").small().weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    panels::server_indicator(ui, self.shell.server_status());
                });
            });
            ui.add_space(6.0);
        });
    }

    fn show_startup_banner(&mut self, ui: &mut egui::Ui) {
        let Some(error) = self.shell.startup_error() else {
            return;
        };
        let message = error.message().to_owned();
        let mut dismissed = false;
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.button("Dismiss").clicked();
                    });
                });
            });
        if dismissed {
            self.shell.dismiss_startup_error();
        }
        ui.add_space(8.0);
    }

    fn show_failure_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.shell.failure_notice().map(str::to_owned) else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("prediction_failure")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.heading("Prediction Error");
            ui.add_space(6.0);
            ui.label(notice);
            ui.add_space(10.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.button("OK").clicked()
            })
            .inner
        });
        if modal.inner || modal.should_close() {
            self.shell.dismiss_failure_notice();
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.shell.status).small().weak());
                if let ModelInfoState::Loaded(info) = self.shell.model_info() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("{} • Real-time Predictions", info.model_name))
                                .small()
                                .weak(),
                        );
                    });
                }
            });
        });
    }

    fn show_main(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.show_startup_banner(ui);
                    panels::model_info_panel(ui, self.shell.model_info());
                    ui.add_space(10.0);
                    panels::form_panel(ui, &mut self.form, &self.cmd_tx, &mut self.shell.status);
                    ui.add_space(10.0);
                    let result = panels::result_panel(ui, self.shell.current_result());
                    if self.shell.take_due_scroll(now) {
                        result.scroll_to_me(Some(egui::Align::TOP));
                    }
                });
        });
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let now = Instant::now();

        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_main(ctx, now);
        self.show_failure_notice(ctx);

        let wait = self
            .shell
            .scroll_wait(now)
            .map_or(IDLE_REPAINT, |wait| wait.min(IDLE_REPAINT));
        ctx.request_repaint_after(wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::protocol::ServerStatus;

    use crate::controller::events::UiError;

    #[test]
    fn mount_requests_health_and_model_info_once_each() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let app = DesktopGuiApp::bootstrap(cmd_tx, ui_rx);

        let sent: Vec<BackendCommand> = cmd_rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![BackendCommand::CheckHealth, BackendCommand::FetchModelInfo]
        );
        assert!(app.shell.server_status().is_none());
        assert_eq!(app.shell.model_info(), &ModelInfoState::Loading);
    }

    #[test]
    fn unqueued_mount_requests_settle_offline_and_empty() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        drop(cmd_rx);

        let app = DesktopGuiApp::bootstrap(cmd_tx, ui_rx);

        assert_eq!(
            app.shell.server_status(),
            Some(&ServerStatus::Offline {
                error: "Backend worker disconnected (possible startup/runtime failure); restart the app"
                    .to_string()
            })
        );
        assert_eq!(app.shell.model_info(), &ModelInfoState::Unavailable);
    }

    #[test]
    fn worker_startup_failure_settles_mount_state() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let mut app = DesktopGuiApp::bootstrap(cmd_tx, ui_rx);
        drop(cmd_rx);
        ui_tx
            .send(UiEvent::Error(UiError::startup(
                "backend worker startup failure: boom",
            )))
            .expect("send");

        app.process_ui_events();

        assert_eq!(
            app.shell.server_status(),
            Some(&ServerStatus::Offline {
                error: "backend worker startup failure: boom".to_string()
            })
        );
        assert_eq!(app.shell.model_info(), &ModelInfoState::Unavailable);
        assert!(app.shell.startup_error().is_some());
    }
}
