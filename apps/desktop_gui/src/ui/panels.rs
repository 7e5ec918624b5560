//! Stateless panel renderers. Each takes exactly the state it displays.

use crossbeam_channel::Sender;
use eframe::egui;
use shared::{
    domain::{Amenity, PropertyField},
    presentation::{present_model_info, present_prediction},
    protocol::{PredictionEnvelope, ServerStatus},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{form::FormController, reducer::ModelInfoState};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);
const ONLINE: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const OFFLINE: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const ADVISORY: egui::Color32 = egui::Color32::from_rgb(217, 119, 6);
const MUTED: egui::Color32 = egui::Color32::from_rgb(107, 114, 128);

fn card<R>(ui: &mut egui::Ui, add: impl FnOnce(&mut egui::Ui) -> R) -> egui::InnerResponse<R> {
    egui::Frame::group(ui.style())
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(14, 12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add(ui)
        })
}

pub fn server_indicator(ui: &mut egui::Ui, status: Option<&ServerStatus>) {
    let Some(status) = status else {
        return;
    };
    let color = if status.is_healthy() { ONLINE } else { OFFLINE };
    let (rect, response) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, color);
    if let Some(error) = status.error() {
        response.on_hover_text(error);
    }
    ui.label(egui::RichText::new(status.label()).small().color(MUTED));
}

pub fn model_info_panel(ui: &mut egui::Ui, state: &ModelInfoState) {
    match state {
        ModelInfoState::Loading => {
            card(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new("Loading model information...").color(MUTED));
                });
            });
        }
        ModelInfoState::Unavailable => {}
        ModelInfoState::Loaded(info) => {
            let view = present_model_info(info);
            card(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Model Performance");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new("Active").small().color(ONLINE));
                    });
                });
                ui.separator();
                egui::Grid::new("model_info_grid")
                    .num_columns(4)
                    .spacing([24.0, 4.0])
                    .show(ui, |ui| {
                        for label in ["Algorithm", "Accuracy (R²)", "Error (RMSE)", "Training Set"] {
                            ui.label(egui::RichText::new(label).small().color(MUTED));
                        }
                        ui.end_row();
                        for value in [&view.algorithm, &view.accuracy, &view.rmse, &view.training_set] {
                            ui.label(egui::RichText::new(value.as_str()).strong());
                        }
                        ui.end_row();
                    });
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(format!("Input Features ({})", view.features.len()))
                        .small()
                        .color(MUTED),
                );
                ui.horizontal_wrapped(|ui| {
                    for feature in &view.features {
                        ui.label(egui::RichText::new(feature.as_str()).small().monospace());
                    }
                });
            });
        }
    }
}

pub fn form_panel(
    ui: &mut egui::Ui,
    form: &mut FormController,
    cmd_tx: &Sender<BackendCommand>,
    status: &mut String,
) {
    card(ui, |ui| {
        ui.heading("Property Details");
        ui.separator();

        egui::Grid::new("property_form_grid")
            .num_columns(3)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for field in PropertyField::numeric() {
                    numeric_row(ui, form, field);
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Amenities").strong());
        ui.horizontal(|ui| {
            for amenity in Amenity::ALL {
                let mut checked = form.draft().has_amenity(amenity);
                if ui.checkbox(&mut checked, amenity.label()).changed() {
                    form.toggle_amenity(amenity, checked);
                }
            }
        });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let busy = form.is_busy();
            let predict_label = if busy { "Predicting..." } else { "Predict Price" };
            let predict = egui::Button::new(egui::RichText::new(predict_label).color(egui::Color32::WHITE))
                .fill(ACCENT)
                .min_size(egui::vec2(160.0, 30.0));
            if ui.add_enabled(!busy, predict).clicked() {
                form.submit(cmd_tx, status);
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Reset").min_size(egui::vec2(80.0, 30.0)))
                .clicked()
            {
                form.reset();
            }
            if busy {
                ui.spinner();
            }
        });
    });
}

fn numeric_row(ui: &mut egui::Ui, form: &mut FormController, field: PropertyField) {
    let spec = field.spec();
    ui.label(field.label());

    let mut text = form.input(field).to_string();
    let edit = egui::TextEdit::singleline(&mut text)
        .id_salt(field.name())
        .desired_width(120.0)
        .hint_text(format!("{} to {}", spec.min, spec.max));
    if ui.add(edit).changed() {
        if let Err(err) = form.edit_numeric(field, text) {
            tracing::debug!(field = field.name(), "kept previous value: {err}");
        }
    }

    match form.advisory(field) {
        Some(hint) => ui.label(egui::RichText::new(hint).small().color(ADVISORY)),
        None => ui.label(""),
    };
}

/// Renders the current result, or the empty state. The returned response
/// covers the whole region so the shell can scroll it into view.
pub fn result_panel(ui: &mut egui::Ui, result: Option<&PredictionEnvelope>) -> egui::Response {
    card(ui, |ui| match present_prediction(result.map(|envelope| &envelope.data)) {
        None => {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.heading("No Prediction Yet");
                ui.label(egui::RichText::new("Enter property details to get started").color(MUTED));
                ui.add_space(24.0);
            });
        }
        Some(view) => {
            ui.heading("Prediction Complete");
            ui.separator();

            ui.label(egui::RichText::new("Estimated Value").small().color(MUTED));
            ui.label(egui::RichText::new(&view.price).size(30.0).strong());
            ui.add_space(8.0);

            egui::Grid::new("prediction_meta_grid")
                .num_columns(2)
                .spacing([32.0, 4.0])
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("ML Algorithm").small().color(MUTED));
                    ui.label(egui::RichText::new("Confidence").small().color(MUTED));
                    ui.end_row();
                    ui.label(egui::RichText::new(&view.model_name).strong());
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(&view.confidence).strong());
                        ui.add(
                            egui::ProgressBar::new(view.confidence_fill())
                                .desired_width(160.0)
                                .desired_height(6.0)
                                .fill(ACCENT),
                        );
                    });
                    ui.end_row();
                });

            if !view.summary.is_empty() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Property Summary").small().color(MUTED));
                ui.horizontal(|ui| {
                    for item in &view.summary {
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(item.label).small().color(MUTED));
                            ui.label(egui::RichText::new(&item.value).strong());
                        });
                        ui.add_space(12.0);
                    }
                });
            }

            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(
                    "Predictions are estimates based on historical data. Actual prices may vary.",
                )
                .small()
                .italics()
                .color(MUTED),
            );
        }
    })
    .response
}
