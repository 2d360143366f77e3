use super::{DEEP_RED, INK, MUTED};
use cauli_core::render::{EMPTY_RESULT_TEXT, TREATMENTS_HEADING};
use cauli_core::{CardView, PredictionResult, card};
use eframe::egui;

pub(super) fn render_analysis(ui: &mut egui::Ui, result: &PredictionResult) {
    ui.label(egui::RichText::new("Analysis").size(18.0).strong().color(INK));
    if result.is_unrecognized() {
        ui.label(
            egui::RichText::new("Unrecognized response shape")
                .small()
                .italics()
                .color(MUTED),
        );
    }
    if result.predictions.is_empty() {
        ui.add_space(8.0);
        ui.label(egui::RichText::new(EMPTY_RESULT_TEXT).color(MUTED));
        return;
    }
    for entry in &result.predictions {
        ui.add_space(12.0);
        ui.separator();
        render_card(ui, &card(entry));
    }
}

fn render_card(ui: &mut egui::Ui, view: &CardView) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(&view.title).size(16.0).strong().color(DEEP_RED));
            if let Some(confidence) = &view.confidence {
                ui.label(
                    egui::RichText::new(format!("Confidence: {confidence}"))
                        .small()
                        .color(MUTED),
                );
            }
        });
        if let Some(severity) = &view.severity {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                ui.label(egui::RichText::new(severity).color(MUTED));
            });
        }
    });

    if let Some(description) = &view.description {
        ui.add_space(6.0);
        ui.label(egui::RichText::new(description).color(INK));
    }

    if !view.treatments.is_empty() {
        ui.add_space(6.0);
        ui.label(egui::RichText::new(TREATMENTS_HEADING).strong().color(INK));
        for treatment in &view.treatments {
            ui.label(egui::RichText::new(format!("\u{2022} {treatment}")).color(INK));
        }
    }

    if let Some(tips) = &view.tips {
        ui.add_space(6.0);
        ui.label(egui::RichText::new(tips).color(INK));
    }
}
