use super::{BRAND_RED, DEEP_RED, INK, UiApp, card_frame};
use cauli_core::state::ALERT_UPLOAD_FAILED;
use cauli_core::{IMAGE_EXTENSIONS, pick_path};
use eframe::egui;
use rfd::FileDialog;
use std::time::Instant;

const DROP_ZONE_HEIGHT: f32 = 340.0;

impl UiApp {
    pub(super) fn render_home_panel(&mut self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("Diagnose cauliflower health - upload a photo")
                .size(28.0)
                .strong()
                .color(egui::Color32::WHITE),
        );
        ui.add_space(6.0);
        ui.label(
            egui::RichText::new(
                "Quickly upload a picture of a cauliflower leaf or the full plant. Our model will analyze and provide likely issues and suggested treatments.",
            )
            .color(egui::Color32::WHITE),
        );
        ui.add_space(16.0);

        self.render_drop_zone(ui);
        ui.add_space(16.0);
        self.render_controls(ui);
        self.render_result_card(ui);
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let uploading = self.home.is_uploading();
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let width = ui.available_width();
        let (rect, resp) = ui.allocate_exact_size(
            egui::vec2(width, DROP_ZONE_HEIGHT),
            if uploading {
                egui::Sense::hover()
            } else {
                egui::Sense::click()
            },
        );
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 12.0, egui::Color32::WHITE);
        if hovering {
            painter.rect_stroke(
                rect.shrink(2.0),
                12.0,
                egui::Stroke::new(3.0, BRAND_RED),
                egui::StrokeKind::Inside,
            );
        }

        match &self.preview {
            Some((_, tex)) => {
                let fit = fit_into(tex.size_vec2(), rect.shrink(20.0));
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(tex.id(), fit, uv, egui::Color32::WHITE);
            }
            None if self.home.selected().is_some() => {
                // Still decoding, or accepted but undecodable; show the name instead of a picture.
                let name = self.home.selected().map(|s| s.name()).unwrap_or_default();
                let note = if self.home.is_preview_pending() {
                    "Loading preview..."
                } else {
                    "no preview"
                };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    format!("{name} ({note})"),
                    egui::FontId::proportional(18.0),
                    INK,
                );
            }
            None => {
                let circle = rect.center() - egui::vec2(0.0, 30.0);
                painter.circle_stroke(circle, 110.0, egui::Stroke::new(4.0, BRAND_RED));
                painter.text(
                    circle,
                    egui::Align2::CENTER_CENTER,
                    "+",
                    egui::FontId::proportional(72.0),
                    BRAND_RED,
                );
                painter.text(
                    egui::pos2(rect.center().x, rect.bottom() - 36.0),
                    egui::Align2::CENTER_CENTER,
                    "Drop your image here",
                    egui::FontId::proportional(24.0),
                    INK,
                );
            }
        }

        if uploading {
            painter.rect_filled(rect, 12.0, egui::Color32::from_white_alpha(160));
            let spinner = egui::Rect::from_center_size(
                rect.center() - egui::vec2(0.0, 16.0),
                egui::vec2(36.0, 36.0),
            );
            ui.put(spinner, egui::Spinner::new().size(36.0).color(DEEP_RED));
            painter.text(
                rect.center() + egui::vec2(0.0, 24.0),
                egui::Align2::CENTER_CENTER,
                "Processing...",
                egui::FontId::proportional(16.0),
                INK,
            );
        }

        if resp.clicked()
            && let Some(path) = FileDialog::new()
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file()
        {
            self.home.select(pick_path(&path, None));
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let uploading = self.home.is_uploading();
        ui.horizontal(|ui| {
            let upload = egui::Button::new(
                egui::RichText::new("Upload & Predict").color(egui::Color32::WHITE),
            )
            .fill(BRAND_RED);
            if ui.add_enabled(!uploading, upload).clicked() {
                self.start_upload();
            }

            let reset = egui::Button::new(egui::RichText::new("Reset").color(BRAND_RED))
                .fill(egui::Color32::WHITE)
                .stroke(egui::Stroke::new(1.0, BRAND_RED));
            if ui.add(reset).clicked() {
                self.home.reset();
                self.preview = None;
            }

            let progress = self.home.progress();
            if uploading || progress.percent() > 0.0 {
                ui.add(
                    egui::ProgressBar::new(progress.fraction())
                        .desired_width(240.0)
                        .show_percentage(),
                );
            }
        });
    }

    fn start_upload(&mut self) {
        let client = match &self.client {
            Ok(client) => client.clone(),
            Err(reason) => {
                tracing::error!("Cannot upload, HTTP client unavailable: {reason}");
                self.home.raise_alert(ALERT_UPLOAD_FAILED);
                return;
            }
        };
        if let Err(e) = self.home.begin_upload(&client, Instant::now()) {
            tracing::warn!("Upload not started: {e}");
        }
    }

    fn render_result_card(&self, ui: &mut egui::Ui) {
        let Some(result) = self.home.result() else {
            return;
        };
        ui.add_space(24.0);
        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            super::results::render_analysis(ui, result);
        });
    }
}

/// Largest rect with the texture's aspect ratio that fits inside `bounds`, centred.
fn fit_into(size: egui::Vec2, bounds: egui::Rect) -> egui::Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width() / size.x).min(bounds.height() / size.y).min(1.0);
    egui::Rect::from_center_size(bounds.center(), size * scale)
}
