use super::{BRAND_RED, DEEP_RED, INK, MUTED, UiApp, card_frame};
use cauli_core::ProgressMode;
use eframe::egui;

const LEARN_TIPS: &[&str] = &[
    "Choose disease-resistant varieties and certified seeds.",
    "Maintain good field sanitation: remove infected debris and rotate crops.",
    "Ensure proper spacing and drainage; water in the morning to reduce leaf wetness duration.",
    "Balanced fertilization: avoid excessive nitrogen, which increases susceptibility.",
    "Scout regularly and use integrated pest management (IPM) before resorting to chemicals.",
];

const HOW_IT_WORKS: &[&str] = &[
    "Upload an image of the plant or a leaf",
    "The image is sent to the backend as multipart/form-data",
    "The backend runs the model and returns predictions",
    "The app parses the answer and shows disease details, confidence and treatments",
];

impl UiApp {
    pub(super) fn render_learn_panel(&mut self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new("Learn: Grow healthier cauliflowers")
                    .size(24.0)
                    .strong()
                    .color(INK),
            );
            ui.add_space(10.0);
            for (idx, tip) in LEARN_TIPS.iter().enumerate() {
                ui.label(egui::RichText::new(format!("{}. {tip}", idx + 1)).color(INK));
            }
            ui.add_space(14.0);
            ui.label(
                egui::RichText::new(
                    "Region-specific protocols and pesticide datasheets will be added to this section.",
                )
                .small()
                .color(MUTED),
            );
        });
    }

    pub(super) fn render_about_panel(&mut self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new("About cauliflowerAI")
                    .size(24.0)
                    .strong()
                    .color(INK),
            );
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(
                    "cauliflowerAI uses a trained computer-vision model to detect visual symptoms on cauliflower plants. The backend receives an image, runs inference, and returns likely labels with confidence scores and recommended treatments.",
                )
                .color(INK),
            );

            ui.add_space(14.0);
            ui.label(egui::RichText::new("How it works").strong().color(DEEP_RED));
            for step in HOW_IT_WORKS {
                ui.label(egui::RichText::new(format!("\u{2022} {step}")).color(INK));
            }

            ui.add_space(14.0);
            ui.separator();
            ui.label(egui::RichText::new("Connection").strong().color(DEEP_RED));
            ui.label(format!("App version: {}", self.app_version));
            ui.label(format!("Endpoint: {}", self.config.predict_url()));
            let timeout = match self.config.timeout {
                Some(t) => format!("{} s", t.as_secs()),
                None => "none".to_string(),
            };
            ui.label(format!("Timeout: {timeout}"));
            ui.label(format!("Progress: {}", self.config.progress_mode.as_str()));
            if self.config.progress_mode == ProgressMode::Simulated {
                ui.label(
                    egui::RichText::new("Simulated progress is an estimate, not bytes sent.")
                        .small()
                        .color(MUTED),
                );
            }
            if let Err(reason) = &self.client {
                ui.colored_label(BRAND_RED, reason.as_str());
            }
        });
    }
}
