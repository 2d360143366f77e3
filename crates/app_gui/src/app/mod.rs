mod home;
mod pages;
mod results;

use cauli_core::{ClientConfig, HomeState, PredictClient, pick_bytes, pick_path};
use eframe::{App, Frame, egui};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub(crate) const BRAND_RED: egui::Color32 = egui::Color32::from_rgb(0xD8, 0x40, 0x40);
pub(crate) const DEEP_RED: egui::Color32 = egui::Color32::from_rgb(0x8E, 0x16, 0x16);
pub(crate) const INK: egui::Color32 = egui::Color32::from_rgb(0x1D, 0x16, 0x16);
pub(crate) const CARD_BG: egui::Color32 = egui::Color32::WHITE;
pub(crate) const MUTED: egui::Color32 = egui::Color32::from_gray(100);

/// How often the UI wakes up to poll an in-flight upload or preview decode.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Panel {
    #[default]
    Home,
    Learn,
    About,
}

pub struct UiApp {
    panel: Panel,
    config: ClientConfig,
    client: Result<Arc<PredictClient>, String>,
    home: HomeState,
    preview: Option<(u64, egui::TextureHandle)>,
    app_version: &'static str,
}

impl UiApp {
    pub fn new(config: ClientConfig) -> Self {
        let client = PredictClient::new(&config).map(Arc::new).map_err(|e| {
            tracing::error!("HTTP client unavailable: {e}");
            e.to_string()
        });
        Self {
            panel: Panel::default(),
            home: HomeState::new(config.progress_mode),
            config,
            client,
            preview: None,
            app_version: env!("CAULI_VERSION"),
        }
    }

    /// Files dropped anywhere on the window go to the picker; only the first one counts.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };
        if self.home.is_uploading() {
            return;
        }
        let declared = (!file.mime.is_empty()).then_some(file.mime.as_str());
        let picked = match (&file.path, &file.bytes) {
            (Some(path), _) => pick_path(path, declared),
            (None, Some(bytes)) => pick_bytes(&file.name, declared, Arc::clone(bytes)),
            (None, None) => return,
        };
        self.home.select(picked);
        self.panel = Panel::Home;
    }

    /// Keeps the preview texture in step with the selected image.
    fn sync_preview(&mut self, ctx: &egui::Context) {
        let id = self.home.selection_id();
        if self.preview.as_ref().is_some_and(|(cached, _)| *cached == id) {
            return;
        }
        self.preview = self.home.preview().map(|img| {
            let size = [img.width() as usize, img.height() as usize];
            let color = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
            let tex = ctx.load_texture(format!("preview:{id}"), color, egui::TextureOptions::LINEAR);
            (id, tex)
        });
    }

    fn render_nav(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let (badge, _) = ui.allocate_exact_size(egui::vec2(40.0, 40.0), egui::Sense::hover());
            ui.painter().rect_filled(badge, 6.0, BRAND_RED);
            ui.painter().text(
                badge.center(),
                egui::Align2::CENTER_CENTER,
                "CA",
                egui::FontId::proportional(16.0),
                egui::Color32::WHITE,
            );
            ui.label(
                egui::RichText::new("cauliflowerAI")
                    .size(20.0)
                    .strong()
                    .color(egui::Color32::WHITE),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Right-to-left, so listed in reverse.
                for (panel, title) in [
                    (Panel::About, "About"),
                    (Panel::Learn, "Learn"),
                    (Panel::Home, "Home"),
                ] {
                    let text = egui::RichText::new(title).color(egui::Color32::WHITE);
                    ui.selectable_value(&mut self.panel, panel, text);
                }
            });
        });
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.home.alert().map(str::to_string) else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("alert")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.label(message);
            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.button("OK").clicked()
            })
            .inner
        });
        if modal.inner || modal.should_close() {
            self.home.dismiss_alert();
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if self.home.poll(Instant::now()) {
            ctx.request_repaint();
        }
        if self.home.is_uploading() || self.home.is_preview_pending() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
        if self.home.alert().is_none() {
            self.handle_dropped_files(ctx);
        }
        self.sync_preview(ctx);

        egui::TopBottomPanel::top("nav")
            .frame(egui::Frame::new().fill(INK).inner_margin(egui::Margin::symmetric(24, 12)))
            .show(ctx, |ui| self.render_nav(ui));

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::new().fill(INK).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("Powered by cauliflowerAI").color(egui::Color32::WHITE));
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(INK).inner_margin(egui::Margin::symmetric(48, 24)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| match self.panel {
                        Panel::Home => self.render_home_panel(ui),
                        Panel::Learn => self.render_learn_panel(ui),
                        Panel::About => self.render_about_panel(ui),
                    });
            });

        self.render_alert(ctx);
    }
}

/// White rounded card used by every panel.
pub(crate) fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(CARD_BG)
        .corner_radius(egui::CornerRadius::same(12))
        .inner_margin(egui::Margin::same(24))
}
